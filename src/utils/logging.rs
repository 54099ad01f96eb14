//! 日志工具模块
//!
//! 提供日志初始化和批次各阶段的输出辅助函数

use crate::config::Config;
use crate::models::SubmissionSummary;
use crate::workflow::ResolveProgress;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`；未设置时为 `info`，`verbose` 为 true 时为 `debug`。
/// 重复调用不会报错（测试中可能多次初始化）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 高亮导入");
    info!("📁 导出位置: {}", config.export_path);
    info!("📚 牌组: {} / 笔记类型: {}", config.deck_name, config.note_type);
    info!(
        "📖 词典: {} / 第二词典: {} / 发音: {}",
        config.dict_source, config.dict_source2, config.audio_dict
    );
    if config.dry_run {
        info!("💡 试运行模式：只组装卡片，不提交");
    }
    info!("{}", "=".repeat(60));
}

/// 记录导出加载信息
///
/// # 参数
/// - `total`: 读取到的高亮数
/// - `skipped`: 因缺字段被跳过的条目数
pub fn log_export_loaded(total: usize, skipped: usize) {
    info!("✓ 读取到 {} 条高亮", total);
    if skipped > 0 {
        info!("⚠️ 跳过 {} 条不完整的导出条目", skipped);
    }
}

/// 记录筛选结果
pub fn log_selected(selected: usize, min_date: &str, sources: usize) {
    info!(
        "📋 {} highlights selected（起始日期 {}，{} 本书）",
        selected, min_date, sources
    );
}

/// 每条高亮处理完后的进度
pub fn log_progress(progress: &ResolveProgress) {
    info!(
        "[{}/{}] {} definitions found",
        progress.index, progress.total, progress.definitions_found
    );
}

/// 打印最终统计信息
///
/// `dry_run` 为 true 时没有提交，不输出成功/失败数
pub fn print_final_stats(
    selected: usize,
    dropped: usize,
    definitions_found: usize,
    summary: &SubmissionSummary,
    dry_run: bool,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 导入完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📋 {} highlights selected", selected);
    info!("📖 {} definitions found", definitions_found);
    if dropped > 0 {
        info!("⚠️ 无句子丢弃: {}", dropped);
    }
    for line in summary_lines(summary, dry_run) {
        info!("{}", line);
    }
    info!("{}", "=".repeat(60));
}

/// 提交结果的统计行
fn summary_lines(summary: &SubmissionSummary, dry_run: bool) -> Vec<String> {
    if dry_run {
        return vec![format!("💡 试运行：组装了 {} 张卡片，未提交", summary.total)];
    }
    vec![
        format!(
            "✅ {} of {} notes successfully added",
            summary.succeeded, summary.total
        ),
        format!("❌ 失败: {}", summary.failed()),
    ]
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
