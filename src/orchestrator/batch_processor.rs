//! 批量导入处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次导入的完整调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建共享的 HttpExecutor
//! 2. **加载导出**：读取高亮并统计跳过的条目
//! 3. **筛选条件**：配置优先，未配置时取最早日期和全部书名
//! 4. **顺序处理**：筛选 → 查询 → 组装 → 提交，全程不并发
//! 5. **全局统计**：汇总选中、丢弃、查到释义和提交成功的数量

use crate::config::Config;
use crate::infrastructure::HttpExecutor;
use crate::models::{
    available_dates, available_sources, ExportReader, FilterCriteria, GenericExportReader,
    RawHighlight, SubmissionSummary,
};
use crate::orchestrator::submission;
use crate::services::{
    AnkiConnect, AudioLookup, AudioProvider, DictionaryLookup, HttpDictionary, NoteSink,
};
use crate::utils::logging;
use crate::workflow::{select, HighlightFlow, NoteBuilder, NoteTemplate, ResolveOptions};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

/// 一次导入的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 通过筛选的高亮数
    pub selected: usize,
    /// 因句子为空被丢弃的高亮数
    pub dropped: usize,
    pub definitions_found: usize,
    /// 组装出的卡片数
    pub assembled: usize,
    pub summary: SubmissionSummary,
}

/// 应用主结构
pub struct App {
    config: Config,
    http: HttpExecutor,
}

impl App {
    /// 初始化应用
    pub fn new(config: Config) -> Result<Self> {
        let http =
            HttpExecutor::new(config.request_timeout_secs).context("创建 HTTP 客户端失败")?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行一次导入
    pub async fn run(&self) -> Result<BatchReport> {
        logging::log_startup(&self.config);

        let highlights = self.load_highlights().await?;
        if highlights.is_empty() {
            warn!("⚠️ 导出中没有可用的高亮，程序结束");
        }

        let criteria = build_criteria(&self.config, &highlights);

        let dictionary = HttpDictionary::new(self.http.clone(), &self.config);
        let audio = AudioProvider::from_config(self.http.clone(), &self.config)
            .context("初始化发音服务失败")?;
        let flow = HighlightFlow::new(
            &dictionary,
            audio.as_ref(),
            ResolveOptions {
                bold_word: self.config.bold_word,
                language: self.config.target_language.clone(),
            },
        );
        let builder = NoteBuilder::new(NoteTemplate::from_config(&self.config))
            .context("初始化卡片组装失败")?;

        let sink = AnkiConnect::new(self.http.clone(), &self.config);
        let sink = (!self.config.dry_run).then_some(&sink);

        Ok(run_pipeline(&highlights, &criteria, &flow, &builder, sink).await)
    }

    /// 加载高亮
    async fn load_highlights(&self) -> Result<Vec<RawHighlight>> {
        let path = Path::new(&self.config.export_path);
        let export = GenericExportReader
            .read(path)
            .await
            .with_context(|| format!("读取导出失败: {}", path.display()))?;

        let skipped = export.skipped;
        let highlights = export.columns.into_highlights(&self.config.export_path)?;
        logging::log_export_loaded(highlights.len(), skipped);
        Ok(highlights)
    }
}

/// 构造筛选条件
///
/// 配置中没有起始日期时取导出中最早的日期，没有书名列表时取导出中出现的全部书名
pub fn build_criteria(config: &Config, highlights: &[RawHighlight]) -> FilterCriteria {
    let min_date = config.min_date.clone().unwrap_or_else(|| {
        available_dates(highlights)
            .into_iter()
            .next()
            .unwrap_or_default()
    });
    let sources = config
        .sources
        .clone()
        .unwrap_or_else(|| available_sources(highlights));
    FilterCriteria::new(min_date, sources)
}

/// 筛选 → 查询 → 组装 → 提交
///
/// `sink` 为 None 时只试运行，不提交
pub async fn run_pipeline<D, A, S>(
    highlights: &[RawHighlight],
    criteria: &FilterCriteria,
    flow: &HighlightFlow<'_, D, A>,
    builder: &NoteBuilder,
    sink: Option<&S>,
) -> BatchReport
where
    D: DictionaryLookup,
    A: AudioLookup,
    S: NoteSink,
{
    let selected = select(highlights, criteria);
    logging::log_selected(
        selected.len(),
        &criteria.min_date,
        criteria.allowed_sources.len(),
    );

    let resolved = flow.resolve_all(&selected, logging::log_progress).await;
    let payloads = builder.assemble(&resolved.entries);

    let summary = match sink {
        Some(sink) => submission::submit(sink, &payloads).await,
        None => submission::preview(&payloads),
    };

    logging::print_final_stats(
        selected.len(),
        resolved.dropped,
        resolved.definitions_found,
        &summary,
        sink.is_none(),
    );

    BatchReport {
        selected: selected.len(),
        dropped: resolved.dropped,
        definitions_found: resolved.definitions_found,
        assembled: payloads.len(),
        summary,
    }
}
