//! 通用高亮导出读取器
//!
//! 支持单个 `.json` / `.toml` 文件，或包含这类文件的目录（按文件名顺序读取）。
//! 条目字段：`word`/`lookup_term`、`sentence`、`date`/`timestamp`、`book`/`source`

use crate::error::ParseError;
use crate::models::highlight::{NormalizedExport, RawHighlight};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

const TERM_KEYS: &[&str] = &["word", "lookup_term"];
const SENTENCE_KEYS: &[&str] = &["sentence"];
const TIMESTAMP_KEYS: &[&str] = &["date", "timestamp"];
const SOURCE_KEYS: &[&str] = &["book", "source"];

/// 导出读取器：把某种导出格式转换为统一的四列数据
#[allow(async_fn_in_trait)]
pub trait ExportReader {
    async fn read(&self, path: &Path) -> Result<NormalizedExport, ParseError>;
}

/// JSON / TOML 通用读取器
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericExportReader;

impl ExportReader for GenericExportReader {
    async fn read(&self, path: &Path) -> Result<NormalizedExport, ParseError> {
        load_export(path).await
    }
}

/// 读取导出文件或目录
pub async fn load_export(path: &Path) -> Result<NormalizedExport, ParseError> {
    let metadata = fs::metadata(path).await.map_err(|_| ParseError::NotFound {
        path: path.display().to_string(),
    })?;

    let files = if metadata.is_dir() {
        list_export_files(path).await?
    } else {
        vec![path.to_path_buf()]
    };

    let mut export = NormalizedExport::default();
    for file in files {
        info!(
            "正在加载: {}",
            file.file_name().unwrap_or_default().to_string_lossy()
        );
        let (highlights, skipped) = load_export_file(&file).await?;
        info!("成功加载 {} 条高亮", highlights.len());
        if skipped > 0 {
            warn!("⚠️ {} 中跳过 {} 条无效条目", file.display(), skipped);
        }
        export.skipped += skipped;
        for highlight in highlights {
            export.columns.push(highlight);
        }
    }

    Ok(export)
}

/// 读取单个导出文件，返回 (高亮, 跳过条数)
pub async fn load_export_file(path: &Path) -> Result<(Vec<RawHighlight>, usize), ParseError> {
    let origin = path.display().to_string();
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ParseError::Unreadable {
            path: origin.clone(),
            source,
        })?;

    match extension(path).as_deref() {
        Some("json") => parse_json(&content, &origin),
        Some("toml") => parse_toml(&content, &origin),
        _ => Err(ParseError::malformed(origin, "不支持的文件类型（需要 .json 或 .toml）")),
    }
}

/// 目录中的导出文件，按文件名排序
async fn list_export_files(folder: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let origin = folder.display().to_string();
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|source| ParseError::Unreadable {
            path: origin.clone(),
            source,
        })?;

    let mut files = Vec::new();
    loop {
        let entry = entries
            .next_entry()
            .await
            .map_err(|source| ParseError::Unreadable {
                path: origin.clone(),
                source,
            })?;
        let Some(entry) = entry else { break };
        let path = entry.path();
        if matches!(extension(&path).as_deref(), Some("json" | "toml")) {
            files.push(path);
        }
    }

    if files.is_empty() {
        warn!("在文件夹 {} 中没有找到导出文件", origin);
    }
    files.sort();
    Ok(files)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn parse_json(content: &str, origin: &str) -> Result<(Vec<RawHighlight>, usize), ParseError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| ParseError::malformed(origin, e))?;

    let items = match &value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => map
            .get("highlights")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ParseError::malformed(origin, "缺少 highlights 数组"))?,
        _ => return Err(ParseError::malformed(origin, "顶层必须是数组或对象")),
    };

    Ok(collect_entries(items))
}

fn parse_toml(content: &str, origin: &str) -> Result<(Vec<RawHighlight>, usize), ParseError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| ParseError::malformed(origin, e))?;

    let items = table
        .get("highlights")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ParseError::malformed(origin, "缺少 [[highlights]] 表"))?;

    Ok(collect_entries(items))
}

/// 按候选键名读取条目中的字符串字段
trait EntryFields {
    fn field(&self, keys: &[&str]) -> Option<String>;
}

impl EntryFields for serde_json::Value {
    fn field(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|k| self.get(*k).and_then(|v| v.as_str()).map(str::to_string))
    }
}

impl EntryFields for toml::Value {
    fn field(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| match self.get(*k)? {
            toml::Value::String(s) => Some(s.clone()),
            // 未加引号的日期时间
            toml::Value::Datetime(dt) => Some(dt.to_string()),
            _ => None,
        })
    }
}

/// 逐条转换；缺少必需字段或时间戳无效的条目被跳过并计数
fn collect_entries<T: EntryFields>(entries: &[T]) -> (Vec<RawHighlight>, usize) {
    let mut highlights = Vec::new();
    let mut skipped = 0;

    for entry in entries {
        let term = entry.field(TERM_KEYS);
        let timestamp = entry
            .field(TIMESTAMP_KEYS)
            .filter(|t| is_valid_timestamp(t));
        let source = entry.field(SOURCE_KEYS);

        match (term, timestamp, source) {
            (Some(term), Some(timestamp), Some(source)) => {
                // 缺少句子不跳过，交给查询阶段丢弃并计数
                let sentence = entry.field(SENTENCE_KEYS).unwrap_or_default();
                highlights.push(RawHighlight::new(term, sentence, timestamp, source));
            }
            _ => skipped += 1,
        }
    }

    (highlights, skipped)
}

/// 前 10 个字符必须是合法的 YYYY-MM-DD
pub fn is_valid_timestamp(timestamp: &str) -> bool {
    timestamp
        .get(..10)
        .map(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok())
        .unwrap_or(false)
}
