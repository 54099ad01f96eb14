use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 一条高亮（来自阅读器导出）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHighlight {
    /// 原始高亮文本（尚未去除标点）
    pub lookup_term: String,
    pub sentence: String,
    /// 前 10 个字符为 YYYY-MM-DD，可按字典序比较
    pub timestamp: String,
    pub source_name: String,
}

impl RawHighlight {
    pub fn new(
        lookup_term: impl Into<String>,
        sentence: impl Into<String>,
        timestamp: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            lookup_term: lookup_term.into(),
            sentence: sentence.into(),
            timestamp: timestamp.into(),
            source_name: source_name.into(),
        }
    }

    /// 时间戳的日期部分
    pub fn date(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }
}

/// 通过筛选的高亮，顺序与导出一致
pub type SelectedHighlight = RawHighlight;

/// 导出的四列数据，按下标对齐
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightColumns {
    pub lookup_terms: Vec<String>,
    pub sentences: Vec<String>,
    pub timestamps: Vec<String>,
    pub source_names: Vec<String>,
}

impl HighlightColumns {
    pub fn push(&mut self, highlight: RawHighlight) {
        self.lookup_terms.push(highlight.lookup_term);
        self.sentences.push(highlight.sentence);
        self.timestamps.push(highlight.timestamp);
        self.source_names.push(highlight.source_name);
    }

    pub fn len(&self) -> usize {
        self.lookup_terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup_terms.is_empty()
    }

    /// 合并为高亮序列，保持导出顺序
    ///
    /// `origin` 仅用于错误信息
    pub fn into_highlights(self, origin: &str) -> Result<Vec<RawHighlight>, ParseError> {
        let n = self.lookup_terms.len();
        if self.sentences.len() != n || self.timestamps.len() != n || self.source_names.len() != n
        {
            return Err(ParseError::MisalignedColumns {
                path: origin.to_string(),
                terms: n,
                sentences: self.sentences.len(),
                timestamps: self.timestamps.len(),
                sources: self.source_names.len(),
            });
        }

        Ok(self
            .lookup_terms
            .into_iter()
            .zip(self.sentences)
            .zip(self.timestamps)
            .zip(self.source_names)
            .map(|(((term, sentence), timestamp), source)| {
                RawHighlight::new(term, sentence, timestamp, source)
            })
            .collect())
    }
}

/// 一次导入得到的结果
#[derive(Debug, Clone, Default)]
pub struct NormalizedExport {
    pub columns: HighlightColumns,
    /// 因缺字段或时间戳无效而跳过的条目数
    pub skipped: usize,
}

/// 筛选条件（每次筛选时构造，不持久化）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// YYYY-MM-DD
    pub min_date: String,
    pub allowed_sources: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn new<I, S>(min_date: impl Into<String>, allowed_sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            min_date: min_date.into(),
            allowed_sources: allowed_sources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, highlight: &RawHighlight) -> bool {
        highlight.date() >= self.min_date.as_str()
            && self.allowed_sources.contains(&highlight.source_name)
    }
}

/// 排序后去重的日期（对应"从哪天开始"的候选项）
pub fn available_dates(highlights: &[RawHighlight]) -> Vec<String> {
    highlights
        .iter()
        .map(|h| h.date().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 出现过的书名，按首次出现顺序
pub fn available_sources(highlights: &[RawHighlight]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    highlights
        .iter()
        .filter(|h| seen.insert(h.source_name.as_str()))
        .map(|h| h.source_name.clone())
        .collect()
}

/// 查询完成的词条
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedEntry {
    pub word: String,
    /// 开启加粗时可能带有 `__word__` 标记
    pub sentence: String,
    pub definition: String,
    /// 可能为空
    pub definition2: String,
    /// 空、本地路径或 URL
    pub audio_ref: String,
    pub source_name: String,
}
