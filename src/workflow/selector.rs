//! 高亮筛选
//!
//! 按日期和书名筛选，保持导出顺序（导出顺序可能对应书中的位置）

use crate::models::{FilterCriteria, RawHighlight, SelectedHighlight};

/// 保留 `timestamp[..10] >= min_date` 且书名在允许列表中的高亮
///
/// 稳定筛选；允许列表为空或没有匹配时返回空序列
pub fn select(highlights: &[RawHighlight], criteria: &FilterCriteria) -> Vec<SelectedHighlight> {
    if criteria.allowed_sources.is_empty() {
        return Vec::new();
    }
    highlights
        .iter()
        .filter(|h| criteria.matches(h))
        .cloned()
        .collect()
}
