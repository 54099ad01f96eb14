//! 高亮查询流程 - 流程层
//!
//! 核心职责：定义"一条高亮"的完整查询流程
//!
//! 流程顺序：
//! 1. 去标点得到单词
//! 2. 句子为空 → 丢弃（计数）
//! 3. 加粗句子中的单词
//! 4. 查词典（失败 → 释义为空）
//! 5. 查发音（失败 → 无音频）

use tracing::{debug, warn};

use crate::models::{ResolvedEntry, SelectedHighlight};
use crate::services::{AudioLookup, DictionaryLookup};

/// 查词前从高亮文本中去掉的标点
pub const PUNCTUATION: &[char] = &['?', '.', '!', '«', '»', '…', ',', '(', ')', '[', ']'];

/// 句子中单词两侧的加粗标记
pub const EMPHASIS_MARKER: &str = "__";

/// 查询选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub bold_word: bool,
    pub language: String,
}

/// 单条高亮的查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved {
        entry: ResolvedEntry,
        /// 是否查到了非占位释义
        definition_found: bool,
    },
    /// 句子为空
    Dropped,
}

/// 每处理完一条高亮后上报的进度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveProgress {
    /// 已处理条数（从 1 开始）
    pub index: usize,
    pub total: usize,
    pub definitions_found: usize,
    pub dropped: usize,
}

/// 整批查询结果
#[derive(Debug, Clone, Default)]
pub struct ResolveReport {
    pub entries: Vec<ResolvedEntry>,
    pub definitions_found: usize,
    pub dropped: usize,
}

/// 高亮查询流程
///
/// - 只依赖业务能力（词典、发音）
/// - 逐条顺序查询，不并发
/// - 查询失败只降级字段，不中断整批
pub struct HighlightFlow<'a, D, A> {
    dictionary: &'a D,
    audio: Option<&'a A>,
    options: ResolveOptions,
}

impl<'a, D, A> HighlightFlow<'a, D, A>
where
    D: DictionaryLookup,
    A: AudioLookup,
{
    /// `audio` 为 None 表示禁用发音查询
    pub fn new(dictionary: &'a D, audio: Option<&'a A>, options: ResolveOptions) -> Self {
        Self {
            dictionary,
            audio,
            options,
        }
    }

    /// 查询单条高亮
    pub async fn resolve(&self, highlight: &SelectedHighlight) -> ResolveOutcome {
        let word = strip_punctuation(&highlight.lookup_term);

        if highlight.sentence.is_empty() {
            warn!("⚠️ 高亮 '{}' 没有句子，已丢弃", highlight.lookup_term);
            return ResolveOutcome::Dropped;
        }

        let sentence = if self.options.bold_word {
            mark_word(&highlight.sentence, &word)
        } else {
            highlight.sentence.clone()
        };

        if word.is_empty() {
            debug!("高亮 '{}' 去标点后为空，跳过查询", highlight.lookup_term);
            return ResolveOutcome::Resolved {
                entry: ResolvedEntry {
                    sentence,
                    source_name: highlight.source_name.clone(),
                    ..ResolvedEntry::default()
                },
                definition_found: false,
            };
        }

        let (headword, definition, definition2, definition_found) =
            self.lookup_definition(&word).await;
        let audio_ref = self.lookup_audio(&word).await;

        ResolveOutcome::Resolved {
            entry: ResolvedEntry {
                word: headword,
                sentence,
                definition,
                definition2,
                audio_ref,
                source_name: highlight.source_name.clone(),
            },
            definition_found,
        }
    }

    /// 顺序查询全部高亮，每条处理完调用一次 `on_progress`
    pub async fn resolve_all<F>(
        &self,
        highlights: &[SelectedHighlight],
        mut on_progress: F,
    ) -> ResolveReport
    where
        F: FnMut(&ResolveProgress),
    {
        let mut report = ResolveReport::default();

        for (index, highlight) in highlights.iter().enumerate() {
            match self.resolve(highlight).await {
                ResolveOutcome::Resolved {
                    entry,
                    definition_found,
                } => {
                    if definition_found {
                        report.definitions_found += 1;
                    }
                    report.entries.push(entry);
                }
                ResolveOutcome::Dropped => report.dropped += 1,
            }

            on_progress(&ResolveProgress {
                index: index + 1,
                total: highlights.len(),
                definitions_found: report.definitions_found,
                dropped: report.dropped,
            });
        }

        report
    }

    /// 返回 (词形, 释义, 第二释义, 是否查到)
    async fn lookup_definition(&self, word: &str) -> (String, String, String, bool) {
        match self.dictionary.lookup(word, &self.options.language).await {
            Ok(entry) if entry.is_found() => {
                let headword = if entry.word.is_empty() {
                    word.to_string()
                } else {
                    entry.word
                };
                (
                    headword,
                    entry.definition,
                    entry.definition2.unwrap_or_default(),
                    true,
                )
            }
            Ok(entry) => {
                debug!("词典未收录: {}", word);
                (
                    word.to_string(),
                    String::new(),
                    entry.definition2.unwrap_or_default(),
                    false,
                )
            }
            Err(e) => {
                warn!("⚠️ 查词失败 '{}': {}", word, e);
                (word.to_string(), String::new(), String::new(), false)
            }
        }
    }

    /// 取提供方排序中的第一个候选
    async fn lookup_audio(&self, word: &str) -> String {
        let Some(audio) = self.audio else {
            return String::new();
        };

        match audio.fetch_audio(word, &self.options.language).await {
            Ok(candidates) => candidates
                .into_iter()
                .next()
                .map(|c| {
                    debug!("发音: {} → {}", word, c.label);
                    c.reference
                })
                .unwrap_or_default(),
            Err(e) => {
                warn!("⚠️ 查询发音失败 '{}': {}", word, e);
                String::new()
            }
        }
    }
}

/// 去掉高亮文本中的标点
pub fn strip_punctuation(term: &str) -> String {
    term.chars().filter(|c| !PUNCTUATION.contains(c)).collect()
}

/// 去掉句子中的下划线，再给第一次出现的单词（区分大小写）加上加粗标记
///
/// 单词未出现时只去下划线
pub fn mark_word(sentence: &str, word: &str) -> String {
    let sentence = sentence.replace('_', "");
    if word.is_empty() {
        return sentence;
    }
    sentence.replacen(
        word,
        &format!("{}{}{}", EMPHASIS_MARKER, word, EMPHASIS_MARKER),
        1,
    )
}
