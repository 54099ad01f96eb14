use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 提交给卡片服务的一张卡片
///
/// 序列化格式与 AnkiConnect `addNotes` 的 note 对象一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardPayload {
    pub deck_name: String,
    pub model_name: String,
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioAttachment>,
}

/// 音频附件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAttachment {
    #[serde(flatten)]
    pub source: AudioSource,
    pub filename: String,
    /// 写入音频的字段
    pub fields: Vec<String>,
}

/// 远程 URL 或本地路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSource {
    Url(String),
    Path(String),
}

impl AudioSource {
    /// 以 http(s):// 开头视为 URL，否则视为本地路径
    pub fn from_ref(audio_ref: &str) -> Self {
        if audio_ref.starts_with("https://") || audio_ref.starts_with("http://") {
            AudioSource::Url(audio_ref.to_string())
        } else {
            AudioSource::Path(audio_ref.to_string())
        }
    }
}

/// 提交统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl SubmissionSummary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}
