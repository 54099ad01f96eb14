//! 词典查询服务 - 业务能力层
//!
//! 只负责"查一个词"能力，不关心流程

use crate::config::Config;
use crate::error::LookupError;
use crate::infrastructure::HttpExecutor;
use serde::Deserialize;
use tracing::debug;

/// 词典服务表示"未找到"时返回的释义前缀
pub const NOT_FOUND_PREFIX: &str = "<b>Definition for";

/// 词典查询结果
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DictionaryEntry {
    /// 规范词形
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub definition2: Option<String>,
}

impl DictionaryEntry {
    /// 是否为真正查到的释义（而非占位文本）
    pub fn is_found(&self) -> bool {
        !is_not_found(&self.definition)
    }
}

/// 释义是否为"未找到"占位文本
pub fn is_not_found(definition: &str) -> bool {
    definition.starts_with(NOT_FOUND_PREFIX)
}

/// 词典查询能力
#[allow(async_fn_in_trait)]
pub trait DictionaryLookup {
    async fn lookup(&self, word: &str, language: &str) -> Result<DictionaryEntry, LookupError>;
}

/// 基于本地查词 API 的词典
///
/// GET `{base_url}/define/{word}?lang=..&source=..[&source2=..]`
pub struct HttpDictionary {
    http: HttpExecutor,
    base_url: String,
    source: String,
    source2: Option<String>,
}

impl HttpDictionary {
    /// 创建新的词典服务
    pub fn new(http: HttpExecutor, config: &Config) -> Self {
        Self {
            http,
            base_url: config.dictionary_api_url.trim_end_matches('/').to_string(),
            source: config.dict_source.clone(),
            source2: config
                .secondary_dictionary_enabled()
                .then(|| config.dict_source2.clone()),
        }
    }

    fn endpoint(&self, word: &str) -> String {
        format!("{}/define/{}", self.base_url, urlencoding::encode(word))
    }
}

impl DictionaryLookup for HttpDictionary {
    async fn lookup(&self, word: &str, language: &str) -> Result<DictionaryEntry, LookupError> {
        let endpoint = self.endpoint(word);
        debug!("查词: {} ({})", word, endpoint);

        let mut query = vec![("lang", language), ("source", self.source.as_str())];
        if let Some(source2) = &self.source2 {
            query.push(("source2", source2.as_str()));
        }

        let response = self
            .http
            .get(&endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| LookupError::network(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response
            .json::<DictionaryEntry>()
            .await
            .map_err(|e| LookupError::decode(&endpoint, e))
    }
}
