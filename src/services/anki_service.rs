//! 卡片提交服务 - 业务能力层
//!
//! 只负责"把卡片交给卡片库"能力，每张卡片返回是否成功

use crate::config::Config;
use crate::error::SubmissionError;
use crate::infrastructure::HttpExecutor;
use crate::models::FlashcardPayload;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

/// AnkiConnect 协议版本
const ANKI_CONNECT_VERSION: u8 = 6;

/// 卡片插入能力
#[allow(async_fn_in_trait)]
pub trait NoteSink {
    /// 返回与输入等长的成功标记
    async fn add_notes(&self, notes: &[FlashcardPayload]) -> Result<Vec<bool>, SubmissionError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

/// AnkiConnect 客户端
pub struct AnkiConnect {
    http: HttpExecutor,
    endpoint: String,
}

impl AnkiConnect {
    pub fn new(http: HttpExecutor, config: &Config) -> Self {
        Self {
            http,
            endpoint: config.anki_api.clone(),
        }
    }

    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        params: JsonValue,
    ) -> Result<ApiResponse<T>, SubmissionError> {
        let body = json!({
            "action": action,
            "version": ANKI_CONNECT_VERSION,
            "params": params,
        });

        debug!("AnkiConnect 请求: {}", action);

        self.http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|source| SubmissionError::Network {
                endpoint: self.endpoint.clone(),
                source,
            })?
            .json()
            .await
            .map_err(|source| SubmissionError::Network {
                endpoint: self.endpoint.clone(),
                source,
            })
    }
}

impl NoteSink for AnkiConnect {
    async fn add_notes(&self, notes: &[FlashcardPayload]) -> Result<Vec<bool>, SubmissionError> {
        let response: ApiResponse<Vec<Option<u64>>> =
            self.request("addNotes", json!({ "notes": notes })).await?;

        match (response.result, response.error) {
            (Some(ids), error) => {
                if let Some(error) = error {
                    debug!("AnkiConnect 部分失败: {}", error);
                }
                Ok(ids.iter().map(Option::is_some).collect())
            }
            (None, error) => Err(SubmissionError::Rejected {
                message: error.unwrap_or_else(|| "空响应".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn note(word: &str) -> FlashcardPayload {
        FlashcardPayload {
            deck_name: "Reading".into(),
            model_name: "Basic".into(),
            fields: BTreeMap::from([("Word".to_string(), word.to_string())]),
            tags: vec!["highlight_import".into()],
            audio: None,
        }
    }

    fn client_for(server: &MockServer) -> AnkiConnect {
        let config = Config {
            anki_api: server.uri(),
            ..Config::default()
        };
        AnkiConnect::new(HttpExecutor::new(5).unwrap(), &config)
    }

    #[tokio::test]
    async fn test_add_notes_maps_ids_to_flags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "action": "addNotes",
                "version": 6
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": [1496198395707u64, null, 1496198395708u64],
                "error": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let anki = client_for(&server);
        let flags = anki
            .add_notes(&[note("gaze"), note("dup"), note("quiet")])
            .await
            .unwrap();

        assert_eq!(flags, vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_add_notes_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": null,
                "error": "deck was not found"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).add_notes(&[note("gaze")]).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Rejected { message } if message == "deck was not found"));
    }
}
