//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 reqwest 客户端，只暴露"发请求"的能力

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// 抓取网页时使用的浏览器 UA
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 Client（连接池在所有服务之间共享）
/// - 统一超时和 UA
/// - 不认识高亮 / 卡片
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// 创建新的 HTTP 执行器
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("无法创建 HTTP 客户端")?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }
}
