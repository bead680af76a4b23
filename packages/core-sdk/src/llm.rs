use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::RelayError;
use crate::models::ChatTurn;

/**
 * \brief 上游 chat/completions 的请求体。
 */
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatTurn],
    pub stream: bool,
}

/**
 * \brief 上游原始响应：状态码与未解析的正文。
 */
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: String,
}

/**
 * \brief OpenAI 兼容接口的客户端，内部复用同一个连接池。
 */
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /**
     * \brief 非流式调用，只发送一次，不重试、不设超时。
     * \return 任意状态码的原始响应；仅在连接或读取失败时返回错误。
     */
    pub async fn chat_once(
        &self,
        api_key: &SecretString,
        model: &str,
        messages: &[ChatTurn],
    ) -> Result<UpstreamReply, RelayError> {
        let body = CompletionRequest {
            model,
            messages,
            stream: false,
        };

        let resp = self
            .http
            .post(self.completions_url())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        Ok(UpstreamReply { status, body })
    }
}
