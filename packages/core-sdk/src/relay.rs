use std::sync::Arc;

use secrecy::SecretString;
use serde_json::Value;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{RelayError, MESSAGE_REQUIRED, UPSTREAM_FALLBACK_MESSAGE};
use crate::llm::{UpstreamClient, UpstreamReply};
use crate::models::{ChatRequest, ChatResponse, ChatTurn, ModelDescriptor};
use crate::telemetry;

/**
 * \brief 聊天转发：校验请求、调用一次上游并统一结果格式。
 */
#[derive(Debug, Clone)]
pub struct Relay {
    catalog: Arc<Catalog>,
    upstream: UpstreamClient,
    api_key: Option<SecretString>,
    default_model: Option<String>,
}

impl Relay {
    pub fn new(config: &Config, catalog: Arc<Catalog>) -> Result<Self, RelayError> {
        Ok(Self {
            catalog,
            upstream: UpstreamClient::new(config.upstream_base())?,
            api_key: config.api_key.clone(),
            default_model: config.default_model.clone(),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn credential_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /**
     * \brief 处理一次聊天请求：校验 → 鉴权 → 组装 → 调用 → 归一化。
     */
    pub async fn handle_chat(&self, request: ChatRequest) -> Result<ChatResponse, RelayError> {
        let result = self.forward(request).await;
        match &result {
            Err(e @ RelayError::Validation { .. }) => {
                telemetry::log_warn("relay.chat", &format!("status={} error={}", e.status(), e))
            }
            Err(e) => {
                telemetry::log_error("relay.chat", &format!("status={} error={}", e.status(), e))
            }
            Ok(_) => {}
        }
        result
    }

    async fn forward(&self, request: ChatRequest) -> Result<ChatResponse, RelayError> {
        let (message, model) = self.validate(&request)?;
        let api_key = self.api_key.as_ref().ok_or(RelayError::Auth)?;

        let history = request.history.as_deref().unwrap_or_default();
        let messages = assemble_messages(history, message);

        telemetry::log_event(
            "relay.chat",
            &format!(
                "model={} history={} message_len={}",
                model.id,
                history.len(),
                message.len()
            ),
        );

        let reply = self
            .upstream
            .chat_once(api_key, &model.id, &messages)
            .await?;
        normalize(reply, &model.id)
    }

    /**
     * \brief 校验消息与模型，返回消息正文和解析后的模型。
     */
    pub fn validate<'r>(
        &self,
        request: &'r ChatRequest,
    ) -> Result<(&'r str, &ModelDescriptor), RelayError> {
        let message = match request.message.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => return Err(RelayError::validation(MESSAGE_REQUIRED)),
        };

        let model_id = match request.model.as_deref() {
            Some(id) => Some(id),
            None => self
                .default_model
                .as_deref()
                .or_else(|| self.catalog.default_model().map(|m| m.id.as_str())),
        };
        let model = model_id
            .and_then(|id| self.catalog.find_model(id))
            .ok_or_else(|| RelayError::model_not_found(self.catalog.ids()))?;
        Ok((message, model))
    }
}

/**
 * \brief 按原顺序复制历史并追加本次用户消息，不去重、不截断。
 */
pub fn assemble_messages(history: &[ChatTurn], message: &str) -> Vec<ChatTurn> {
    history
        .iter()
        .map(|h| ChatTurn {
            role: h.role,
            content: h.content.clone(),
        })
        .chain(std::iter::once(ChatTurn::user(message)))
        .collect()
}

/**
 * \brief 把上游原始响应转换为统一结果。
 */
pub fn normalize(reply: UpstreamReply, requested_model: &str) -> Result<ChatResponse, RelayError> {
    if !reply.status.is_success() {
        let details = serde_json::from_str::<Value>(&reply.body)
            .unwrap_or_else(|_| Value::String(reply.body.clone()));
        let message = details
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or(UPSTREAM_FALLBACK_MESSAGE)
            .to_string();
        return Err(RelayError::Upstream {
            status: reply.status.as_u16(),
            message,
            details,
        });
    }

    let v: Value = serde_json::from_str(&reply.body)
        .map_err(|e| RelayError::Transport(format!("invalid upstream response: {}", e)))?;

    let choice_message = v
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| {
            RelayError::Transport("invalid upstream response: missing choices[0].message".into())
        })?;
    let message = choice_message
        .get("content")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    let model = v
        .get("model")
        .and_then(|m| m.as_str())
        .unwrap_or(requested_model)
        .to_string();
    let usage = v.get("usage").cloned();

    Ok(ChatResponse {
        model,
        message,
        usage,
    })
}
