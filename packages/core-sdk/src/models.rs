use serde::{Deserialize, Serialize};
use serde_json::Value;

/**
 * \brief 模型描述，目录中的一项。
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /** \brief 稳定唯一的模型 ID，转发给上游 */
    pub id: String,
    /** \brief 显示名称 */
    pub name: String,
    /** \brief 模型提供方（仅用于展示） */
    pub provider: String,
}

impl ModelDescriptor {
    pub fn new(id: &str, name: &str, provider: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/**
 * \brief 对话中的一轮消息，与 OpenAI Chat 消息格式对齐。
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /** \brief 角色：user/assistant */
    pub role: Role,
    /** \brief 内容 */
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/**
 * \brief POST /chat 的请求体。
 */
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /** \brief 本次用户消息，不可为空 */
    #[serde(default)]
    pub message: Option<String>,
    /** \brief 模型 ID，缺省时使用默认模型 */
    #[serde(default)]
    pub model: Option<String>,
    /** \brief 之前的对话轮次，按时间顺序 */
    #[serde(default)]
    pub history: Option<Vec<ChatTurn>>,
}

/**
 * \brief 成功时返回给调用方的结果。
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /** \brief 上游报告的模型 */
    pub model: String,
    /** \brief 第一个候选回复的内容 */
    pub message: String,
    /** \brief 上游的 token 用量，原样透传 */
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
}

/**
 * \brief 失败时返回给调用方的统一结构。
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            available_models: None,
            instructions: None,
        }
    }
}
