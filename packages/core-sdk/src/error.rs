use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use thiserror::Error;

use crate::config::ENV_API_KEY;
use crate::models::ErrorResponse;

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const MODEL_NOT_FOUND: &str = "Model not found";
pub const API_KEY_NOT_CONFIGURED: &str = "API key not configured";
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "API request failed";

/**
 * \brief 转发过程中可能出现的全部错误。
 */
#[derive(Debug, Error)]
pub enum RelayError {
    /** \brief 客户端输入有误，修正后可重试 */
    #[error("{message}")]
    Validation {
        message: String,
        available_models: Option<Vec<String>>,
    },

    /** \brief 未配置上游密钥，需要运维处理 */
    #[error("API key not configured")]
    Auth,

    /** \brief 上游返回了失败状态码 */
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        details: Value,
    },

    /** \brief 网络或解析失败 */
    #[error("{0}")]
    Transport(String),
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            available_models: None,
        }
    }

    pub fn model_not_found(available_models: Vec<String>) -> Self {
        Self::Validation {
            message: MODEL_NOT_FOUND.to_string(),
            available_models: Some(available_models),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Auth => StatusCode::UNAUTHORIZED,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /**
     * \brief 转换为返回给调用方的统一错误体。
     */
    pub fn to_response(&self) -> ErrorResponse {
        let mut body = ErrorResponse::new(self.to_string());
        match self {
            Self::Validation {
                available_models, ..
            } => body.available_models = available_models.clone(),
            Self::Auth => {
                body.instructions = Some(format!("Set {} environment variable", ENV_API_KEY))
            }
            Self::Upstream { details, .. } => body.details = Some(details.clone()),
            Self::Transport(_) => {}
        }
        body
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_response())).into_response()
    }
}
