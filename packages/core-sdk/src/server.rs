use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, get_service, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::{
    catalog::Catalog,
    config::{Config, ENV_API_KEY},
    error::RelayError,
    models::{ChatRequest, ChatResponse, ModelDescriptor},
    relay::Relay,
    telemetry,
};

/**
 * \brief 各路由共享的只读状态。
 */
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(config: &Config, catalog: Arc<Catalog>) -> Result<Self, RelayError> {
        Ok(Self {
            relay: Arc::new(Relay::new(config, catalog)?),
        })
    }
}

#[derive(Serialize, Debug)]
struct ModelsResponse {
    models: Vec<ModelDescriptor>,
}

#[derive(Serialize, Debug)]
struct ApiKeyStatus {
    configured: bool,
}

/**
 * \brief 构建路由：API 之外的路径交给静态页面目录。
 */
pub fn router(state: AppState, config: &Config) -> Router {
    let static_service =
        get_service(ServeDir::new(&config.ui_dir).append_index_html_on_directories(true));

    Router::new()
        .route("/models", get(list_models))
        .route("/api-key", get(api_key_status))
        .route("/chat", post(chat))
        .fallback_service(static_service)
        .with_state(state)
}

/**
 * \brief 启动 HTTP 服务，提供聊天页面与 API。
 */
pub async fn run(config: Config) -> Result<()> {
    let catalog = Arc::new(Catalog::default());
    let state = AppState::new(&config, catalog.clone()).context("build relay failed")?;
    let app = router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {} failed", addr))?;

    tracing::info!("ZenChat server: http://localhost:{}", config.port);
    tracing::info!(
        "Free models: {}",
        catalog
            .list_models()
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if telemetry::is_enabled() {
        tracing::info!("event log enabled: {:?}", config.log_dir);
    }
    if !config.api_key_configured() {
        tracing::warn!(
            "API key not configured; get one at https://opencode.ai/auth and run: export {}=your_key_here",
            ENV_API_KEY
        );
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.relay.catalog().list_models().to_vec(),
    })
}

/**
 * \brief 只报告密钥是否已配置，不返回密钥本身。
 */
async fn api_key_status(State(state): State<AppState>) -> Json<ApiKeyStatus> {
    Json(ApiKeyStatus {
        configured: state.relay.credential_configured(),
    })
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    let Json(request) = payload.map_err(|rejection| {
        telemetry::log_warn("server.chat", &format!("rejected body: {}", rejection));
        RelayError::validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;
    let response = state.relay.handle_chat(request).await?;
    Ok(Json(response))
}
