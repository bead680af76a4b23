use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zenchat_core_sdk::{
    catalog::Catalog,
    config::Config,
    server::{router, AppState},
};

fn app(base_url: &str, api_key: Option<&str>) -> Router {
    let config = Config {
        base_url: base_url.to_string(),
        ui_dir: "does-not-exist".into(),
        ..Config::default()
    }
    .with_api_key(api_key.map(str::to_string));
    let state = AppState::new(&config, Arc::new(Catalog::default())).unwrap();
    router(state, &config)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_chat(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn models_lists_catalog_in_order() {
    let (status, body) = send(app("http://unused", None), get("/models")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "big-pickle",
            "minimax-m2.5-free",
            "glm-5-free",
            "kimi-k2.5-free",
            "gpt-5-nano"
        ]
    );
    assert_eq!(
        body["models"][0],
        json!({"id": "big-pickle", "name": "Big Pickle", "provider": "OpenCode"})
    );
}

#[tokio::test]
async fn api_key_reports_presence_only() {
    let (status, body) = send(app("http://unused", None), get("/api-key")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"configured": false}));

    let (status, body) = send(app("http://unused", Some("sk-secret")), get("/api-key")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"configured": true}));
}

#[tokio::test]
async fn chat_without_message_is_bad_request() {
    let (status, body) = send(
        app("http://unused", Some("k")),
        post_chat(json!({"model": "big-pickle"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Message is required"}));
}

#[tokio::test]
async fn chat_with_unknown_model_lists_available_models() {
    let (status, body) = send(
        app("http://unused", Some("k")),
        post_chat(json!({"message": "hi", "model": "gpt-4"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Model not found");
    assert_eq!(body["available_models"], json!(Catalog::default().ids()));
}

#[tokio::test]
async fn chat_with_malformed_body_is_bad_request() {
    let (status, body) = send(
        app("http://unused", Some("k")),
        post_chat(json!({"message": "hi", "history": [{"role": "robot", "content": "x"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn chat_without_key_is_unauthorized_and_never_calls_upstream() {
    let upstream = MockServer::start().await;
    let (status, body) = send(
        app(&upstream.uri(), None),
        post_chat(json!({"message": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({
            "error": "API key not configured",
            "instructions": "Set OPENCODE_API_KEY environment variable"
        })
    );
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn chat_success_is_normalized() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header_eq("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cmpl-1",
            "model": "m",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "ok"}}],
            "usage": {"tokens": 5}
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let (status, body) = send(
        app(&upstream.uri(), Some("sk-test")),
        post_chat(json!({
            "message": "how are you",
            "history": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"model": "m", "message": "ok", "usage": {"tokens": 5}}));

    let sent = upstream.received_requests().await.unwrap();
    assert_eq!(sent.len(), 1);
    let sent_body: Value = serde_json::from_slice(&sent[0].body).unwrap();
    assert_eq!(
        sent_body,
        json!({
            "model": "big-pickle",
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "how are you"}
            ],
            "stream": false
        })
    );
}

#[tokio::test]
async fn upstream_rate_limit_is_relayed_with_its_status() {
    let upstream = MockServer::start().await;
    let error_body = json!({"error": {"message": "rate limited", "type": "rate_limit"}});
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(error_body.clone()))
        .expect(1)
        .mount(&upstream)
        .await;

    let (status, body) = send(
        app(&upstream.uri(), Some("sk-test")),
        post_chat(json!({"message": "hi", "model": "gpt-5-nano"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({"error": "rate limited", "details": error_body}));
}

#[tokio::test]
async fn unreachable_upstream_is_internal_error() {
    let (status, body) = send(
        app("http://127.0.0.1:1", Some("sk-test")),
        post_chat(json!({"message": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn unknown_paths_fall_through_to_static_files() {
    let (status, _) = send(app("http://unused", None), get("/no-such-page.html")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
