use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use broadcast_service::{
    api::{AppState, router},
    clients::recipients::RecipientRegistry,
    config::Config,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const TOKEN: &str = "test-token";

pub fn bot_path(api_method: &str) -> String {
    format!("/bot{}/{}", TOKEN, api_method)
}

pub fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result }))
}

pub fn api_error(status: u16, description: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "ok": false,
        "error_code": status,
        "description": description
    }))
}

pub fn message_update(update_id: i64, user_id: i64) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "from": { "id": user_id, "is_bot": false, "first_name": format!("user{}", user_id) }
        }
    })
}

pub fn test_config(server: &MockServer) -> Config {
    Config {
        telegram_api_base_url: server.uri(),
        broadcast_batch_delay_ms: 20,
        max_retry_attempts: 1,
        initial_retry_delay_ms: 10,
        max_retry_delay_ms: 20,
        ..Config::default()
    }
}

pub fn test_app(config: Config, registry: RecipientRegistry) -> Router {
    let state = AppState::new(config, registry).expect("app state");
    router(Arc::new(state))
}

pub async fn mount_get_me(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(bot_path("getMe")))
        .respond_with(ok(json!({ "id": 999, "is_bot": true, "first_name": "Broadcaster", "username": "broadcast_bot" })))
        .mount(server)
        .await;
}

/// Polling mode with `updates` as the feed.
pub async fn mount_polling_feed(server: &MockServer, updates: Value) {
    Mock::given(method("POST"))
        .and(path(bot_path("getWebhookInfo")))
        .respond_with(ok(json!({ "url": "", "pending_update_count": 0 })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(bot_path("getUpdates")))
        .respond_with(ok(updates))
        .mount(server)
        .await;
}

pub async fn mount_send_message_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(bot_path("sendMessage")))
        .respond_with(ok(json!({ "message_id": 1 })))
        .mount(server)
        .await;
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn request(http_method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(http_method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
