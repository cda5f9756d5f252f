//! HTTP ingestion endpoint tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chatplay::{
    Bot, LogMessenger, Messenger, Orchestrator, RenderInstruction, RenderMode, Router, Services,
    StandardEngines, TransportError, app,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

struct Unreachable;

#[async_trait::async_trait]
impl Messenger for Unreachable {
    async fn deliver(&self, _instruction: &RenderInstruction) -> Result<(), TransportError> {
        Err(TransportError::new("connection refused"))
    }
}

fn bot(messenger: Arc<dyn Messenger>) -> Arc<Bot> {
    Arc::new(Bot::new(
        Orchestrator::new(Arc::new(StandardEngines::default())),
        Router::with_keywords().unwrap(),
        Services::none(),
        messenger,
    ))
}

fn event(chat_id: i64, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/chats/{chat_id}/events"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn test_health() {
    let response = app(bot(Arc::new(LogMessenger)))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"ok");
}

#[tokio::test]
async fn test_event_returns_instructions() {
    let bot = bot(Arc::new(LogMessenger));

    let response = app(bot.clone())
        .oneshot(event(7, r#"{"type": "command", "name": "tictactoe"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let out: Vec<RenderInstruction> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].chat_id, 7);
    assert_eq!(out[0].text, "Choose board size: 3 or 8");

    app(bot.clone())
        .oneshot(event(7, r#"{"type": "text", "text": "3"}"#))
        .await
        .unwrap();
    app(bot.clone())
        .oneshot(event(7, r#"{"type": "button_press", "index": 0}"#))
        .await
        .unwrap();

    let response = app(bot)
        .oneshot(event(7, r#"{"type": "button_press", "index": 4}"#))
        .await
        .unwrap();
    let out: Vec<RenderInstruction> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].mode, RenderMode::Edit);
    assert_eq!(out[0].buttons.as_ref().unwrap().rows().len(), 3);
}

#[tokio::test]
async fn test_malformed_event_is_rejected() {
    let response = app(bot(Arc::new(LogMessenger)))
        .oneshot(event(1, r#"{"type": "sticker"}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_delivery_failure_is_bad_gateway() {
    let bot = bot(Arc::new(Unreachable));
    let response = app(bot.clone())
        .oneshot(event(3, r#"{"type": "command", "name": "matches"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["kind"], "transport failure");

    assert_eq!(
        bot.orchestrator().store().state_of(3).await,
        chatplay::SessionState::AwaitingMatchesFirstMove
    );
}
