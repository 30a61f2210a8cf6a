//! Gateway completion client against a local mock upstream.

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::post,
};
use diagram_gen_api::services::{
    ChatMessage, CompletionClient, CompletionError, GatewayCompletionClient,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

/// Serve a fixed status and body on a random local port; record each request.
async fn spawn_gateway(status: StatusCode, body: Value) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(payload): Json<Value>| {
            let recorder = recorder.clone();
            let body = body.clone();
            async move {
                let auth = headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                recorder.lock().unwrap().push((auth, payload));
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1/chat/completions", addr), seen)
}

fn completion_body(content: &str) -> Value {
    json!({
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

fn messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You draw diagrams."),
        ChatMessage::user("A web server and a database"),
    ]
}

#[tokio::test]
async fn test_returns_first_choice_content() {
    let (url, seen) = spawn_gateway(StatusCode::OK, completion_body("graph TD\n  A --> B")).await;
    let client = GatewayCompletionClient::new(Some("test-key".to_string()), url, "test/model");

    let content = client.complete(&messages()).await.unwrap();

    assert_eq!(content, "graph TD\n  A --> B");

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, payload) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(payload["model"], "test/model");
    assert_eq!(payload["messages"][0]["role"], "system");
    assert_eq!(payload["messages"][0]["content"], "You draw diagrams.");
    assert_eq!(payload["messages"][1]["role"], "user");
    assert_eq!(payload["messages"][1]["content"], "A web server and a database");
}

#[tokio::test]
async fn test_rate_limit_status_is_classified() {
    let (url, _) = spawn_gateway(StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"})).await;
    let client = GatewayCompletionClient::new(Some("test-key".to_string()), url, "test/model");

    let err = client.complete(&messages()).await.unwrap_err();

    assert!(matches!(err, CompletionError::RateLimited));
}

#[tokio::test]
async fn test_payment_required_status_is_classified() {
    let (url, _) = spawn_gateway(StatusCode::PAYMENT_REQUIRED, json!({"error": "no credits"})).await;
    let client = GatewayCompletionClient::new(Some("test-key".to_string()), url, "test/model");

    let err = client.complete(&messages()).await.unwrap_err();

    assert!(matches!(err, CompletionError::PaymentRequired));
}

#[tokio::test]
async fn test_other_status_carries_code_and_body() {
    let (url, _) = spawn_gateway(StatusCode::BAD_GATEWAY, json!({"error": "upstream down"})).await;
    let client = GatewayCompletionClient::new(Some("test-key".to_string()), url, "test/model");

    let err = client.complete(&messages()).await.unwrap_err();

    match err {
        CompletionError::Status { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("upstream down"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_or_blank_content_is_empty() {
    for body in [
        json!({ "choices": [] }),
        json!({ "choices": [ { "message": { "role": "assistant" } } ] }),
        completion_body("   "),
    ] {
        let (url, _) = spawn_gateway(StatusCode::OK, body).await;
        let client = GatewayCompletionClient::new(Some("test-key".to_string()), url, "test/model");

        let err = client.complete(&messages()).await.unwrap_err();

        assert!(matches!(err, CompletionError::EmptyContent));
    }
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let (url, seen) = spawn_gateway(StatusCode::OK, completion_body("graph TD")).await;

    for key in [None, Some("  ".to_string())] {
        let client = GatewayCompletionClient::new(key, url.clone(), "test/model");
        assert!(!client.is_configured());

        let err = client.complete(&messages()).await.unwrap_err();
        assert!(matches!(err, CompletionError::MissingApiKey));
    }

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_gateway_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GatewayCompletionClient::new(
        Some("test-key".to_string()),
        format!("http://{}/v1/chat/completions", addr),
        "test/model",
    );

    let err = client.complete(&messages()).await.unwrap_err();

    assert!(matches!(err, CompletionError::Transport(_)));
}
