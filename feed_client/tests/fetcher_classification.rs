use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use config_manager::{BackendConfig, ChatConfig, EnvelopeShape, TickerConfig};
use feed_client::{BackendClient, ChatClient, ChatError, FetchOutcome, TickerClient, TokenFeedFetcher};
use serde_json::{json, Value};

async fn cache_checked_feed(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let no_cache = headers
        .get("cache-control")
        .and_then(|v| v.to_str().ok())
        == Some("no-cache");
    if !no_cache || !params.contains_key("t") {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "cacheable request"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": [
                {"tokenTicker": "AAA", "marketCapSol": 10.0, "devHoldsPercent": 0},
                {"tokenTicker": "aaa", "marketCapSol": 50.0, "devHoldsPercent": 0},
                {"tokenTicker": "", "marketCapSol": 5.0}
            ]
        })),
    )
}

async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route("/api/ai-token", get(cache_checked_feed))
        .route(
            "/api/ai-token-bnb",
            get(|| async { Json(json!({"status": "Success", "data": [{"tokenTicker": "BNB1"}]})) }),
        )
        .route(
            "/api/failing",
            get(|| async { Json(json!({"success": false, "message": "no tokens yet"})) }),
        )
        .route(
            "/api/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/api/not-json", get(|| async { "definitely not json" }))
        .route(
            "/api/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"success": true, "data": []}))
            }),
        )
        .route(
            "/api/currencies",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": [{"name": "Solana", "cid": "SOL", "currency": "SOL", "icon": "", "price_usd": "151.2", "rate_usd": "0.0066", "maintenance": false}]
                }))
            }),
        )
        .route(
            "/api/ai-chat/chat",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
                Json(json!({"success": true, "response": format!("echo: {}", prompt)}))
            }),
        )
        .route(
            "/api/chat-quota",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"success": false, "error": "quota exceeded"})),
                )
            }),
        )
        .route(
            "/api/chat-empty",
            post(|| async { Json(json!({"success": false})) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn backend(addr: SocketAddr, timeout_seconds: u64) -> BackendConfig {
    BackendConfig {
        base_url: format!("http://{}", addr),
        request_timeout_seconds: timeout_seconds,
    }
}

fn client(addr: SocketAddr) -> BackendClient {
    BackendClient::new(backend(addr, 1)).unwrap()
}

#[tokio::test]
async fn test_success_envelope_with_no_cache_request() {
    let addr = spawn_backend().await;
    match client(addr).fetch_feed("ai-token", EnvelopeShape::Either).await {
        FetchOutcome::Success(records) => assert_eq!(records.len(), 3),
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_status_envelope_respects_shape() {
    let addr = spawn_backend().await;
    let client = client(addr);

    assert!(matches!(
        client.fetch_feed("ai-token-bnb", EnvelopeShape::StatusField).await,
        FetchOutcome::Success(ref records) if records.len() == 1
    ));
    assert!(matches!(
        client.fetch_feed("ai-token-bnb", EnvelopeShape::SuccessFlag).await,
        FetchOutcome::SoftFailure(_)
    ));
}

#[tokio::test]
async fn test_answered_but_unusable_is_soft_failure() {
    let addr = spawn_backend().await;
    let client = client(addr);

    for path in ["failing", "broken", "not-json", "no-such-route"] {
        let outcome = client.fetch_feed(path, EnvelopeShape::Either).await;
        assert!(
            matches!(outcome, FetchOutcome::SoftFailure(_)),
            "{} should be a soft failure, got {:?}",
            path,
            outcome
        );
    }
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let addr = spawn_backend().await;
    let outcome = client(addr).fetch_feed("slow", EnvelopeShape::Either).await;
    assert!(outcome.is_network_failure(), "got {:?}", outcome);
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = client(addr).fetch_feed("ai-token", EnvelopeShape::Either).await;
    assert!(outcome.is_network_failure(), "got {:?}", outcome);
}

#[tokio::test]
async fn test_ticker_quotes() {
    let addr = spawn_backend().await;
    let ticker = TickerClient::new(
        &backend(addr, 1),
        &TickerConfig {
            enabled: true,
            path: "currencies".to_string(),
            poll_interval_seconds: 5,
            request_timeout_seconds: 2,
        },
    )
    .unwrap();

    let quotes = ticker.fetch_quotes().await.unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].price_label(), "$151.20");
}

fn chat(addr: SocketAddr, path: &str) -> ChatClient {
    ChatClient::new(
        &backend(addr, 1),
        &ChatConfig {
            path: path.to_string(),
            request_timeout_seconds: 2,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn test_chat_relay_answers_and_errors() {
    let addr = spawn_backend().await;

    let answer = chat(addr, "ai-chat/chat").ask("what is trending?").await.unwrap();
    assert_eq!(answer, "echo: what is trending?");

    match chat(addr, "chat-quota").ask("hello").await {
        Err(ChatError::Backend(message)) => assert_eq!(message, "quota exceeded"),
        other => panic!("expected backend error, got {:?}", other),
    }

    assert!(matches!(
        chat(addr, "chat-empty").ask("hello").await,
        Err(ChatError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_chat_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(matches!(
        chat(addr, "ai-chat/chat").ask("hello").await,
        Err(ChatError::Transport(_))
    ));
}
