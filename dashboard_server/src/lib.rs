use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use config_manager::{ConfigurationError, SystemConfig};
use feed_client::{ChatClient, ChatError};
use feed_orchestrator::{FeedSupervisor, OrchestratorError};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::warn;

pub mod handlers;
pub mod types;

use handlers::*;
use types::ErrorResponse;

/// Shown for any chat failure the backend did not explain itself.
pub const CHAT_APOLOGY: &str = "Sorry, there was an error processing your request. Please try again.";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: SystemConfig,
    pub supervisor: Arc<FeedSupervisor>,
    pub chat: Arc<ChatClient>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: SystemConfig, supervisor: Arc<FeedSupervisor>) -> Result<Self, ApiError> {
        let chat = ChatClient::new(&config.backend, &config.chat)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(Self {
            config,
            supervisor,
            chat: Arc::new(chat),
            started_at: Instant::now(),
        })
    }
}

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ApiError::Orchestrator(OrchestratorError::UnknownFeed(feed)) => {
                (StatusCode::NOT_FOUND, format!("Unknown feed: {}", feed))
            }
            ApiError::Orchestrator(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            ApiError::Chat(ChatError::EmptyPrompt) => {
                (StatusCode::BAD_REQUEST, "Message cannot be empty".to_string())
            }
            ApiError::Chat(ChatError::Backend(message)) => {
                (StatusCode::BAD_GATEWAY, format!("Error: {}", message))
            }
            ApiError::Chat(e) => {
                warn!("Chat relay failed: {}", e);
                (StatusCode::BAD_GATEWAY, CHAT_APOLOGY.to_string())
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            timestamp: chrono::Utc::now(),
        });

        (status, body).into_response()
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Dashboard
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/ticker", get(get_ticker))
        .route("/api/chat", post(chat))
        // Feeds
        .route("/api/feeds", get(list_feeds))
        .route("/api/feeds/:feed_id", get(get_feed))
        .route("/api/feeds/:feed_id/summary", get(get_feed_summary))
        .route("/api/feeds/:feed_id/retry", post(retry_feed))
        .route("/api/selected-feed", put(select_feed))
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}
