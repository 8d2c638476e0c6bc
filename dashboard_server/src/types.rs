use chrono::{DateTime, Utc};
use feed_client::CurrencyQuote;
use feed_orchestrator::{CycleCounters, LoopState};
use serde::{Deserialize, Serialize};
use token_core::{ReconcileReport, SummaryStats, TokenRecord};

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Standard API success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Window size query, `?pages=N`
#[derive(Debug, Deserialize)]
pub struct PagesQuery {
    pub pages: Option<usize>,
}

/// A token row with its display age
#[derive(Debug, Serialize)]
pub struct TokenRow {
    #[serde(flatten)]
    pub token: TokenRecord,
    /// "5m", "3h", "2d"; absent when the token carries no usable date
    pub age: Option<String>,
}

/// Windowed view of one feed
#[derive(Debug, Serialize)]
pub struct FeedView {
    pub feed_id: String,
    pub state: LoopState,
    /// Backend unreachable; the client shows the maintenance screen
    pub maintenance: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub total_tokens: usize,
    pub visible_tokens: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub all_loaded: bool,
    pub tokens: Vec<TokenRow>,
}

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub feed_id: String,
    pub native_usd_price: f64,
    #[serde(flatten)]
    pub stats: SummaryStats,
    pub market_cap_label: String,
    pub volume_label: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteView {
    #[serde(flatten)]
    pub quote: CurrencyQuote,
    pub price_label: String,
}

/// Everything the dashboard page renders for the selected feed
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub selected_feed: String,
    pub feeds: Vec<String>,
    pub feed: FeedView,
    pub summary: SummaryView,
    pub ticker: Vec<QuoteView>,
}

/// Status row in the feed list
#[derive(Debug, Serialize)]
pub struct FeedStatus {
    pub feed_id: String,
    pub selected: bool,
    pub state: LoopState,
    pub outage: bool,
    pub token_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_report: Option<ReconcileReport>,
    pub counters: CycleCounters,
}

#[derive(Debug, Serialize)]
pub struct RetryResponse {
    pub feed_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectFeedRequest {
    pub feed_id: String,
}

#[derive(Debug, Serialize)]
pub struct SelectFeedResponse {
    pub selected_feed: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}
