use crate::types::*;
use crate::{ApiError, AppState};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use feed_orchestrator::FeedSnapshot;
use token_core::{format_token_age, SummaryStats, TokenWindow};
use tracing::{debug, info};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(SuccessResponse::new(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

/// Selected feed with summary and ticker
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<PagesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let supervisor = &state.supervisor;
    let selected = supervisor.selected_feed();
    let snapshot = supervisor.snapshot(&selected)?;

    let response = DashboardResponse {
        feeds: supervisor.feed_ids(),
        feed: feed_view(&state, &snapshot, query.pages),
        summary: summary_view(&state, &snapshot)?,
        ticker: ticker_view(&state),
        selected_feed: selected,
    };

    Ok(Json(SuccessResponse::new(response)))
}

/// Status of every configured feed
pub async fn list_feeds(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let selected = state.supervisor.selected_feed();

    let mut feeds = Vec::new();
    for feed_id in state.supervisor.feed_ids() {
        let snapshot = state.supervisor.snapshot(&feed_id)?;
        feeds.push(FeedStatus {
            selected: feed_id == selected,
            feed_id,
            state: snapshot.state,
            outage: snapshot.outage,
            token_count: snapshot.tokens.len(),
            last_updated: snapshot.last_updated,
            last_report: snapshot.last_report,
            counters: snapshot.counters,
        });
    }

    Ok(Json(SuccessResponse::new(feeds)))
}

/// One feed's windowed token list
pub async fn get_feed(
    State(state): State<AppState>,
    Path(feed_id): Path<String>,
    Query(query): Query<PagesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.supervisor.snapshot(&feed_id)?;
    Ok(Json(SuccessResponse::new(feed_view(&state, &snapshot, query.pages))))
}

pub async fn get_feed_summary(
    State(state): State<AppState>,
    Path(feed_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.supervisor.snapshot(&feed_id)?;
    Ok(Json(SuccessResponse::new(summary_view(&state, &snapshot)?)))
}

/// Manual retry from the maintenance screen
pub async fn retry_feed(
    State(state): State<AppState>,
    Path(feed_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.supervisor.retry(&feed_id)?;
    info!("Manual retry requested for feed {}", feed_id);

    Ok(Json(SuccessResponse::new(RetryResponse {
        message: format!("Refresh of feed {} requested", feed_id),
        feed_id,
    })))
}

pub async fn select_feed(
    State(state): State<AppState>,
    Json(request): Json<SelectFeedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let feed_id = request.feed_id.trim();
    if feed_id.is_empty() {
        return Err(ApiError::BadRequest("feed_id is required".to_string()));
    }

    state.supervisor.select_feed(feed_id)?;

    Ok(Json(SuccessResponse::new(SelectFeedResponse {
        selected_feed: state.supervisor.selected_feed(),
    })))
}

pub async fn get_ticker(State(state): State<AppState>) -> impl IntoResponse {
    Json(SuccessResponse::new(ticker_view(&state)))
}

/// Relay a prompt to the assistant
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Chat prompt received ({} chars)", request.message.len());
    let response = state.chat.ask(&request.message).await?;
    Ok(Json(SuccessResponse::new(ChatReply { response })))
}

fn feed_view(state: &AppState, snapshot: &FeedSnapshot, pages: Option<usize>) -> FeedView {
    let page_size = state.config.presentation.page_size;
    let window = TokenWindow::with_pages(page_size, pages.unwrap_or(1));
    let total = snapshot.tokens.len();
    let now = Utc::now();

    let tokens = window
        .visible(&snapshot.tokens)
        .iter()
        .map(|token| TokenRow {
            age: format_token_age(token, now),
            token: token.clone(),
        })
        .collect();

    FeedView {
        feed_id: snapshot.feed_id.clone(),
        state: snapshot.state,
        maintenance: snapshot.outage,
        last_updated: snapshot.last_updated,
        total_tokens: total,
        visible_tokens: window.visible_count(total),
        page_size: window.page_size(),
        has_more: window.has_more(total),
        all_loaded: window.all_loaded(total),
        tokens,
    }
}

fn summary_view(state: &AppState, snapshot: &FeedSnapshot) -> Result<SummaryView, ApiError> {
    let price = state.supervisor.feed_config(&snapshot.feed_id)?.native_usd_price;
    let stats = SummaryStats::from_tokens(&snapshot.tokens, price);

    Ok(SummaryView {
        feed_id: snapshot.feed_id.clone(),
        native_usd_price: price,
        market_cap_label: stats.market_cap_label(),
        volume_label: stats.volume_label(),
        stats,
    })
}

fn ticker_view(state: &AppState) -> Vec<QuoteView> {
    state
        .supervisor
        .quotes()
        .iter()
        .map(|quote| QuoteView {
            price_label: quote.price_label(),
            quote: quote.clone(),
        })
        .collect()
}
