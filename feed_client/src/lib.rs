//! HTTP clients for the dashboard backend: token feeds, currency ticker and
//! the assistant chat relay.

pub mod backend_client;
pub mod chat_client;
pub mod envelope;
pub mod ticker_client;

pub use backend_client::{BackendClient, FetchOutcome, TokenFeedFetcher};
pub use chat_client::{ChatClient, ChatError};
pub use envelope::parse_feed_envelope;
pub use ticker_client::{CurrencyQuote, TickerClient, TickerError};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid backend URL: {0}")]
    InvalidBaseUrl(String),
}

pub type Result<T> = std::result::Result<T, FeedClientError>;
