use async_trait::async_trait;
use chrono::Utc;
use config_manager::{BackendConfig, EnvelopeShape};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::time::Duration;
use token_core::TokenRecord;
use tracing::{debug, warn};

use crate::envelope::parse_feed_envelope;
use crate::{FeedClientError, Result};

/// Classified result of one feed request. Fetching never fails with an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The backend answered with a well-formed success envelope
    Success(Vec<TokenRecord>),
    /// The backend answered, but with nothing usable
    SoftFailure(String),
    /// No response at all: timeout, refused connection, DNS, reset
    NetworkFailure(String),
}

impl FetchOutcome {
    pub fn is_network_failure(&self) -> bool {
        matches!(self, FetchOutcome::NetworkFailure(_))
    }
}

/// Source of raw token lists for a reconciliation loop.
#[async_trait]
pub trait TokenFeedFetcher: Send + Sync {
    /// Fetch the feed served under `path` and classify the result.
    async fn fetch_feed(&self, path: &str, envelope: EnvelopeShape) -> FetchOutcome;
}

/// HTTP client for the backend token feeds.
#[derive(Clone)]
pub struct BackendClient {
    config: BackendConfig,
    http_client: Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| FeedClientError::InvalidBaseUrl(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_seconds)
    }
}

#[async_trait]
impl TokenFeedFetcher for BackendClient {
    async fn fetch_feed(&self, path: &str, envelope: EnvelopeShape) -> FetchOutcome {
        let url = self.endpoint(path);
        let cache_buster = Utc::now().timestamp_millis().to_string();

        debug!("Fetching token feed: {}", url);

        let response = match self
            .http_client
            .get(&url)
            .query(&[("t", cache_buster.as_str())])
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Token feed {} unreachable: {}", url, e);
                return FetchOutcome::NetworkFailure(describe_transport_error(&e));
            }
        };

        let status = response.status();

        // The body may still time out or be cut off after the headers arrived.
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Token feed {} failed while reading the body: {}", url, e);
                return FetchOutcome::NetworkFailure(describe_transport_error(&e));
            }
        };

        if !status.is_success() {
            debug!("Token feed {} answered HTTP {}", url, status);
            return FetchOutcome::SoftFailure(format!("HTTP {}", status));
        }

        match parse_feed_envelope(&body, envelope) {
            Ok(records) => {
                debug!("Token feed {} returned {} records", url, records.len());
                FetchOutcome::Success(records)
            }
            Err(reason) => {
                debug!("Token feed {} returned an unusable payload: {}", url, reason);
                FetchOutcome::SoftFailure(reason)
            }
        }
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        format!("transport error: {}", error)
    }
}
