use config_manager::{BackendConfig, TickerConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use token_core::format_price_label;
use tracing::debug;

use crate::{FeedClientError, Result};

#[derive(Error, Debug)]
pub enum TickerError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Currency endpoint reported failure: {0}")]
    Unsuccessful(String),
    #[error("Currency payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One currency entry from the price ticker endpoint. Extra wire fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyQuote {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cid: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub icon: String,
    /// Decimal string, e.g. "64250.12"
    #[serde(default)]
    pub price_usd: String,
    #[serde(default)]
    pub rate_usd: String,
    #[serde(default)]
    pub maintenance: bool,
}

impl CurrencyQuote {
    pub fn price(&self) -> Option<f64> {
        self.price_usd.trim().parse::<f64>().ok().filter(|p| p.is_finite())
    }

    /// Display label, `$0.00` when the price is unreadable.
    pub fn price_label(&self) -> String {
        format_price_label(self.price().unwrap_or(0.0))
    }
}

#[derive(Debug, Deserialize)]
struct CurrencyResponse {
    success: bool,
    #[serde(default)]
    data: Vec<CurrencyQuote>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the currency price ticker.
#[derive(Clone)]
pub struct TickerClient {
    url: String,
    http_client: Client,
}

impl TickerClient {
    pub fn new(backend: &BackendConfig, ticker: &TickerConfig) -> Result<Self> {
        backend
            .validate()
            .map_err(|e| FeedClientError::InvalidBaseUrl(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(ticker.request_timeout_seconds))
            .build()?;

        Ok(Self {
            url: backend.endpoint(&ticker.path),
            http_client,
        })
    }

    pub async fn fetch_quotes(&self) -> std::result::Result<Vec<CurrencyQuote>, TickerError> {
        debug!("Fetching currency quotes: {}", self.url);

        let response = self.http_client.get(&self.url).send().await?;
        let body = response.bytes().await?;
        let parsed: CurrencyResponse = serde_json::from_slice(&body)?;

        if !parsed.success {
            return Err(TickerError::Unsuccessful(
                parsed.message.unwrap_or_else(|| "success = false".to_string()),
            ));
        }

        Ok(parsed.data)
    }
}
