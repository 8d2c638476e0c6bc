use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Environment variable prefix, e.g. `DASHBOARD__BACKEND__BASE_URL`
pub const ENV_PREFIX: &str = "DASHBOARD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Backend the dashboard polls (token feeds, currencies, assistant)
    pub backend: BackendConfig,

    /// Token feeds, one reconciliation loop each
    pub feeds: Vec<FeedConfig>,

    /// Feed shown to the user on startup
    pub selected_feed: String,

    /// Currency price ticker
    pub ticker: TickerConfig,

    /// Assistant chat relay
    pub chat: ChatConfig,

    /// List windowing
    pub presentation: PresentationConfig,

    /// Dashboard server configuration
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend base URL, without the `/api` suffix
    pub base_url: String,

    /// Feed request timeout in seconds. A timeout counts as an outage.
    pub request_timeout_seconds: u64,
}

/// Which success envelope a feed endpoint answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeShape {
    /// `{ "success": true, "data": [...] }`
    SuccessFlag,
    /// `{ "status": "Success", "data": [...] }`
    StatusField,
    /// Either of the above
    Either,
}

/// What a feed publishes when the backend answers but the payload is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftFailurePolicy {
    /// Publish an empty list
    Clear,
    /// Keep whatever was published last
    Retain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Feed identifier, e.g. "solana"
    pub id: String,

    /// Path under `<base_url>/api/`
    pub path: String,

    /// Accepted success envelope
    pub envelope: EnvelopeShape,

    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// USD price of the chain's native unit, used for summary totals
    pub native_usd_price: f64,

    pub soft_failure_policy: SoftFailurePolicy,
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    pub enabled: bool,

    /// Path under `<base_url>/api/`
    pub path: String,

    pub poll_interval_seconds: u64,

    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Path under `<base_url>/api/`
    pub path: String,

    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Rows added to the visible window per page
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_seconds: 5,
            },
            feeds: vec![
                FeedConfig {
                    id: "solana".to_string(),
                    path: "ai-token".to_string(),
                    envelope: EnvelopeShape::Either,
                    poll_interval_ms: 1000,
                    native_usd_price: 150.0,
                    soft_failure_policy: SoftFailurePolicy::Clear,
                },
                FeedConfig {
                    id: "bnb".to_string(),
                    path: "ai-token-bnb".to_string(),
                    envelope: EnvelopeShape::Either,
                    poll_interval_ms: 1000,
                    native_usd_price: 650.0,
                    soft_failure_policy: SoftFailurePolicy::Clear,
                },
            ],
            selected_feed: "solana".to_string(),
            ticker: TickerConfig {
                enabled: true,
                path: "currencies".to_string(),
                poll_interval_seconds: 5,
                request_timeout_seconds: 10,
            },
            chat: ChatConfig {
                path: "ai-chat/chat".to_string(),
                request_timeout_seconds: 10,
            },
            presentation: PresentationConfig { page_size: 20 },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ConfigurationError::InvalidValue(format!(
                "backend.base_url '{}' is not a valid URL: {}",
                self.base_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidValue(format!(
                "backend.base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL for a path under `/api/`
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Feed id cannot be empty".to_string(),
            ));
        }

        if self.path.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(format!(
                "Feed '{}' has an empty path",
                self.id
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::InvalidValue(format!(
                "Feed '{}' poll interval must be greater than 0",
                self.id
            )));
        }

        if !(self.native_usd_price.is_finite() && self.native_usd_price > 0.0) {
            return Err(ConfigurationError::InvalidValue(format!(
                "Feed '{}' native_usd_price must be positive",
                self.id
            )));
        }

        Ok(())
    }
}

impl SystemConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );

        let system_config: SystemConfig = config_builder.build()?.try_deserialize()?;

        system_config.validate()?;

        Ok(system_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;

        if self.feeds.is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "At least one feed must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            feed.validate()?;
            if !seen.insert(feed.id.as_str()) {
                return Err(ConfigurationError::InvalidValue(format!(
                    "Duplicate feed id '{}'",
                    feed.id
                )));
            }
        }

        if self.feed(&self.selected_feed).is_none() {
            return Err(ConfigurationError::InvalidValue(format!(
                "selected_feed '{}' is not a configured feed",
                self.selected_feed
            )));
        }

        if self.ticker.enabled
            && (self.ticker.poll_interval_seconds == 0 || self.ticker.request_timeout_seconds == 0)
        {
            return Err(ConfigurationError::InvalidValue(
                "Ticker interval and timeout must be greater than 0".to_string(),
            ));
        }

        if self.chat.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Chat timeout must be greater than 0".to_string(),
            ));
        }

        if self.presentation.page_size == 0 {
            return Err(ConfigurationError::InvalidValue(
                "presentation.page_size must be greater than 0".to_string(),
            ));
        }

        if self.api.port == 0 {
            return Err(ConfigurationError::InvalidValue(
                "API port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Look up a feed by id
    pub fn feed(&self, id: &str) -> Option<&FeedConfig> {
        self.feeds.iter().find(|feed| feed.id == id)
    }
}
