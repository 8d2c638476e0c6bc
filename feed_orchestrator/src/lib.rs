pub mod reconciliation;
pub mod store;
pub mod supervisor;
pub mod ticker;

pub use reconciliation::{CycleOutcome, InFlightGuard, ReconciliationLoop};
pub use store::{CycleCounters, FeedSnapshot, FeedStore, LoopState};
pub use supervisor::FeedSupervisor;
pub use ticker::{QuoteList, TickerPoller};

use config_manager::ConfigurationError;
use feed_client::FeedClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Unknown feed: {0}")]
    UnknownFeed(String),
    #[error("Feed client error: {0}")]
    Client(#[from] FeedClientError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),
    #[error("Feed supervisor already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
