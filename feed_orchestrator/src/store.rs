use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use token_core::{ReconcileReport, TokenRecord};
use tokio::sync::watch;

/// Where a feed's reconciliation loop currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// No cycle has run yet
    Idle,
    Fetching,
    /// Last cycle published a fresh list
    SettledOk,
    /// Last cycle got an answer with nothing usable in it
    SettledEmpty,
    /// Last cycle could not reach the backend
    SettledOutage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCounters {
    pub completed: u64,
    pub soft_failures: u64,
    pub network_failures: u64,
    pub skipped: u64,
}

/// Everything one feed publishes to its readers.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub feed_id: String,
    /// Clean list from the last publishing cycle
    pub tokens: Arc<Vec<TokenRecord>>,
    /// Set by a network failure, cleared by any later answer from the backend
    pub outage: bool,
    pub state: LoopState,
    /// Time of the last successful reconciliation
    pub last_updated: Option<DateTime<Utc>>,
    pub last_report: Option<ReconcileReport>,
    pub counters: CycleCounters,
}

impl FeedSnapshot {
    pub fn empty(feed_id: impl Into<String>) -> Self {
        Self {
            feed_id: feed_id.into(),
            tokens: Arc::new(Vec::new()),
            outage: false,
            state: LoopState::Idle,
            last_updated: None,
            last_report: None,
            counters: CycleCounters::default(),
        }
    }
}

/// Single-writer, many-reader holder of a feed's latest snapshot.
#[derive(Clone)]
pub struct FeedStore {
    sender: Arc<watch::Sender<FeedSnapshot>>,
}

impl FeedStore {
    pub fn new(feed_id: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(FeedSnapshot::empty(feed_id));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.sender.subscribe()
    }

    /// Apply `change` and wake every subscriber.
    pub(crate) fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut FeedSnapshot),
    {
        self.sender.send_modify(change);
    }
}
