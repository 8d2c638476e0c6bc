use chrono::Utc;
use config_manager::{FeedConfig, SoftFailurePolicy};
use feed_client::{FetchOutcome, TokenFeedFetcher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use token_core::{reconcile, ReconcileReport};
use tokio::sync::{watch, Notify};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::store::{FeedStore, LoopState};

/// Result of one trigger of a reconciliation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A fetch was already in flight; nothing happened
    Skipped,
    Published(ReconcileReport),
    SoftFailure(String),
    Outage(String),
}

/// Holds the single in-flight slot of a loop until dropped.
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    /// Claim the slot, or `None` if another cycle holds it.
    pub fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Periodic fetch, reconcile and publish for one feed.
#[derive(Clone)]
pub struct ReconciliationLoop {
    feed: FeedConfig,
    fetcher: Arc<dyn TokenFeedFetcher>,
    store: FeedStore,
    in_flight: Arc<AtomicBool>,
    retry: Arc<Notify>,
}

impl ReconciliationLoop {
    pub fn new(feed: FeedConfig, fetcher: Arc<dyn TokenFeedFetcher>) -> Self {
        let store = FeedStore::new(feed.id.clone());
        Self {
            feed,
            fetcher,
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
            retry: Arc::new(Notify::new()),
        }
    }

    pub fn feed(&self) -> &FeedConfig {
        &self.feed
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    /// Ask the running loop for one immediate cycle.
    pub fn request_retry(&self) {
        self.retry.notify_one();
    }

    /// Run a single cycle now, unless one is already in flight.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = InFlightGuard::try_acquire(&self.in_flight) else {
            debug!("Feed {}: fetch already in flight, skipping trigger", self.feed.id);
            self.store.update(|snapshot| snapshot.counters.skipped += 1);
            return CycleOutcome::Skipped;
        };

        self.store.update(|snapshot| snapshot.state = LoopState::Fetching);

        let outcome = self
            .fetcher
            .fetch_feed(&self.feed.path, self.feed.envelope)
            .await;

        match outcome {
            FetchOutcome::Success(raw) => {
                let reconciled = reconcile(raw);
                let report = reconciled.report;
                let tokens = Arc::new(reconciled.tokens);

                self.store.update(|snapshot| {
                    snapshot.tokens = tokens;
                    snapshot.outage = false;
                    snapshot.state = LoopState::SettledOk;
                    snapshot.last_updated = Some(Utc::now());
                    snapshot.last_report = Some(report);
                    snapshot.counters.completed += 1;
                });

                debug!(
                    "Feed {}: published {} of {} records",
                    self.feed.id, report.published, report.received
                );
                CycleOutcome::Published(report)
            }
            FetchOutcome::SoftFailure(reason) => {
                let policy = self.feed.soft_failure_policy;
                self.store.update(|snapshot| {
                    if policy == SoftFailurePolicy::Clear {
                        snapshot.tokens = Arc::new(Vec::new());
                    }
                    snapshot.outage = false;
                    snapshot.state = LoopState::SettledEmpty;
                    snapshot.counters.completed += 1;
                    snapshot.counters.soft_failures += 1;
                });

                debug!("Feed {}: no usable data ({})", self.feed.id, reason);
                CycleOutcome::SoftFailure(reason)
            }
            FetchOutcome::NetworkFailure(reason) => {
                let was_down = self.store.snapshot().outage;
                self.store.update(|snapshot| {
                    snapshot.outage = true;
                    snapshot.state = LoopState::SettledOutage;
                    snapshot.counters.completed += 1;
                    snapshot.counters.network_failures += 1;
                });

                if !was_down {
                    warn!("🚧 Feed {}: backend unreachable: {}", self.feed.id, reason);
                }
                CycleOutcome::Outage(reason)
            }
        }
    }

    /// Drive cycles on the feed's interval and on retry requests until shutdown.
    ///
    /// Every trigger runs as its own task so a slow fetch never delays the
    /// timer; overlapping triggers are absorbed by the in-flight guard.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.feed.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "🔄 Feed {} polling /api/{} every {}ms",
            self.feed.id, self.feed.path, self.feed.poll_interval_ms
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.spawn_cycle(),
                _ = self.retry.notified() => {
                    info!("Feed {}: manual retry", self.feed.id);
                    self.spawn_cycle();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Feed {} loop stopped", self.feed.id);
    }

    fn spawn_cycle(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            this.run_cycle().await;
        });
    }
}
