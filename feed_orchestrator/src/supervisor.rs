use config_manager::{FeedConfig, SystemConfig};
use feed_client::{BackendClient, TickerClient, TokenFeedFetcher};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::reconciliation::{CycleOutcome, ReconciliationLoop};
use crate::store::FeedSnapshot;
use crate::ticker::{QuoteList, TickerPoller};
use crate::{OrchestratorError, Result};

/// Owns one reconciliation loop per configured feed plus the price ticker.
pub struct FeedSupervisor {
    config: SystemConfig,
    loops: Vec<ReconciliationLoop>,
    ticker: Mutex<Option<TickerPoller>>,
    quotes: watch::Receiver<QuoteList>,
    selected: watch::Sender<String>,
    shutdown: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl FeedSupervisor {
    /// Build loops backed by the HTTP backend client.
    pub fn new(config: SystemConfig) -> Result<Self> {
        let fetcher: Arc<dyn TokenFeedFetcher> = Arc::new(BackendClient::new(config.backend.clone())?);

        let ticker = if config.ticker.enabled {
            let client = TickerClient::new(&config.backend, &config.ticker)?;
            Some(TickerPoller::new(
                client,
                Duration::from_secs(config.ticker.poll_interval_seconds),
            ))
        } else {
            None
        };

        Self::assemble(config, fetcher, ticker)
    }

    /// Build loops around any fetcher. The price ticker stays off.
    pub fn with_fetcher(config: SystemConfig, fetcher: Arc<dyn TokenFeedFetcher>) -> Result<Self> {
        Self::assemble(config, fetcher, None)
    }

    fn assemble(
        config: SystemConfig,
        fetcher: Arc<dyn TokenFeedFetcher>,
        ticker: Option<(TickerPoller, watch::Receiver<QuoteList>)>,
    ) -> Result<Self> {
        config.validate()?;

        let loops = config
            .feeds
            .iter()
            .map(|feed| ReconciliationLoop::new(feed.clone(), fetcher.clone()))
            .collect();

        let (ticker, quotes) = match ticker {
            Some((poller, quotes)) => (Some(poller), quotes),
            None => (None, watch::channel(Arc::new(Vec::new())).1),
        };

        let (selected, _) = watch::channel(config.selected_feed.clone());
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            config,
            loops,
            ticker: Mutex::new(ticker),
            quotes,
            selected,
            shutdown,
            handles: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        })
    }

    /// Spawn every feed loop and the ticker. All feeds poll regardless of selection.
    pub async fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(OrchestratorError::AlreadyStarted);
        }

        let mut handles = self.handles.lock().await;
        for feed_loop in &self.loops {
            let runner = feed_loop.clone();
            handles.push(tokio::spawn(runner.run(self.shutdown.subscribe())));
        }

        if let Some(poller) = self.ticker.lock().await.take() {
            handles.push(tokio::spawn(poller.run(self.shutdown.subscribe())));
        }

        info!(
            "🚀 Feed supervisor started {} feeds (selected: {})",
            self.loops.len(),
            self.selected_feed()
        );
        Ok(())
    }

    /// Stop every loop and wait for the runners to exit.
    ///
    /// A fetch already in flight is left to finish; its publication is harmless.
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);

        let handles: Vec<JoinHandle<()>> = self.handles.lock().await.drain(..).collect();
        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!("Feed runner ended abnormally: {}", e);
            }
        }

        info!("Feed supervisor stopped");
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn feed_ids(&self) -> Vec<String> {
        self.loops.iter().map(|l| l.feed().id.clone()).collect()
    }

    pub fn feed_config(&self, feed_id: &str) -> Result<&FeedConfig> {
        self.find(feed_id).map(ReconciliationLoop::feed)
    }

    pub fn snapshot(&self, feed_id: &str) -> Result<FeedSnapshot> {
        Ok(self.find(feed_id)?.store().snapshot())
    }

    pub fn subscribe(&self, feed_id: &str) -> Result<watch::Receiver<FeedSnapshot>> {
        Ok(self.find(feed_id)?.store().subscribe())
    }

    /// Request one immediate cycle from a running loop.
    pub fn retry(&self, feed_id: &str) -> Result<()> {
        self.find(feed_id)?.request_retry();
        Ok(())
    }

    /// Run one cycle inline and return its outcome. Subject to the in-flight guard.
    pub async fn refresh(&self, feed_id: &str) -> Result<CycleOutcome> {
        Ok(self.find(feed_id)?.run_cycle().await)
    }

    pub fn selected_feed(&self) -> String {
        self.selected.borrow().clone()
    }

    pub fn select_feed(&self, feed_id: &str) -> Result<()> {
        self.find(feed_id)?;
        self.selected.send_replace(feed_id.to_string());
        info!("Selected feed: {}", feed_id);
        Ok(())
    }

    /// Latest currency quotes; empty until the ticker's first success.
    pub fn quotes(&self) -> QuoteList {
        self.quotes.borrow().clone()
    }

    fn find(&self, feed_id: &str) -> Result<&ReconciliationLoop> {
        self.loops
            .iter()
            .find(|l| l.feed().id == feed_id)
            .ok_or_else(|| OrchestratorError::UnknownFeed(feed_id.to_string()))
    }
}
