use feed_client::{CurrencyQuote, TickerClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

pub type QuoteList = Arc<Vec<CurrencyQuote>>;

/// Polls the currency endpoint and publishes the latest quote list.
pub struct TickerPoller {
    client: TickerClient,
    every: Duration,
    quotes: watch::Sender<QuoteList>,
}

impl TickerPoller {
    pub fn new(client: TickerClient, every: Duration) -> (Self, watch::Receiver<QuoteList>) {
        let (quotes, receiver) = watch::channel(Arc::new(Vec::new()));
        (
            Self {
                client,
                every,
                quotes,
            },
            receiver,
        )
    }

    /// Fetch once. Failures keep the previous quotes.
    pub async fn poll_once(&self) -> bool {
        match self.client.fetch_quotes().await {
            Ok(quotes) => {
                debug!("Ticker refreshed with {} quotes", quotes.len());
                self.quotes.send_replace(Arc::new(quotes));
                true
            }
            Err(e) => {
                debug!("Ticker refresh failed: {}", e);
                false
            }
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("💱 Price ticker polling every {}s", self.every.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Price ticker stopped");
    }
}
