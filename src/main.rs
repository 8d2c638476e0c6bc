use anyhow::Result;
use config_manager::SystemConfig;
use feed_orchestrator::{FeedSupervisor, LoopState};
use token_core::SummaryStats;
use tracing::{info, warn};

/// Headless runner: polls every feed and logs the selected one as it changes.
/// The HTTP surface lives in `dashboard_server`.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,feed_orchestrator=debug".into()),
        )
        .init();

    let config = SystemConfig::load()?;
    let selected = config.selected_feed.clone();
    let native_usd_price = config
        .feed(&selected)
        .map(|feed| feed.native_usd_price)
        .unwrap_or(0.0);

    let supervisor = FeedSupervisor::new(config)?;
    let mut updates = supervisor.subscribe(&selected)?;
    supervisor.start().await?;

    info!("Watching feed {} (Ctrl+C to stop)", selected);

    let mut was_down = false;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                match snapshot.state {
                    LoopState::SettledOk => {
                        let stats = SummaryStats::from_tokens(&snapshot.tokens, native_usd_price);
                        info!(
                            "📈 {}: {} tokens, market cap {}, volume {}, {} live",
                            snapshot.feed_id,
                            stats.total_tokens,
                            stats.market_cap_label(),
                            stats.volume_label(),
                            stats.active_tokens
                        );
                    }
                    LoopState::SettledEmpty => {
                        info!("{}: no data this cycle ({} tokens shown)", snapshot.feed_id, snapshot.tokens.len());
                    }
                    LoopState::SettledOutage if !was_down => {
                        warn!("🚧 {}: backend under maintenance, keeping {} tokens", snapshot.feed_id, snapshot.tokens.len());
                    }
                    _ => {}
                }
                was_down = snapshot.outage;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    supervisor.shutdown().await;
    Ok(())
}
