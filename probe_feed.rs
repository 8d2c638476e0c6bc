use anyhow::{anyhow, Result};
use chrono::Utc;
use config_manager::SystemConfig;
use feed_client::{BackendClient, FetchOutcome, TokenFeedFetcher};
use token_core::{format_token_age, reconcile, SummaryStats};

/// One-shot fetch of a feed through the full reconciliation pipeline.
///
/// Usage: `probe_feed [feed_id]` (defaults to the selected feed)
#[tokio::main]
async fn main() -> Result<()> {
    let config = SystemConfig::load()?;
    let feed_id = std::env::args().nth(1).unwrap_or_else(|| config.selected_feed.clone());
    let feed = config
        .feed(&feed_id)
        .ok_or_else(|| anyhow!("unknown feed '{}'", feed_id))?
        .clone();

    let client = BackendClient::new(config.backend.clone())?;

    println!("🔍 Probing feed {}", feed.id);
    println!("{}", "=".repeat(50));
    println!("📡 Endpoint: {}", client.endpoint(&feed.path));
    println!("📦 Envelope: {:?}, timeout {}s", feed.envelope, client.timeout().as_secs());
    println!();

    let raw = match client.fetch_feed(&feed.path, feed.envelope).await {
        FetchOutcome::Success(raw) => {
            println!("✅ Received {} records", raw.len());
            raw
        }
        FetchOutcome::SoftFailure(reason) => {
            println!("⚠️  Backend answered without usable data: {}", reason);
            return Ok(());
        }
        FetchOutcome::NetworkFailure(reason) => {
            println!("❌ Backend unreachable (maintenance): {}", reason);
            return Ok(());
        }
    };

    let reconciled = reconcile(raw);
    let report = reconciled.report;
    println!("🧹 Reconciliation:");
    println!("   • Clamped sniper holdings: {}", report.clamped);
    println!("   • Missing ticker: {}", report.empty_ticker);
    println!("   • Duplicates collapsed: {}", report.duplicates_collapsed);
    println!("   • Dev holdings filtered: {}", report.dev_filtered);
    println!("   • Published: {}", report.published);
    println!();

    let stats = SummaryStats::from_tokens(&reconciled.tokens, feed.native_usd_price);
    println!(
        "📊 Market cap {} | Volume {} | {} live of {}",
        stats.market_cap_label(),
        stats.volume_label(),
        stats.active_tokens,
        stats.total_tokens
    );
    println!();

    let now = Utc::now();
    for (i, token) in reconciled.tokens.iter().take(10).enumerate() {
        let age = format_token_age(token, now).unwrap_or_else(|| "-".to_string());

        println!(
            "{:>2}. {:<12} cap {:>10.2} vol {:>10.2} age {}",
            i + 1,
            token.token_ticker.as_deref().unwrap_or_default(),
            token.market_cap_sol.unwrap_or(0.0),
            token.volume_sol.unwrap_or(0.0),
            age
        );
    }

    Ok(())
}
