use config_manager::SystemConfig;
use dashboard_server::{create_router, AppState};
use feed_orchestrator::FeedSupervisor;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,dashboard_server=debug,feed_orchestrator=debug".into()),
        )
        .init();

    info!("Starting Token Dashboard Server...");

    // Load configuration
    let config = SystemConfig::load()?;
    info!(
        "Configuration loaded: backend {}, {} feeds",
        config.backend.base_url,
        config.feeds.len()
    );

    // Every feed polls from startup so switching feeds shows warm data
    let supervisor = Arc::new(FeedSupervisor::new(config.clone())?);
    supervisor.start().await?;

    let app_state = AppState::new(config.clone(), supervisor.clone())?;
    let app = create_router(app_state);

    info!("🎯 Dashboard server ready");
    info!("📋 Available endpoints:");
    info!("   • GET /api/dashboard?pages=N - Selected feed, summary and ticker");
    info!("   • GET /api/feeds - Feed status list");
    info!("   • GET /api/feeds/:feed_id?pages=N - One feed's token window");
    info!("   • GET /api/feeds/:feed_id/summary - Feed totals");
    info!("   • POST /api/feeds/:feed_id/retry - Trigger an immediate refresh");
    info!("   • PUT /api/selected-feed - Switch the selected feed");
    info!("   • GET /api/ticker - Currency quotes");
    info!("   • POST /api/chat - Assistant relay");
    info!("   • GET /health - Health check");

    // Bind and serve
    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    supervisor.shutdown().await;

    Ok(())
}
