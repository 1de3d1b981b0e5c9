//! Phishwatch - brand-impersonation domain monitor.
//!
//! Discovers newly observed domains from certificate-transparency logs and
//! alerts on names lexically close to a configured watch-list.

use anyhow::Result;
use clap::Parser;
use phishwatch::{app::App, cli::Cli, config::Config};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli).unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!("phishwatch starting up");
    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Feed URL: {} (query: {})", config.feed.url, config.feed.query);
    info!("Watch-list entries: {}", config.matching.watch_list.len());
    info!("Similarity Threshold: {}", config.matching.threshold);
    info!(
        "Phishing Keywords: {}",
        config.enrichment.phishing_keywords.len()
    );
    info!("RDAP URL: {}", config.enrichment.rdap_url);
    info!(
        "Screenshot Directory: {}",
        config.enrichment.screenshot_dir.display()
    );
    info!("Database URL: {}", config.store.database_url);
    info!("Cycle Interval: {}min", config.scheduler.interval_minutes);
    info!("Concurrency: {}", config.performance.concurrency);
    info!(
        "Duplicate Suppression: {}",
        if config.deduplication.enabled {
            format!("enabled ({}s window)", config.deduplication.window_seconds)
        } else {
            "disabled".to_string()
        }
    );
    info!("Listen Address: {}", config.server.listen_addr);
    info!("-------------------------------------------------------");

    if config.matching.watch_list.is_empty() {
        error!("no watch-list entries configured, nothing will ever match");
    }
    if config.enrichment.webrisk_api_key.is_empty() {
        info!("no reputation API key configured, reputation checks will degrade to CHECK_ERROR");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received, shutting down gracefully");
            let _ = shutdown_tx.send(true);
        }
    });

    let app = App::build(config).await?;
    app.run(shutdown_rx).await
}
