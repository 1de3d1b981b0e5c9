//! The main application logic, decoupled from the entry point.
//!
//! `App::build` wires every component from the configuration; `App::run`
//! owns the scheduler loop and the HTTP server until the shutdown signal.

use crate::{
    config::Config,
    core::{AlertStore, DomainFeed, PageFetcher, RegistrationLookup, ScreenshotCapturer},
    deduplication::Deduplicator,
    dns::RecordLookup,
    enrichment::{ChromiumCapturer, Enricher, HttpPageFetcher, RdapLookup, WebRiskClient},
    feed::CrtShFeed,
    matching::SimilarityMatcher,
    monitor::Monitor,
    report::Analyzer,
    server::{self, ServerState},
    store::SqliteAlertStore,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

/// A constructed, runnable application.
pub struct App {
    config: Config,
    monitor: Arc<Monitor>,
    state: Arc<ServerState>,
}

impl App {
    /// Builds and wires all application components.
    pub async fn build(config: Config) -> Result<App> {
        let store: Arc<dyn AlertStore> =
            Arc::new(SqliteAlertStore::connect(&config.store.database_url).await?);

        let http_timeout = Duration::from_secs(config.enrichment.http_timeout_secs);
        let registration: Arc<dyn RegistrationLookup> = Arc::new(RdapLookup::new(
            config.enrichment.rdap_url.clone(),
            http_timeout,
        )?);
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(http_timeout)?);
        let capturer: Arc<dyn ScreenshotCapturer> = Arc::new(ChromiumCapturer::new(
            config.enrichment.screenshot_dir.clone(),
            Duration::from_secs(config.enrichment.screenshot_timeout_secs),
        ));
        let reputation = Arc::new(WebRiskClient::new(
            config.enrichment.webrisk_url.clone(),
            config.enrichment.webrisk_api_key.clone(),
            http_timeout,
        )?);

        let enricher = Arc::new(Enricher::new(
            registration.clone(),
            fetcher.clone(),
            capturer.clone(),
            reputation,
            config.enrichment.phishing_keywords.clone(),
        ));

        let matcher = SimilarityMatcher::new(
            config.matching.watch_list.clone(),
            config.matching.threshold,
        );

        let feed: Arc<dyn DomainFeed> = Arc::new(CrtShFeed::new(&config.feed)?);

        let deduplicator = config.deduplication.enabled.then(|| {
            Arc::new(Deduplicator::new(
                Duration::from_secs(config.deduplication.window_seconds),
                config.deduplication.cache_size as u64,
            ))
        });

        let monitor = Arc::new(Monitor::new(
            feed,
            matcher.clone(),
            enricher,
            store.clone(),
            deduplicator,
            config.performance.concurrency,
        ));

        let analyzer = Arc::new(Analyzer::new(
            registration,
            RecordLookup::from_system()?,
            matcher,
            fetcher,
            capturer,
        ));

        let state = Arc::new(ServerState {
            store,
            monitor: monitor.clone(),
            analyzer,
            screenshot_dir: config.enrichment.screenshot_dir.clone(),
        });

        Ok(App {
            config,
            monitor,
            state,
        })
    }

    /// Runs the scheduler loop and the HTTP server until the shutdown
    /// signal fires, then waits for both to finish.
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        let scheduler = tokio::spawn(run_scheduler(
            self.monitor.clone(),
            self.config.scheduler.interval_minutes,
            shutdown_rx.clone(),
        ));

        let listener = TcpListener::bind(&self.config.server.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.config.server.listen_addr))?;
        info!(addr = %self.config.server.listen_addr, "HTTP server listening");

        let mut server_shutdown_rx = shutdown_rx.clone();
        axum::serve(listener, server::router(self.state))
            .with_graceful_shutdown(async move {
                server_shutdown_rx.changed().await.ok();
            })
            .await
            .context("HTTP server failed")?;

        if let Err(e) = scheduler.await {
            error!("scheduler task panicked: {e:?}");
        }

        info!("all tasks shut down");
        Ok(())
    }
}

/// Drives one monitoring cycle per interval tick. Ticks are delayed rather
/// than bursted when a cycle overruns, so cycles never overlap.
async fn run_scheduler(
    monitor: Arc<Monitor>,
    interval_minutes: u64,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let period = Duration::from_secs(interval_minutes * 60);
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(interval_minutes, "scheduler started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => {
                info!("scheduler received shutdown signal");
                break;
            }
            _ = interval.tick() => {
                if let Err(e) = monitor.run_cycle().await {
                    error!(error = %e, "monitoring cycle failed");
                }
            }
        }
    }
    info!("scheduler finished");
}
