//! Enrichment of matched candidates.
//!
//! Four independently failing lookups per candidate: registration record,
//! live page fetch plus keyword scan, rendered screenshot, and a reputation
//! check. Each degrades to a sentinel on failure so that one missing signal
//! never blocks the others.

pub mod content;
pub mod registration;
pub mod reputation;
pub mod screenshot;

pub use content::HttpPageFetcher;
pub use registration::RdapLookup;
pub use reputation::WebRiskClient;
pub use screenshot::ChromiumCapturer;

use crate::core::{
    Enrichment, PageFetcher, RegistrationLookup, RegistrationRecord, ReputationChecker,
    ScreenshotCapturer,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs all enrichment lookups for one candidate behind a single join point.
pub struct Enricher {
    registration: Arc<dyn RegistrationLookup>,
    fetcher: Arc<dyn PageFetcher>,
    capturer: Arc<dyn ScreenshotCapturer>,
    reputation: Arc<dyn ReputationChecker>,
    keywords: Vec<String>,
}

impl Enricher {
    pub fn new(
        registration: Arc<dyn RegistrationLookup>,
        fetcher: Arc<dyn PageFetcher>,
        capturer: Arc<dyn ScreenshotCapturer>,
        reputation: Arc<dyn ReputationChecker>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            registration,
            fetcher,
            capturer,
            reputation,
            keywords,
        }
    }

    /// Produces the enrichment bundle for one candidate.
    ///
    /// Registration, reputation, and the page pipeline run concurrently; the
    /// bundle resolves once every lookup has either produced a value or
    /// degraded to its sentinel.
    pub async fn enrich(&self, domain: &str) -> Enrichment {
        let url = format!("http://{domain}");
        let start = Instant::now();

        let (registration, reputation, (keywords_found, screenshot_path)) = tokio::join!(
            self.registration_record(domain),
            self.reputation.check(&url),
            self.page_signals(domain, &url),
        );

        metrics::histogram!("enrichment_duration_seconds").record(start.elapsed().as_secs_f64());
        debug!(domain, ?reputation, "enrichment complete");

        Enrichment {
            registration,
            keywords_found,
            screenshot_path,
            reputation,
        }
    }

    async fn registration_record(&self, domain: &str) -> Option<RegistrationRecord> {
        match self.registration.lookup(domain).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(domain, error = %e, "registration lookup failed");
                None
            }
        }
    }

    /// Fetches the live page, then scans for keywords and captures a
    /// screenshot. An unreachable page skips both downstream steps: there is
    /// nothing to scan or render.
    async fn page_signals(&self, domain: &str, url: &str) -> (Vec<String>, Option<String>) {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(domain, error = %e, "page fetch failed, skipping content analysis");
                return (Vec::new(), None);
            }
        };

        let keywords_found = content::find_keywords(&html, &self.keywords);
        if !keywords_found.is_empty() {
            warn!(domain, keywords = ?keywords_found, "phishing keywords found in page text");
        }

        let screenshot_path = match self.capturer.capture(url, domain).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(domain, error = %e, "screenshot capture failed");
                None
            }
        };

        (keywords_found, screenshot_path)
    }
}
