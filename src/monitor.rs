//! The monitoring pipeline: discover, match, enrich, classify, persist.
//!
//! One call to [`Monitor::run_cycle`] drives a full cycle over a single feed
//! snapshot. Candidates are processed by a bounded worker pool; candidates
//! that do not resemble the watch-list never reach enrichment. The pipeline
//! carries no state between cycles.

use crate::classify::classify;
use crate::core::{AlertStore, DomainFeed, NewAlert, ReputationVerdict, RiskStatus, SimilarityMatch};
use crate::deduplication::Deduplicator;
use crate::enrichment::Enricher;
use crate::matching::SimilarityMatcher;
use anyhow::Result;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fixed alert written by the test trigger; exercises the write/read path
/// without any network calls.
pub const TEST_ALERT_DOMAIN: &str = "my-apple-secure-test.com";

/// Outcome counters for one monitoring cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub candidates: usize,
    pub matched: usize,
    pub alerts_written: usize,
    pub suppressed: usize,
}

/// Drives monitoring cycles. Constructed once and shared with the scheduler
/// and the serving surface.
pub struct Monitor {
    feed: Arc<dyn DomainFeed>,
    matcher: SimilarityMatcher,
    enricher: Arc<Enricher>,
    store: Arc<dyn AlertStore>,
    deduplicator: Option<Arc<Deduplicator>>,
    concurrency: usize,
}

impl Monitor {
    pub fn new(
        feed: Arc<dyn DomainFeed>,
        matcher: SimilarityMatcher,
        enricher: Arc<Enricher>,
        store: Arc<dyn AlertStore>,
        deduplicator: Option<Arc<Deduplicator>>,
        concurrency: usize,
    ) -> Self {
        Self {
            feed,
            matcher,
            enricher,
            store,
            deduplicator,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs one full monitoring cycle over a fresh feed snapshot.
    ///
    /// A feed failure degrades to an empty snapshot; a persistence failure
    /// for one alert skips that alert only. Alerts already written stay
    /// written regardless of later failures in the same cycle.
    pub async fn run_cycle(&self) -> Result<CycleSummary> {
        info!("starting monitoring cycle");
        metrics::counter!("monitor_cycles_total").increment(1);

        let candidates = match self.feed.fetch_candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(error = %e, "candidate feed unavailable, proceeding with empty snapshot");
                HashSet::new()
            }
        };

        if candidates.is_empty() {
            info!("no candidates in this cycle");
            return Ok(CycleSummary::default());
        }

        let total = candidates.len();
        let outcomes: Vec<CandidateOutcome> = stream::iter(candidates)
            .map(|domain| self.process_candidate(domain))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let summary = CycleSummary {
            candidates: total,
            matched: outcomes.iter().filter(|o| o.matched).count(),
            alerts_written: outcomes.iter().map(|o| o.alerts_written).sum(),
            suppressed: outcomes.iter().map(|o| o.suppressed).sum(),
        };
        info!(
            candidates = summary.candidates,
            matched = summary.matched,
            alerts = summary.alerts_written,
            suppressed = summary.suppressed,
            "monitoring cycle finished"
        );
        Ok(summary)
    }

    async fn process_candidate(&self, domain: String) -> CandidateOutcome {
        let matches = self.matcher.matches(&domain);
        if matches.is_empty() {
            return CandidateOutcome::default();
        }

        let mut outcome = CandidateOutcome {
            matched: true,
            ..CandidateOutcome::default()
        };

        // Suppression happens before enrichment so already-reported pairs
        // cost no network calls.
        let mut live_matches: Vec<SimilarityMatch> = Vec::with_capacity(matches.len());
        for m in matches {
            warn!(
                domain,
                target = %m.target,
                score = m.score,
                "suspicious domain name found"
            );
            if let Some(dedup) = &self.deduplicator {
                if dedup.is_suppressed(&domain, &m.target) {
                    info!(domain, target = %m.target, "alert suppressed within dedup window");
                    outcome.suppressed += 1;
                    continue;
                }
            }
            live_matches.push(m);
        }
        if live_matches.is_empty() {
            return outcome;
        }

        let enrichment = self.enricher.enrich(&domain).await;
        let status = classify(&enrichment.keywords_found, enrichment.reputation);
        let creation_date = enrichment.creation_date_label();

        for m in live_matches {
            let alert = NewAlert {
                domain: domain.clone(),
                similar_to: m.target,
                similarity_score: m.score,
                creation_date: creation_date.clone(),
                status,
                keywords_found: enrichment.keywords_found.clone(),
                screenshot_path: enrichment.screenshot_path.clone(),
                reputation: enrichment.reputation,
            };
            match self.store.record(&alert).await {
                Ok(_) => {
                    outcome.alerts_written += 1;
                    metrics::counter!("alerts_written_total").increment(1);
                    // The suppression window starts only once the alert is
                    // durably written.
                    if let Some(dedup) = &self.deduplicator {
                        dedup.mark(&alert.domain, &alert.similar_to).await;
                    }
                }
                Err(e) => {
                    // A storage failure for one alert must not abort the
                    // remaining cycle.
                    error!(domain = %alert.domain, target = %alert.similar_to, error = %e,
                        "failed to persist alert");
                }
            }
        }
        outcome
    }

    /// Writes one fixed, fabricated high-risk alert straight through the
    /// store, bypassing discovery and enrichment entirely.
    pub async fn run_test_alert(&self) -> Result<String> {
        info!("simulating a full high-risk alert for testing");
        let alert = NewAlert {
            domain: TEST_ALERT_DOMAIN.to_string(),
            similar_to: "apple.com".to_string(),
            similarity_score: 94,
            creation_date: "2025-06-28".to_string(),
            status: RiskStatus::HighRiskPhishing,
            keywords_found: vec![
                "login".to_string(),
                "apple".to_string(),
                "secure".to_string(),
            ],
            screenshot_path: None,
            reputation: ReputationVerdict::SocialEngineering,
        };
        self.store.record(&alert).await?;
        Ok(format!(
            "Test alert for '{TEST_ALERT_DOMAIN}' has been successfully added."
        ))
    }
}

#[derive(Debug, Default)]
struct CandidateOutcome {
    matched: bool,
    alerts_written: usize,
    suppressed: usize,
}
