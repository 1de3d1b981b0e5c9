//! Cross-cycle duplicate-alert suppression.
//!
//! The pipeline itself is stateless between cycles, so repeated cycles would
//! re-alert on the same (domain, target) pair indefinitely. Suppression is an
//! explicit configuration choice: when enabled, a pair already alerted within
//! the rolling window is skipped before enrichment.
//!
//! Checking and recording are separate steps: a pair enters the window only
//! once its alert is actually persisted, so a failed write never suppresses
//! future attempts.

use moka::future::Cache;
use std::time::Duration;

/// Time-aware filter over (domain, target) pairs.
pub struct Deduplicator {
    cache: Cache<String, ()>,
}

impl Deduplicator {
    /// # Arguments
    /// * `window` - How long a pair stays suppressed after an alert.
    /// * `max_capacity` - The maximum number of tracked pairs.
    pub fn new(window: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(window)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    /// Returns `true` if this (domain, target) pair was recorded within the
    /// window. Does not record anything.
    pub fn is_suppressed(&self, domain: &str, target: &str) -> bool {
        self.cache.contains_key(&Self::generate_key(domain, target))
    }

    /// Starts the suppression window for a pair. Called once the pair's
    /// alert has been persisted.
    pub async fn mark(&self, domain: &str, target: &str) {
        self.cache
            .insert(Self::generate_key(domain, target), ())
            .await;
        metrics::gauge!("deduplication_cache_entries").set(self.cache.entry_count() as f64);
    }

    fn generate_key(domain: &str, target: &str) -> String {
        let data = format!("{domain}::{target}");
        blake3::hash(data.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_pair_is_not_suppressed() {
        let deduplicator = Deduplicator::new(Duration::from_secs(10), 100);
        assert!(!deduplicator.is_suppressed("evil.com", "paypal.com"));
    }

    #[tokio::test]
    async fn marked_pair_is_suppressed() {
        let deduplicator = Deduplicator::new(Duration::from_secs(10), 100);
        deduplicator.mark("evil.com", "paypal.com").await;
        assert!(deduplicator.is_suppressed("evil.com", "paypal.com"));
    }

    #[tokio::test]
    async fn checking_does_not_record_the_pair() {
        let deduplicator = Deduplicator::new(Duration::from_secs(10), 100);
        assert!(!deduplicator.is_suppressed("evil.com", "paypal.com"));
        assert!(!deduplicator.is_suppressed("evil.com", "paypal.com"));
    }

    #[tokio::test]
    async fn different_target_is_not_suppressed() {
        let deduplicator = Deduplicator::new(Duration::from_secs(10), 100);
        deduplicator.mark("evil.com", "paypal.com").await;
        assert!(!deduplicator.is_suppressed("evil.com", "apple.com"));
    }

    #[tokio::test]
    async fn different_domain_is_not_suppressed() {
        let deduplicator = Deduplicator::new(Duration::from_secs(10), 100);
        deduplicator.mark("evil.com", "paypal.com").await;
        assert!(!deduplicator.is_suppressed("evil2.com", "paypal.com"));
    }
}
