//! Candidate discovery from a certificate-transparency aggregator.
//!
//! One bounded request per cycle retrieves recently logged certificates under
//! a broad query; common names are normalized to lower-cased root registrable
//! form and deduplicated. No retries: a failed snapshot means an empty cycle.

use crate::config::FeedConfig;
use crate::core::DomainFeed;
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// One certificate record as returned by the aggregator. Only the common
/// name is significant.
#[derive(Debug, Deserialize)]
struct CertRecord {
    common_name: Option<String>,
}

/// HTTP client for a crt.sh-style JSON endpoint.
pub struct CrtShFeed {
    client: reqwest::Client,
    url: String,
    query: String,
    root_pattern: Regex,
}

impl CrtShFeed {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build feed HTTP client")?;

        // Rightmost two dot-separated labels of a common name.
        let root_pattern = Regex::new(r"[^.]+\.[^.]+$")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            query: config.query.clone(),
            root_pattern,
        })
    }
}

#[async_trait]
impl DomainFeed for CrtShFeed {
    async fn fetch_candidates(&self) -> Result<HashSet<String>> {
        debug!(url = %self.url, query = %self.query, "fetching certificate snapshot");

        let records: Vec<CertRecord> = self
            .client
            .get(&self.url)
            .query(&[("q", self.query.as_str()), ("output", "json")])
            .send()
            .await
            .context("certificate-transparency request failed")?
            .error_for_status()
            .context("certificate-transparency request returned an error status")?
            .json()
            .await
            .context("malformed certificate-transparency response")?;

        let domains = extract_root_domains(
            records.iter().filter_map(|r| r.common_name.as_deref()),
            &self.root_pattern,
        );

        info!(count = domains.len(), "unique candidate domains in snapshot");
        metrics::counter!("feed_snapshots_total").increment(1);
        Ok(domains)
    }
}

/// Normalizes raw common names into a deduplicated set of root domains.
///
/// Wildcard entries are dropped; everything else is reduced to its rightmost
/// two labels and lower-cased.
pub fn extract_root_domains<'a>(
    names: impl Iterator<Item = &'a str>,
    root_pattern: &Regex,
) -> HashSet<String> {
    names
        .filter(|name| !name.starts_with("*."))
        .filter_map(|name| root_pattern.find(name))
        .map(|m| m.as_str().to_lowercase())
        .collect()
}
