//! Configuration management for phishwatch.
//!
//! The main `Config` struct and its sub-structs hold all application
//! settings, loaded with `figment` by layering defaults, a `phishwatch.toml`
//! file, `PHISHWATCH_`-prefixed environment variables, and CLI arguments.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Certificate-transparency feed settings.
    pub feed: FeedConfig,
    /// Watch-list similarity matching settings.
    pub matching: MatchingConfig,
    /// Enrichment lookup settings.
    pub enrichment: EnrichmentConfig,
    /// Alert persistence settings.
    pub store: StoreConfig,
    /// Monitoring cycle scheduling.
    pub scheduler: SchedulerConfig,
    /// Cross-cycle duplicate-alert suppression.
    pub deduplication: DeduplicationConfig,
    /// Worker pool sizing.
    pub performance: PerformanceConfig,
    /// HTTP serving surface.
    pub server: ServerConfig,
}

/// Certificate-transparency aggregator settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeedConfig {
    /// Base URL of the crt.sh-style JSON endpoint.
    pub url: String,
    /// The broad certificate query, e.g. `%.com`.
    pub query: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Similarity matching settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MatchingConfig {
    /// Protected organisation domains, in priority order.
    pub watch_list: Vec<String>,
    /// Similarity score (0-100) required to flag a candidate.
    pub threshold: u8,
}

/// Enrichment lookup settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnrichmentConfig {
    /// Base URL of the RDAP service.
    pub rdap_url: String,
    /// Timeout for registration, page-fetch, and reputation requests.
    pub http_timeout_secs: u64,
    /// Directory screenshots are written to, keyed by domain.
    pub screenshot_dir: PathBuf,
    /// Upper bound on one headless render.
    pub screenshot_timeout_secs: u64,
    /// Lower-case phishing-indicator keywords scanned for in page text.
    pub phishing_keywords: Vec<String>,
    /// URL of the Web Risk-style `uris:search` endpoint.
    pub webrisk_url: String,
    /// API key for the reputation service.
    pub webrisk_api_key: String,
}

/// Alert persistence settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    /// SQLite database URL, e.g. `sqlite://alerts.db`.
    pub database_url: String,
}

/// Monitoring cycle scheduling.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulerConfig {
    /// Minutes between monitoring cycles. Cycles never overlap: the next
    /// tick waits for the previous cycle to finish.
    pub interval_minutes: u64,
}

/// Cross-cycle duplicate-alert suppression. Disabled by default: repeated
/// cycles re-alert on the same (domain, target) pair, capturing status
/// changes over time.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeduplicationConfig {
    pub enabled: bool,
    /// Rolling suppression window in seconds.
    pub window_seconds: u64,
    /// The maximum number of tracked (domain, target) pairs.
    pub cache_size: usize,
}

/// Worker pool sizing.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    /// Candidates enriched concurrently within one cycle.
    pub concurrency: usize,
}

/// HTTP serving surface.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
}

impl Config {
    /// Loads the configuration by layering sources: defaults, TOML file,
    /// environment, and CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from("phishwatch.toml"));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Allow overriding with environment variables, e.g.
            // PHISHWATCH_LOG_LEVEL=debug
            .merge(Env::prefixed("PHISHWATCH_").split("__"))
            .merge(cli)
            .extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            feed: FeedConfig {
                url: "https://crt.sh/".to_string(),
                query: "%.com".to_string(),
                timeout_secs: 30,
            },
            matching: MatchingConfig {
                watch_list: vec![],
                threshold: crate::matching::DEFAULT_THRESHOLD,
            },
            enrichment: EnrichmentConfig {
                rdap_url: "https://rdap.org".to_string(),
                http_timeout_secs: 10,
                screenshot_dir: PathBuf::from("screenshots"),
                screenshot_timeout_secs: 20,
                phishing_keywords: vec![],
                webrisk_url: "https://webrisk.googleapis.com/v1/uris:search".to_string(),
                webrisk_api_key: String::new(),
            },
            store: StoreConfig {
                database_url: "sqlite://alerts.db".to_string(),
            },
            scheduler: SchedulerConfig {
                interval_minutes: 10,
            },
            deduplication: DeduplicationConfig {
                enabled: false,
                window_seconds: 24 * 60 * 60,
                cache_size: 100_000,
            },
            performance: PerformanceConfig { concurrency: 4 },
            server: ServerConfig {
                listen_addr: "127.0.0.1:8080".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.matching.threshold, 85);
        assert!(!config.deduplication.enabled);
        assert!(config.performance.concurrency >= 1);
    }
}
