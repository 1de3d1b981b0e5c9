//! Command-Line Interface (CLI) argument parsing.
//!
//! Arguments are parsed with `clap` at startup and merged over the settings
//! from `phishwatch.toml` and the environment via a `figment` provider.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// A brand-impersonation domain monitor for certificate-transparency logs.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Similarity score (0-100) required to flag a candidate.
    #[arg(long, value_name = "SCORE")]
    pub threshold: Option<u8>,

    /// Minutes between monitoring cycles.
    #[arg(long, value_name = "MINUTES")]
    pub interval_minutes: Option<u64>,

    /// SQLite database URL for the alert store.
    #[arg(long, value_name = "URL")]
    pub database_url: Option<String>,

    /// Address the HTTP server binds to.
    #[arg(long, value_name = "ADDR")]
    pub listen_addr: Option<String>,

    /// Suppress duplicate (domain, target) alerts within a rolling window
    /// of this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub dedup_window: Option<u64>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(threshold) = self.threshold {
            dict.insert("matching.threshold".into(), Value::from(threshold));
        }

        if let Some(minutes) = self.interval_minutes {
            dict.insert("scheduler.interval_minutes".into(), Value::from(minutes));
        }

        if let Some(url) = &self.database_url {
            dict.insert("store.database_url".into(), Value::from(url.clone()));
        }

        if let Some(addr) = &self.listen_addr {
            dict.insert("server.listen_addr".into(), Value::from(addr.clone()));
        }

        if let Some(window) = self.dedup_window {
            dict.insert("deduplication.enabled".into(), Value::from(true));
            dict.insert("deduplication.window_seconds".into(), Value::from(window));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
