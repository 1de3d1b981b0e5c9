//! Core domain types and service traits for phishwatch.
//!
//! This module defines the fundamental data structures and trait contracts
//! that govern component interactions throughout the application.

use crate::store::StoreError;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Risk status attached to a persisted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskStatus {
    #[serde(rename = "Suspicious")]
    Suspicious,
    #[serde(rename = "High-Risk Phishing")]
    HighRiskPhishing,
}

impl RiskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::Suspicious => "Suspicious",
            RiskStatus::HighRiskPhishing => "High-Risk Phishing",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Suspicious" => Ok(RiskStatus::Suspicious),
            "High-Risk Phishing" => Ok(RiskStatus::HighRiskPhishing),
            other => Err(anyhow::anyhow!("unknown risk status: {other}")),
        }
    }
}

/// Categorical answer from the reputation API for a URL.
///
/// `CheckError` marks a failed lookup and must never be treated as a threat
/// signal by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationVerdict {
    #[serde(rename = "CLEAN")]
    Clean,
    #[serde(rename = "MALWARE")]
    Malware,
    #[serde(rename = "SOCIAL_ENGINEERING")]
    SocialEngineering,
    #[serde(rename = "UNWANTED_SOFTWARE")]
    UnwantedSoftware,
    /// A threat category outside the requested set.
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "CHECK_ERROR")]
    CheckError,
}

impl ReputationVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReputationVerdict::Clean => "CLEAN",
            ReputationVerdict::Malware => "MALWARE",
            ReputationVerdict::SocialEngineering => "SOCIAL_ENGINEERING",
            ReputationVerdict::UnwantedSoftware => "UNWANTED_SOFTWARE",
            ReputationVerdict::Unknown => "UNKNOWN",
            ReputationVerdict::CheckError => "CHECK_ERROR",
        }
    }

    /// Maps a `threatTypes` entry from the reputation API to a verdict.
    pub fn from_threat_type(threat_type: &str) -> Self {
        match threat_type {
            "MALWARE" => ReputationVerdict::Malware,
            "SOCIAL_ENGINEERING" => ReputationVerdict::SocialEngineering,
            "UNWANTED_SOFTWARE" => ReputationVerdict::UnwantedSoftware,
            _ => ReputationVerdict::Unknown,
        }
    }

    /// True for any verdict that should escalate classification.
    pub fn is_threat(&self) -> bool {
        !matches!(
            self,
            ReputationVerdict::Clean | ReputationVerdict::CheckError
        )
    }
}

impl fmt::Display for ReputationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReputationVerdict {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CLEAN" => Ok(ReputationVerdict::Clean),
            "MALWARE" => Ok(ReputationVerdict::Malware),
            "SOCIAL_ENGINEERING" => Ok(ReputationVerdict::SocialEngineering),
            "UNWANTED_SOFTWARE" => Ok(ReputationVerdict::UnwantedSoftware),
            "UNKNOWN" => Ok(ReputationVerdict::Unknown),
            "CHECK_ERROR" => Ok(ReputationVerdict::CheckError),
            other => Err(anyhow::anyhow!("unknown reputation verdict: {other}")),
        }
    }
}

/// One watch-list hit for a candidate domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityMatch {
    /// The watch-list entry the candidate resembles.
    pub target: String,
    /// Similarity strength, 0-100.
    pub score: u8,
}

/// Structured registration record, normalized at the lookup boundary.
///
/// The upstream RDAP payload is loosely shaped (events and entities come as
/// lists); this struct pins down the fields the rest of the pipeline uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationRecord {
    pub creation_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub registrar: Option<String>,
    pub name_servers: Vec<String>,
}

/// Per-candidate enrichment bundle. Each field degrades independently to its
/// sentinel when the backing lookup fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// Registration record, absent when the lookup failed.
    pub registration: Option<RegistrationRecord>,
    /// Phishing-indicator keywords found in the live page text.
    pub keywords_found: Vec<String>,
    /// Path to the captured screenshot, absent on capture failure.
    pub screenshot_path: Option<String>,
    /// Reputation verdict for the live URL.
    pub reputation: ReputationVerdict,
}

impl Enrichment {
    /// Creation date in `YYYY-MM-DD` form, or the `N/A` sentinel.
    pub fn creation_date_label(&self) -> String {
        self.registration
            .as_ref()
            .and_then(|r| r.creation_date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// An alert as accepted by the store, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub domain: String,
    pub similar_to: String,
    pub similarity_score: u8,
    pub creation_date: String,
    pub status: RiskStatus,
    pub keywords_found: Vec<String>,
    pub screenshot_path: Option<String>,
    pub reputation: ReputationVerdict,
}

/// A persisted alert. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Server-assigned, monotonically increasing identifier.
    pub id: i64,
    /// UTC timestamp assigned at write time.
    pub created_at: DateTime<Utc>,
    /// The suspicious domain name.
    pub domain: String,
    /// The watch-list organisation it resembles.
    pub similar_to: String,
    /// Similarity strength, 0-100.
    pub similarity_score: u8,
    /// Registration date in `YYYY-MM-DD` form, or `N/A`.
    pub creation_date: String,
    pub status: RiskStatus,
    pub keywords_found: Vec<String>,
    pub screenshot_path: Option<String>,
    pub reputation: ReputationVerdict,
}

// =============================================================================
// Service Traits
// =============================================================================

/// Retrieves a snapshot of newly observed domain names.
#[async_trait]
pub trait DomainFeed: Send + Sync {
    /// Fetches the current candidate set. Names are normalized to lower-cased
    /// root registrable form and deduplicated within the snapshot.
    async fn fetch_candidates(&self) -> Result<HashSet<String>>;
}

/// Looks up the registration record for a domain.
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord>;
}

/// Fetches the raw HTML of a live page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the response body, or an error on transport failure or a
    /// non-success status.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Renders a live page and writes a raster image keyed by domain name.
#[async_trait]
pub trait ScreenshotCapturer: Send + Sync {
    /// Returns the path of the written image. The rendering resource is
    /// acquired and released within a single call, never held across
    /// candidates.
    async fn capture(&self, url: &str, domain: &str) -> Result<String>;
}

/// Checks a URL against an external threat-intelligence API.
#[async_trait]
pub trait ReputationChecker: Send + Sync {
    /// Never fails: transport and protocol errors resolve to
    /// [`ReputationVerdict::CheckError`].
    async fn check(&self, url: &str) -> ReputationVerdict;
}

/// Append-only durable log of emitted alerts.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Persists one alert, assigning its identifier and timestamp.
    async fn record(&self, alert: &NewAlert) -> Result<Alert, StoreError>;

    /// Returns every persisted alert, most recent first.
    async fn list_all(&self) -> Result<Vec<Alert>, StoreError>;
}
