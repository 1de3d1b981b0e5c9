//! Reputation check against a Web Risk-style threat-intelligence API.

use crate::core::{ReputationChecker, ReputationVerdict};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

/// Threat categories requested from the API.
const THREAT_TYPES: [&str; 3] = ["MALWARE", "SOCIAL_ENGINEERING", "UNWANTED_SOFTWARE"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    threat: Option<Threat>,
}

#[derive(Debug, Deserialize)]
struct Threat {
    #[serde(rename = "threatTypes", default)]
    threat_types: Vec<String>,
}

/// Client for a `uris:search` endpoint authenticated by API key.
pub struct WebRiskClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl WebRiskClient {
    pub fn new(url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reputation HTTP client")?;
        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    async fn search(&self, url_to_check: &str) -> Result<ReputationVerdict> {
        let response: SearchResponse = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "uri": url_to_check,
                "threatTypes": THREAT_TYPES,
            }))
            .send()
            .await
            .context("reputation request failed")?
            .error_for_status()
            .context("reputation request returned an error status")?
            .json()
            .await
            .context("malformed reputation response")?;

        // An absent threat object means the URI is considered clean. A
        // present one carries the matched categories, first significant.
        let verdict = match response.threat.and_then(|t| t.threat_types.into_iter().next()) {
            Some(threat_type) => ReputationVerdict::from_threat_type(&threat_type),
            None => ReputationVerdict::Clean,
        };
        Ok(verdict)
    }
}

#[async_trait]
impl ReputationChecker for WebRiskClient {
    async fn check(&self, url: &str) -> ReputationVerdict {
        match self.search(url).await {
            Ok(verdict) => {
                if verdict.is_threat() {
                    warn!(url, %verdict, "reputation API reported a threat");
                }
                verdict
            }
            Err(e) => {
                warn!(url, error = %e, "reputation check failed");
                ReputationVerdict::CheckError
            }
        }
    }
}
