//! Registration record lookup over RDAP.
//!
//! The RDAP payload is loosely shaped: dates live in an `events` list and the
//! registrar hides inside a vCard. Everything is normalized into a
//! [`RegistrationRecord`] immediately after the call returns so the rest of
//! the pipeline sees a fixed set of named fields.

use crate::core::{RegistrationLookup, RegistrationRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Deserialize)]
struct RdapResponse {
    #[serde(default)]
    events: Vec<RdapEvent>,
    #[serde(default)]
    entities: Vec<RdapEntity>,
    #[serde(default)]
    nameservers: Vec<RdapNameserver>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
    #[serde(rename = "eventAction")]
    event_action: String,
    #[serde(rename = "eventDate")]
    event_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RdapEntity {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(rename = "vcardArray")]
    vcard_array: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RdapNameserver {
    #[serde(rename = "ldhName")]
    ldh_name: Option<String>,
}

/// RDAP client querying `{base_url}/domain/{name}`.
pub struct RdapLookup {
    client: reqwest::Client,
    base_url: String,
}

impl RdapLookup {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build RDAP HTTP client")?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl RegistrationLookup for RdapLookup {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord> {
        let url = format!("{}/domain/{}", self.base_url, domain);
        trace!(url, "querying RDAP");

        let response: RdapResponse = self
            .client
            .get(&url)
            .send()
            .await
            .context("RDAP request failed")?
            .error_for_status()
            .context("RDAP request returned an error status")?
            .json()
            .await
            .context("malformed RDAP response")?;

        Ok(normalize(response))
    }
}

/// Collapses the list-shaped RDAP payload into fixed named fields. The first
/// event of each action is significant.
fn normalize(response: RdapResponse) -> RegistrationRecord {
    RegistrationRecord {
        creation_date: event_date(&response.events, "registration"),
        expiration_date: event_date(&response.events, "expiration"),
        registrar: registrar_name(&response.entities),
        name_servers: response
            .nameservers
            .into_iter()
            .filter_map(|ns| ns.ldh_name)
            .map(|name| name.to_lowercase())
            .collect(),
    }
}

fn event_date(events: &[RdapEvent], action: &str) -> Option<NaiveDate> {
    events
        .iter()
        .find(|e| e.event_action == action)
        .and_then(|e| e.event_date.as_deref())
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .map(|d| d.date_naive())
}

/// Digs the registrar's display name out of its vCard: the `fn` property of
/// the first entity carrying the `registrar` role.
fn registrar_name(entities: &[RdapEntity]) -> Option<String> {
    let entity = entities
        .iter()
        .find(|e| e.roles.iter().any(|r| r == "registrar"))?;
    let properties = entity.vcard_array.as_ref()?.get(1)?.as_array()?;
    properties.iter().find_map(|prop| {
        let prop = prop.as_array()?;
        if prop.first()?.as_str()? == "fn" {
            prop.get(3)?.as_str().map(str::to_string)
        } else {
            None
        }
    })
}
