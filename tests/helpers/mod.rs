#![allow(dead_code)]

//! Shared fakes for integration tests. Each fake implements one service
//! trait with canned behavior so pipelines can run without any network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use phishwatch::core::{
    AlertStore, DomainFeed, NewAlert, PageFetcher, RegistrationLookup, RegistrationRecord,
    ReputationChecker, ReputationVerdict, ScreenshotCapturer,
};
use phishwatch::deduplication::Deduplicator;
use phishwatch::enrichment::Enricher;
use phishwatch::matching::{SimilarityMatcher, DEFAULT_THRESHOLD};
use phishwatch::monitor::Monitor;
use phishwatch::store::{SqliteAlertStore, StoreError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Feed returning a fixed candidate set.
pub struct StaticFeed {
    pub domains: Vec<String>,
}

impl StaticFeed {
    pub fn new(domains: &[&str]) -> Self {
        Self {
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DomainFeed for StaticFeed {
    async fn fetch_candidates(&self) -> Result<HashSet<String>> {
        Ok(self.domains.iter().cloned().collect())
    }
}

/// Feed that always fails, like an unreachable aggregator.
pub struct FailingFeed;

#[async_trait]
impl DomainFeed for FailingFeed {
    async fn fetch_candidates(&self) -> Result<HashSet<String>> {
        Err(anyhow!("aggregator unreachable"))
    }
}

/// Page fetcher serving a fixed body, or failing when `None`.
pub struct StaticPage {
    pub html: Option<String>,
}

impl StaticPage {
    pub fn up(html: &str) -> Self {
        Self {
            html: Some(html.to_string()),
        }
    }

    pub fn down() -> Self {
        Self { html: None }
    }
}

#[async_trait]
impl PageFetcher for StaticPage {
    async fn fetch(&self, _url: &str) -> Result<String> {
        self.html
            .clone()
            .ok_or_else(|| anyhow!("connection refused"))
    }
}

/// Registration lookup returning a fixed record, or failing.
pub struct FakeRegistration {
    pub creation_date: Option<NaiveDate>,
    pub fail: bool,
}

impl FakeRegistration {
    pub fn with_date(year: i32, month: u32, day: u32) -> Self {
        Self {
            creation_date: NaiveDate::from_ymd_opt(year, month, day),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            creation_date: None,
            fail: true,
        }
    }
}

#[async_trait]
impl RegistrationLookup for FakeRegistration {
    async fn lookup(&self, _domain: &str) -> Result<RegistrationRecord> {
        if self.fail {
            return Err(anyhow!("registry timed out"));
        }
        Ok(RegistrationRecord {
            creation_date: self.creation_date,
            ..RegistrationRecord::default()
        })
    }
}

/// Screenshot capturer returning a canned path, or failing when `None`.
pub struct FakeScreenshot {
    pub path: Option<String>,
}

impl FakeScreenshot {
    pub fn working() -> Self {
        Self {
            path: Some("screenshots/fake.png".to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { path: None }
    }
}

#[async_trait]
impl ScreenshotCapturer for FakeScreenshot {
    async fn capture(&self, _url: &str, domain: &str) -> Result<String> {
        self.path
            .as_ref()
            .map(|_| format!("screenshots/{domain}.png"))
            .ok_or_else(|| anyhow!("browser failed to launch"))
    }
}

/// Reputation checker returning a fixed verdict.
pub struct FakeReputation {
    pub verdict: ReputationVerdict,
}

#[async_trait]
impl ReputationChecker for FakeReputation {
    async fn check(&self, _url: &str) -> ReputationVerdict {
        self.verdict
    }
}

/// Store wrapper that rejects writes for one domain, passing everything else
/// through to an in-memory store.
pub struct FlakyStore {
    pub inner: SqliteAlertStore,
    pub fail_for: String,
}

#[async_trait]
impl AlertStore for FlakyStore {
    async fn record(
        &self,
        alert: &NewAlert,
    ) -> Result<phishwatch::core::Alert, StoreError> {
        if alert.domain == self.fail_for {
            return Err(StoreError::Corrupt("injected write failure".to_string()));
        }
        self.inner.record(alert).await
    }

    async fn list_all(&self) -> Result<Vec<phishwatch::core::Alert>, StoreError> {
        self.inner.list_all().await
    }
}

/// Store wrapper that rejects the first write, then passes everything
/// through to an in-memory store.
pub struct FailOnceStore {
    pub inner: SqliteAlertStore,
    tripped: AtomicBool,
}

impl FailOnceStore {
    pub fn new(inner: SqliteAlertStore) -> Self {
        Self {
            inner,
            tripped: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AlertStore for FailOnceStore {
    async fn record(
        &self,
        alert: &NewAlert,
    ) -> Result<phishwatch::core::Alert, StoreError> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(StoreError::Corrupt("injected write failure".to_string()));
        }
        self.inner.record(alert).await
    }

    async fn list_all(&self) -> Result<Vec<phishwatch::core::Alert>, StoreError> {
        self.inner.list_all().await
    }
}

/// Assembles an enricher from fakes.
pub fn enricher(
    registration: FakeRegistration,
    page: StaticPage,
    screenshot: FakeScreenshot,
    verdict: ReputationVerdict,
    keywords: &[&str],
) -> Arc<Enricher> {
    Arc::new(Enricher::new(
        Arc::new(registration),
        Arc::new(page),
        Arc::new(screenshot),
        Arc::new(FakeReputation { verdict }),
        keywords.iter().map(|k| k.to_string()).collect(),
    ))
}

/// Assembles a monitor over an in-memory-style store and a static watch-list.
pub fn monitor(
    feed: Arc<dyn DomainFeed>,
    enricher: Arc<Enricher>,
    store: Arc<dyn AlertStore>,
    watch_list: &[&str],
    dedup_window: Option<Duration>,
) -> Monitor {
    Monitor::new(
        feed,
        SimilarityMatcher::new(
            watch_list.iter().map(|s| s.to_string()).collect(),
            DEFAULT_THRESHOLD,
        ),
        enricher,
        store,
        dedup_window.map(|window| Arc::new(Deduplicator::new(window, 1000))),
        2,
    )
}

pub async fn memory_store() -> Arc<SqliteAlertStore> {
    Arc::new(
        SqliteAlertStore::in_memory()
            .await
            .expect("in-memory store"),
    )
}
