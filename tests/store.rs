//! Persistence round-trip and ordering tests against an in-memory database.

use anyhow::Result;
use phishwatch::core::{AlertStore, NewAlert, ReputationVerdict, RiskStatus};
use phishwatch::store::SqliteAlertStore;

fn alert(domain: &str) -> NewAlert {
    NewAlert {
        domain: domain.to_string(),
        similar_to: "paypal.com".to_string(),
        similarity_score: 91,
        creation_date: "2025-03-14".to_string(),
        status: RiskStatus::Suspicious,
        keywords_found: Vec::new(),
        screenshot_path: None,
        reputation: ReputationVerdict::Clean,
    }
}

#[tokio::test]
async fn round_trip_preserves_every_field() -> Result<()> {
    let store = SqliteAlertStore::in_memory().await?;
    let new = NewAlert {
        domain: "secure-paypal-login.net".to_string(),
        similar_to: "paypal.com".to_string(),
        similarity_score: 100,
        creation_date: "2025-06-28".to_string(),
        status: RiskStatus::HighRiskPhishing,
        keywords_found: vec!["login".to_string(), "verify".to_string()],
        screenshot_path: Some("screenshots/secure-paypal-login.net.png".to_string()),
        reputation: ReputationVerdict::SocialEngineering,
    };

    let written = store.record(&new).await?;
    assert!(written.id > 0);

    let alerts = store.list_all().await?;
    assert_eq!(alerts.len(), 1);
    let read = &alerts[0];
    assert_eq!(read.id, written.id);
    assert_eq!(read.created_at, written.created_at);
    assert_eq!(read.domain, new.domain);
    assert_eq!(read.similar_to, new.similar_to);
    assert_eq!(read.similarity_score, new.similarity_score);
    assert_eq!(read.creation_date, new.creation_date);
    assert_eq!(read.status, new.status);
    assert_eq!(read.keywords_found, new.keywords_found);
    assert_eq!(read.screenshot_path, new.screenshot_path);
    assert_eq!(read.reputation, new.reputation);
    Ok(())
}

#[tokio::test]
async fn returned_timestamp_matches_the_persisted_row() -> Result<()> {
    use chrono::Timelike;

    let store = SqliteAlertStore::in_memory().await?;
    let written = store.record(&alert("paypal-login.net")).await?;

    // Rows hold microsecond precision, so the returned timestamp must too.
    assert_eq!(written.created_at.nanosecond() % 1_000, 0);

    let read = &store.list_all().await?[0];
    assert_eq!(read.created_at, written.created_at);
    Ok(())
}

#[tokio::test]
async fn optional_fields_survive_when_absent() -> Result<()> {
    let store = SqliteAlertStore::in_memory().await?;
    store.record(&alert("paypal-help.net")).await?;

    let alerts = store.list_all().await?;
    assert!(alerts[0].keywords_found.is_empty());
    assert_eq!(alerts[0].screenshot_path, None);
    Ok(())
}

#[tokio::test]
async fn listing_is_newest_first() -> Result<()> {
    let store = SqliteAlertStore::in_memory().await?;
    store.record(&alert("first.net")).await?;
    store.record(&alert("second.net")).await?;
    store.record(&alert("third.net")).await?;

    let alerts = store.list_all().await?;
    let order: Vec<&str> = alerts.iter().map(|a| a.domain.as_str()).collect();
    assert_eq!(order, vec!["third.net", "second.net", "first.net"]);
    Ok(())
}

#[tokio::test]
async fn ids_are_assigned_monotonically() -> Result<()> {
    let store = SqliteAlertStore::in_memory().await?;
    let a = store.record(&alert("a.net")).await?;
    let b = store.record(&alert("b.net")).await?;
    assert!(b.id > a.id);
    Ok(())
}

#[tokio::test]
async fn empty_store_lists_nothing() -> Result<()> {
    let store = SqliteAlertStore::in_memory().await?;
    assert!(store.list_all().await?.is_empty());
    Ok(())
}
