//! On-demand single-URL analysis and plain-text report rendering.

use crate::core::{PageFetcher, RegistrationLookup, RegistrationRecord, ScreenshotCapturer, SimilarityMatch};
use crate::dns::{DnsRecords, RecordLookup};
use crate::matching::SimilarityMatcher;
use scraper::{Html, Selector};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Malformed input from the caller; surfaced as a user-visible message,
    /// not retried.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Metadata scraped from a fetched page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// Runs the full analysis for one caller-supplied URL and renders a report.
pub struct Analyzer {
    registration: Arc<dyn RegistrationLookup>,
    dns: RecordLookup,
    matcher: SimilarityMatcher,
    fetcher: Arc<dyn PageFetcher>,
    capturer: Arc<dyn ScreenshotCapturer>,
}

impl Analyzer {
    pub fn new(
        registration: Arc<dyn RegistrationLookup>,
        dns: RecordLookup,
        matcher: SimilarityMatcher,
        fetcher: Arc<dyn PageFetcher>,
        capturer: Arc<dyn ScreenshotCapturer>,
    ) -> Self {
        Self {
            registration,
            dns,
            matcher,
            fetcher,
            capturer,
        }
    }

    /// Analyzes one URL: registration record, DNS records, watch-list
    /// similarity, live content and screenshot. Every external lookup
    /// degrades independently; only malformed input is an error.
    pub async fn analyze(&self, raw_url: &str) -> Result<String, AnalyzeError> {
        let (url, domain) = normalize_url(raw_url)?;
        info!(%url, domain, "analyzing URL on demand");

        let registration = match self.registration.lookup(&domain).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(domain, error = %e, "registration lookup failed");
                None
            }
        };
        let dns_records = self.dns.lookup(&domain).await;
        let matches = self.matcher.matches(&domain);

        let mut metadata = None;
        let mut screenshot_path = None;
        let mut content_error = false;
        match self.fetcher.fetch(url.as_str()).await {
            Ok(html) => {
                metadata = Some(extract_metadata(&html));
                match self.capturer.capture(url.as_str(), &domain).await {
                    Ok(path) => screenshot_path = Some(path),
                    Err(e) => warn!(domain, error = %e, "screenshot capture failed"),
                }
            }
            Err(e) => {
                warn!(domain, error = %e, "could not fetch page content");
                content_error = true;
            }
        }

        Ok(generate_report(
            &domain,
            registration.as_ref(),
            &dns_records,
            &matches,
            metadata.as_ref(),
            screenshot_path.as_deref(),
            content_error,
        ))
    }
}

/// Prefixes a missing scheme and extracts the host. Hosts without a dot are
/// rejected as invalid.
fn normalize_url(raw: &str) -> Result<(Url, String), AnalyzeError> {
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let url = Url::parse(&with_scheme).map_err(|_| AnalyzeError::InvalidUrl(raw.to_string()))?;
    let domain = url
        .host_str()
        .filter(|host| host.contains('.'))
        .map(|host| host.to_lowercase())
        .ok_or_else(|| AnalyzeError::InvalidUrl(raw.to_string()))?;
    Ok((url, domain))
}

/// Extracts title and description/keywords meta tags from a page.
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);

    let text_of = |selector: &str| -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        let element = document.select(&selector).next()?;
        let text: String = element.text().collect::<String>().trim().to_string();
        (!text.is_empty()).then_some(text)
    };
    let content_of = |selector: &str| -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .next()?
            .value()
            .attr("content")
            .map(str::to_string)
    };

    PageMetadata {
        title: text_of("title"),
        description: content_of(r#"meta[name="description"]"#),
        keywords: content_of(r#"meta[name="keywords"]"#),
    }
}

/// Renders the analysis as a plain-text report.
pub fn generate_report(
    domain: &str,
    registration: Option<&RegistrationRecord>,
    dns_records: &DnsRecords,
    matches: &[SimilarityMatch],
    metadata: Option<&PageMetadata>,
    screenshot_path: Option<&str>,
    content_error: bool,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    let rule = "=".repeat(50);

    parts.push(rule.clone());
    parts.push(format!("Analysis Report for: {domain}"));
    parts.push(rule);

    parts.push("\n--- Domain Analysis ---".to_string());
    match registration {
        Some(record) => {
            parts.push("Registration:".to_string());
            if let Some(registrar) = &record.registrar {
                parts.push(format!("  Registrar: {registrar}"));
            }
            if let Some(date) = record.creation_date {
                parts.push(format!("  Created: {}", date.format("%Y-%m-%d")));
            }
            if let Some(date) = record.expiration_date {
                parts.push(format!("  Expires: {}", date.format("%Y-%m-%d")));
            }
            if !record.name_servers.is_empty() {
                parts.push(format!("  Name servers: {}", record.name_servers.join(", ")));
            }
        }
        None => parts.push(
            "Registration: could not retrieve a record. The domain may not exist or there was a query error."
                .to_string(),
        ),
    }

    parts.push("\nDNS Records:".to_string());
    for (label, records) in [
        ("A", &dns_records.a),
        ("AAAA", &dns_records.aaaa),
        ("MX", &dns_records.mx),
        ("NS", &dns_records.ns),
        ("TXT", &dns_records.txt),
    ] {
        parts.push(format!("  {label}:"));
        if records.is_empty() {
            parts.push("    - No records found".to_string());
        } else {
            for record in records {
                parts.push(format!("    - {record}"));
            }
        }
    }

    parts.push("\nDomain Similarity:".to_string());
    if matches.is_empty() {
        parts.push(
            "  The domain does not show strong similarity to any target domains.".to_string(),
        );
    } else {
        parts.push("  Suspicious similarity found with the following target domains:".to_string());
        for m in matches {
            parts.push(format!(
                "    - Similar to '{}' with a score of {}%",
                m.target, m.score
            ));
        }
    }

    parts.push("\n--- Web Content Analysis ---".to_string());
    if content_error {
        parts.push(
            "Could not access the webpage. The domain may not have a live website.".to_string(),
        );
    } else {
        if let Some(metadata) = metadata {
            parts.push("Metadata:".to_string());
            parts.push(format!(
                "  Title: {}",
                metadata.title.as_deref().unwrap_or("No title found")
            ));
            parts.push(format!(
                "  Description: {}",
                metadata.description.as_deref().unwrap_or("")
            ));
            parts.push(format!(
                "  Keywords: {}",
                metadata.keywords.as_deref().unwrap_or("")
            ));
        }
        match screenshot_path {
            Some(path) => parts.push(format!("\nScreenshot saved to: {path}")),
            None => parts.push("\nScreenshot not available.".to_string()),
        }
    }

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_meta_tags() {
        let html = r#"<html><head>
            <title> Example Site </title>
            <meta name="description" content="A test page">
            <meta name="keywords" content="test, page">
        </head><body></body></html>"#;
        let metadata = extract_metadata(html);
        assert_eq!(metadata.title.as_deref(), Some("Example Site"));
        assert_eq!(metadata.description.as_deref(), Some("A test page"));
        assert_eq!(metadata.keywords.as_deref(), Some("test, page"));
    }

    #[test]
    fn missing_metadata_is_none() {
        let metadata = extract_metadata("<html><body>plain</body></html>");
        assert_eq!(metadata, PageMetadata::default());
    }

    #[test]
    fn normalize_url_prefixes_scheme() {
        let (url, domain) = normalize_url("example.com/login").unwrap();
        assert_eq!(url.as_str(), "http://example.com/login");
        assert_eq!(domain, "example.com");
    }

    #[test]
    fn normalize_url_rejects_garbage() {
        assert!(normalize_url("not a url").is_err());
        assert!(normalize_url("localhost").is_err());
    }

    #[test]
    fn report_mentions_similarity_hits() {
        let matches = vec![SimilarityMatch {
            target: "paypal.com".to_string(),
            score: 94,
        }];
        let report = generate_report(
            "paypa1.com",
            None,
            &DnsRecords::default(),
            &matches,
            None,
            None,
            true,
        );
        assert!(report.contains("Analysis Report for: paypa1.com"));
        assert!(report.contains("Similar to 'paypal.com' with a score of 94%"));
        assert!(report.contains("Could not access the webpage."));
    }
}
