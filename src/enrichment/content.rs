//! Live page retrieval and keyword scanning.

use crate::core::PageFetcher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use ego_tree::NodeRef;
use scraper::{Html, Node};
use std::time::Duration;

/// Plain-HTTP page fetcher with a bounded timeout.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build page-fetch HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .context("page request failed")?
            .error_for_status()
            .context("page request returned an error status")?
            .text()
            .await
            .context("failed to read page body")?;
        Ok(body)
    }
}

/// Reports every configured keyword appearing as a substring in the visible
/// page text. Script and style content is stripped first and the text is
/// lower-cased. Empty input yields an empty result.
pub fn find_keywords(html: &str, keywords: &[String]) -> Vec<String> {
    let text = visible_text(html).to_lowercase();
    keywords
        .iter()
        .filter(|keyword| text.contains(keyword.as_str()))
        .cloned()
        .collect()
}

/// Text content of the document with `<script>` and `<style>` subtrees
/// removed.
fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    collect_text(document.tree.root(), &mut text);
    text
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    if let Node::Element(element) = node.value() {
        if matches!(element.name(), "script" | "style") {
            return;
        }
    }
    if let Node::Text(t) = node.value() {
        out.push_str(&t.text);
        out.push(' ');
    }
    for child in node.children() {
        collect_text(child, out);
    }
}
