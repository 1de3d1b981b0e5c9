//! Rendered screenshot capture with a headless browser.
//!
//! The browser is acquired and released per attempt and is torn down on every
//! exit path, timeout included. A capture failure yields an error for the
//! caller to degrade on; it is never allowed to leak a rendering process.

use crate::core::ScreenshotCapturer;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Captures page screenshots via a headless Chromium instance.
pub struct ChromiumCapturer {
    dir: PathBuf,
    render_timeout: Duration,
}

impl ChromiumCapturer {
    /// `dir` is created on first capture if absent.
    pub fn new(dir: PathBuf, render_timeout: Duration) -> Self {
        Self {
            dir,
            render_timeout,
        }
    }
}

#[async_trait]
impl ScreenshotCapturer for ChromiumCapturer {
    async fn capture(&self, url: &str, domain: &str) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .context("failed to create screenshots directory")?;
        let path = self.dir.join(format!("{domain}.png"));

        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1280, 800)
            .build()
            .map_err(|e| anyhow!("invalid browser configuration: {e}"))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch headless browser")?;
        let driver = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let result = timeout(self.render_timeout, render(&browser, url, &path)).await;

        // Teardown runs on every exit path before the result is inspected.
        if let Err(e) = browser.close().await {
            trace!(error = %e, "browser close failed");
        }
        let _ = browser.wait().await;
        driver.abort();

        match result {
            Ok(Ok(())) => {
                debug!(domain, path = %path.display(), "screenshot saved");
                Ok(path.to_string_lossy().into_owned())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(anyhow!(
                "screenshot render timed out after {:?}",
                self.render_timeout
            )),
        }
    }
}

async fn render(browser: &Browser, url: &str, path: &Path) -> Result<()> {
    let page = browser
        .new_page(url)
        .await
        .context("failed to open page")?;
    page.wait_for_navigation()
        .await
        .context("navigation did not settle")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build(),
        path,
    )
    .await
    .context("failed to write screenshot")?;
    Ok(())
}
