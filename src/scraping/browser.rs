//! Headless Chromium driver for the listing checks.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::browser_manager;
use super::listing::ListingDocument;
use super::page::ListingPage;
use crate::core::config::{Locators, PageSettle};

const VIEWPORT_WIDTH: u32 = 1280;
const VIEWPORT_HEIGHT: u32 = 900;

pub struct BrowserListing {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    screenshots_dir: Option<PathBuf>,
    settle: PageSettle,
}

impl BrowserListing {
    /// Launch a browser with one blank tab. `settle` bounds the wait after
    /// each navigation and click.
    pub async fn launch(screenshots_dir: Option<PathBuf>, settle: PageSettle) -> Result<Self> {
        let (browser, handler) =
            browser_manager::launch_headless(VIEWPORT_WIDTH, VIEWPORT_HEIGHT).await?;
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(anyhow!("Failed to open tab: {}", e));
            }
        };
        Ok(Self {
            browser,
            page,
            handler,
            screenshots_dir,
            settle,
        })
    }

    async fn current_url(&self) -> String {
        self.page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| "about:blank".to_string())
    }
}

/// JS expression: does `selector` match an element with a non-empty box that
/// is not hidden by style?
fn visibility_script(selector: &str) -> Result<String> {
    let quoted = serde_json::to_string(selector)?;
    Ok(format!(
        r#"(() => {{
  const el = document.querySelector({quoted});
  if (!el) return false;
  const rect = el.getBoundingClientRect();
  const style = window.getComputedStyle(el);
  return rect.width > 0 && rect.height > 0
    && style.visibility !== 'hidden' && style.display !== 'none';
}})()"#
    ))
}

#[async_trait]
impl ListingPage for BrowserListing {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("navigate: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| anyhow!("Failed to navigate to {}: {}", url, e))?;
        browser_manager::wait_until_stable(&self.page, self.settle).await
    }

    async fn snapshot(&mut self) -> Result<ListingDocument> {
        let html = self
            .page
            .content()
            .await
            .map_err(|e| anyhow!("Failed to read page content: {}", e))?;
        Ok(ListingDocument::new(self.current_url().await, html))
    }

    async fn click_more(&mut self, locators: &Locators) -> Result<()> {
        let link = self
            .page
            .find_element(locators.more.as_str())
            .await
            .map_err(|e| anyhow!("pagination link {:?} not found: {}", locators.more, e))?;
        link.click()
            .await
            .map_err(|e| anyhow!("Failed to click pagination link: {}", e))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| anyhow!("Navigation after click failed: {}", e))?;
        browser_manager::wait_until_stable(&self.page, self.settle).await
    }

    async fn is_visible(&mut self, selector: &str) -> Result<bool> {
        let visible = self
            .page
            .evaluate(visibility_script(selector)?)
            .await
            .map_err(|e| anyhow!("visibility check for {:?} failed: {}", selector, e))?
            .into_value::<bool>()
            .map_err(|e| anyhow!("visibility check returned a non-boolean: {}", e))?;
        Ok(visible)
    }

    async fn capture_screenshot(&mut self, label: &str) -> Result<Option<PathBuf>> {
        let Some(dir) = self.screenshots_dir.clone() else {
            return Ok(None);
        };

        let bytes = self
            .page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| anyhow!("screenshot capture failed: {}", e))?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow!("failed to create {}: {}", dir.display(), e))?;
        let path = dir.join(format!(
            "newest-articles-{}-{}.png",
            chrono::Utc::now().timestamp_millis(),
            label
        ));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| anyhow!("failed to write {}: {}", path.display(), e))?;

        info!("screenshot: {} bytes → {}", bytes.len(), path.display());
        Ok(Some(path))
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close error (non-fatal): {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}
