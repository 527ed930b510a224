//! Browserless driver: fetches listing pages over plain HTTP.
//!
//! Clicking "More" means resolving the link's `href` against the current URL
//! and fetching that page. There is no layout, so visibility is presence and
//! screenshots are unavailable.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use super::listing::ListingDocument;
use super::page::ListingPage;
use crate::core::config::Locators;

pub struct HttpListing {
    client: reqwest::Client,
    current: Option<ListingDocument>,
}

impl HttpListing {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            current: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(concat!("newest-order/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client))
    }

    fn current(&self) -> Result<&ListingDocument> {
        self.current
            .as_ref()
            .ok_or_else(|| anyhow!("no page loaded; navigate first"))
    }
}

/// Resolve a pagination `href` relative to the page it was found on.
pub fn resolve_href(base: &str, href: &str) -> Result<String> {
    let base = Url::parse(base).map_err(|e| anyhow!("invalid page url {:?}: {}", base, e))?;
    let next = base
        .join(href)
        .map_err(|e| anyhow!("invalid pagination href {:?}: {}", href, e))?;
    Ok(next.to_string())
}

#[async_trait]
impl ListingPage for HttpListing {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("GET {} returned {}", url, status));
        }
        let final_url = resp.url().to_string();
        let body = resp.text().await?;
        info!("fetched {} ({} bytes)", final_url, body.len());

        self.current = Some(ListingDocument::new(final_url, body));
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<ListingDocument> {
        self.current().cloned()
    }

    async fn click_more(&mut self, locators: &Locators) -> Result<()> {
        let doc = self.current()?;
        let href = doc
            .more_href(locators)?
            .ok_or_else(|| anyhow!("pagination link {:?} not found", locators.more))?;
        let next = resolve_href(doc.url(), &href)?;
        self.navigate(&next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            resolve_href(
                "https://news.ycombinator.com/newest",
                "newest?next=40000000&n=31"
            )
            .unwrap(),
            "https://news.ycombinator.com/newest?next=40000000&n=31"
        );
        assert_eq!(
            resolve_href("https://example.com/a/b", "/c?p=2").unwrap(),
            "https://example.com/c?p=2"
        );
    }

    #[tokio::test]
    async fn test_snapshot_requires_navigation() {
        let mut page = HttpListing::new(reqwest::Client::new());
        assert!(page.snapshot().await.is_err());
        assert!(page.click_more(&Locators::default()).await.is_err());
    }
}
