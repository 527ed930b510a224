use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use super::listing::ListingDocument;
use crate::core::config::Locators;
use crate::core::error::ScrapeError;
use crate::tools::paginate::PageSource;
use crate::types::ListingItem;

/// The page primitives the checks need from a driver.
///
/// Drivers perform one operation at a time; callers await each call before
/// issuing the next.
#[async_trait]
pub trait ListingPage: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Current DOM of the page.
    async fn snapshot(&mut self) -> Result<ListingDocument>;

    /// Follow the pagination link.
    async fn click_more(&mut self, locators: &Locators) -> Result<()>;

    /// Whether `selector` matches a rendered element. Drivers without layout
    /// information fall back to presence in the DOM.
    async fn is_visible(&mut self, selector: &str) -> Result<bool> {
        self.snapshot().await?.contains(selector)
    }

    /// Save a full-page capture; `None` when the driver cannot render.
    async fn capture_screenshot(&mut self, _label: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Adapts a [`ListingPage`] to the scraper's [`PageSource`].
pub struct ListingSource<'a, P: ListingPage + ?Sized> {
    page: &'a mut P,
    locators: &'a Locators,
    screenshots: bool,
}

impl<'a, P: ListingPage + ?Sized> ListingSource<'a, P> {
    pub fn new(page: &'a mut P, locators: &'a Locators) -> Self {
        Self {
            page,
            locators,
            screenshots: false,
        }
    }

    /// Capture each consumed page, named after its page number.
    pub fn with_screenshots(mut self, enabled: bool) -> Self {
        self.screenshots = enabled;
        self
    }
}

#[async_trait]
impl<'a, P: ListingPage + ?Sized> PageSource for ListingSource<'a, P> {
    async fn current_items(&mut self) -> Result<Vec<ListingItem>, ScrapeError> {
        let doc = self.page.snapshot().await?;
        Ok(doc.listing_items(self.locators)?)
    }

    async fn next_page(&mut self) -> Result<bool, ScrapeError> {
        let doc = self.page.snapshot().await?;
        if doc.more_href(self.locators)?.is_none() {
            info!("no pagination link on {}", doc.url());
            return Ok(false);
        }
        self.page.click_more(self.locators).await?;
        Ok(true)
    }

    async fn page_scraped(&mut self, page: usize) -> Result<(), ScrapeError> {
        if !self.screenshots {
            return Ok(());
        }
        // Diagnostics only; a failed capture does not fail the scrape.
        match self.page.capture_screenshot(&format!("p{}", page)).await {
            Ok(Some(path)) => info!("page {} captured to {}", page, path.display()),
            Ok(None) => {}
            Err(e) => warn!("screenshot of page {} failed: {}", page, e),
        }
        Ok(())
    }
}
