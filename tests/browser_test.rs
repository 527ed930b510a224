mod common;

use newest_order::config::PageSettle;
use newest_order::scraping::browser_manager;
use newest_order::{BrowserListing, ListingPage};

fn data_url(html: &str) -> String {
    let encoded =
        percent_encoding::utf8_percent_encode(html, percent_encoding::NON_ALPHANUMERIC);
    format!("data:text/html,{}", encoded)
}

#[tokio::test]
async fn test_browser_reads_rendered_listing() {
    common::init_logger();
    if browser_manager::find_chrome_executable().is_none() {
        tracing::warn!("no browser installed, skipping");
        return;
    }
    let mut listing = match BrowserListing::launch(None, PageSettle::default()).await {
        Ok(l) => l,
        Err(e) => {
            // Sandboxed CI often cannot start Chromium.
            tracing::warn!("browser launch failed: {}", e);
            return;
        }
    };

    let url = data_url(&common::listing_html(1, &[20, 10], None));
    if listing.navigate(&url).await.is_ok() {
        let doc = listing.snapshot().await.unwrap();
        assert_eq!(doc.count_of(".submission").unwrap(), 2);
        assert!(listing.is_visible(".submission").await.unwrap());
        assert!(!listing.is_visible(".morelink").await.unwrap());
    }
    listing.close().await.unwrap();
}
