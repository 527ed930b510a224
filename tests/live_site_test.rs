//! Checks against the real listing. Needs network access:
//! `cargo test --test live_site_test -- --ignored`
mod common;

use common::init_logger;
use newest_order::config::{ConfigOverrides, FileConfig};
use newest_order::{run_suite, HttpListing, ListingPage, SuiteConfig};

#[tokio::test]
#[ignore]
async fn test_live_newest_over_http() {
    init_logger();
    let overrides = ConfigOverrides {
        driver: Some("http".to_string()),
        no_screenshots: true,
        ..Default::default()
    };
    let cfg = SuiteConfig::from_env(&FileConfig::default(), &overrides).unwrap();
    let mut page = HttpListing::with_timeout(cfg.http_timeout).unwrap();

    let report = run_suite(&mut page, &cfg).await;
    page.close().await.unwrap();

    println!("{}", serde_json::to_string_pretty(&report).unwrap());
    assert!(report.passed(), "{:#?}", report.checks);
}
