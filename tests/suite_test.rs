mod common;

use common::{falling, init_logger, StaticSite};
use newest_order::config::{ConfigOverrides, FileConfig};
use newest_order::suite::CheckStatus;
use newest_order::{run_suite, SuiteConfig};

const BASE: &str = "https://news.example.org/newest";

fn config(count: usize, title: &str) -> SuiteConfig {
    let overrides = ConfigOverrides {
        target_url: Some(BASE.to_string()),
        test_count: Some(count),
        title_keyword: Some(title.to_string()),
        no_screenshots: true,
        ..Default::default()
    };
    SuiteConfig::resolve(&FileConfig::default(), &overrides, |_| None).unwrap()
}

#[tokio::test]
async fn test_healthy_listing_passes_every_check() {
    init_logger();
    let mut site = StaticSite::new(BASE, &falling(130), 30);
    let report = run_suite(&mut site, &config(100, "Hacker News")).await;

    assert!(report.passed(), "{:#?}", report.checks);
    let names: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Page has title",
            "Articles exist",
            "More items is working",
            "Can read exactly 100 articles",
            "The 100 articles are in descending order",
            "The articles are not in descending order when manipulated",
        ]
    );
    assert_eq!(report.checks[3].group, "100 Articles In Descending Order");
}

#[tokio::test]
async fn test_title_mismatch_fails_only_that_check() {
    init_logger();
    // Three pages, so the second one still carries a "More" link.
    let mut site = StaticSite::new(BASE, &falling(90), 30);
    let report = run_suite(&mut site, &config(30, "^Lobsters$")).await;

    let failed: Vec<&str> = report
        .checks
        .iter()
        .filter(|c| !matches!(c.status, CheckStatus::Passed))
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(failed, vec!["Page has title"]);
}

#[tokio::test]
async fn test_tied_timestamps_are_descending() {
    init_logger();
    let mut timestamps = falling(40);
    timestamps[10] = timestamps[9];
    timestamps[11] = timestamps[9];
    let mut site = StaticSite::new(BASE, &timestamps, 30);
    let report = run_suite(&mut site, &config(40, "Hacker News")).await;

    assert_eq!(
        report.check("The 40 articles are in descending order").unwrap().status,
        CheckStatus::Passed
    );
}

#[tokio::test]
async fn test_newer_article_below_older_one_is_reported() {
    init_logger();
    let mut timestamps = falling(60);
    // Item on page 2 is newer than the one before it.
    timestamps[35] = timestamps[0] + 3600;
    let mut site = StaticSite::new(BASE, &timestamps, 30);
    let report = run_suite(&mut site, &config(60, "Hacker News")).await;

    match &report.check("The 60 articles are in descending order").unwrap().status {
        CheckStatus::Failed { reason } => {
            assert!(reason.contains("article #34"), "{}", reason);
        }
        other => panic!("expected failure, got {:?}", other),
    }

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["articles_collected"], 60);
    assert_eq!(json["checks"][4]["status"], "failed");
}

#[tokio::test]
async fn test_second_page_without_more_link_fails_more_check() {
    init_logger();
    let mut site = StaticSite::new(BASE, &falling(60), 30);
    let report = run_suite(&mut site, &config(30, "Hacker News")).await;

    match &report.check("More items is working").unwrap().status {
        CheckStatus::Failed { reason } => {
            assert!(reason.contains("second page"), "{}", reason);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(site.clicks, 1);
    let failed = report
        .checks
        .iter()
        .filter(|c| !matches!(c.status, CheckStatus::Passed))
        .count();
    assert_eq!(failed, 1);
}

#[tokio::test]
async fn test_single_page_fails_more_check() {
    init_logger();
    let mut site = StaticSite::new(BASE, &falling(10), 30);
    let report = run_suite(&mut site, &config(5, "Hacker News")).await;

    assert!(matches!(
        report.check("More items is working").unwrap().status,
        CheckStatus::Failed { .. }
    ));
    assert_eq!(
        report.check("Can read exactly 5 articles").unwrap().status,
        CheckStatus::Passed
    );
    assert_eq!(site.clicks, 0);
}

#[tokio::test]
async fn test_swapped_neighbours_are_reported() {
    init_logger();
    let mut timestamps = falling(60);
    timestamps.swap(40, 41);
    let mut site = StaticSite::new(BASE, &timestamps, 30);
    let report = run_suite(&mut site, &config(50, "Hacker News")).await;

    assert!(!report.passed());
    match &report.check("The 50 articles are in descending order").unwrap().status {
        CheckStatus::Failed { reason } => assert!(reason.contains("article #40"), "{}", reason),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_short_listing_skips_order_checks() {
    init_logger();
    let mut site = StaticSite::new(BASE, &falling(45), 30);
    let report = run_suite(&mut site, &config(100, "Hacker News")).await;

    assert!(matches!(
        report.check("Can read exactly 100 articles").unwrap().status,
        CheckStatus::Failed { .. }
    ));
    for name in [
        "The 100 articles are in descending order",
        "The articles are not in descending order when manipulated",
    ] {
        assert!(
            matches!(report.check(name).unwrap().status, CheckStatus::Skipped { .. }),
            "{} should be skipped",
            name
        );
    }
    assert_eq!(report.articles_collected, 0);
}
