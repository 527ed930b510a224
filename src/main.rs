use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use newest_order::config::{self, ConfigOverrides, Driver};
use newest_order::suite::CheckStatus;
use newest_order::{run_suite, BrowserListing, HttpListing, ListingPage, SuiteConfig};

/// Check that a live "newest" listing paginates and lists articles newest first.
#[derive(Parser, Debug)]
#[command(name = "newest-order", version, about)]
struct Args {
    /// Listing to check (env: TARGET_URL)
    #[arg(long)]
    url: Option<String>,

    /// Number of articles to collect (env: TEST_COUNT)
    #[arg(long)]
    count: Option<usize>,

    /// Regex the page title must match (env: TITLE_KEYWORD)
    #[arg(long)]
    title: Option<String>,

    /// Page driver: browser or http (env: NEWEST_ORDER_DRIVER)
    #[arg(long)]
    driver: Option<String>,

    /// Directory for per-page screenshots (env: NEWEST_ORDER_SCREENSHOTS)
    #[arg(long)]
    screenshots: Option<String>,

    /// Do not capture screenshots
    #[arg(long)]
    no_screenshots: bool,

    /// Path to a newest-order.json config file (env: NEWEST_ORDER_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
}

async fn open_page(cfg: &SuiteConfig) -> anyhow::Result<Box<dyn ListingPage>> {
    let page: Box<dyn ListingPage> = match cfg.driver {
        Driver::Browser => Box::new(
            BrowserListing::launch(cfg.screenshots_dir.clone(), cfg.page_settle).await?,
        ),
        Driver::Http => {
            if cfg.screenshots_dir.is_some() {
                info!("http driver cannot render pages; screenshots disabled");
            }
            Box::new(HttpListing::with_timeout(cfg.http_timeout)?)
        }
    };
    Ok(page)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the JSON report.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let args = Args::parse();
    let file = config::load_file_config(args.config.as_deref());
    let overrides = ConfigOverrides {
        target_url: args.url,
        test_count: args.count,
        title_keyword: args.title,
        driver: args.driver,
        screenshots_dir: args.screenshots,
        no_screenshots: args.no_screenshots,
    };

    let cfg = match SuiteConfig::from_env(&file, &overrides) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    info!(
        "checking {} ({} articles, {:?} driver)",
        cfg.target_url, cfg.test_count, cfg.driver
    );

    let mut page = match open_page(&cfg).await {
        Ok(page) => page,
        Err(e) => {
            error!("failed to start page driver: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = run_suite(page.as_mut(), &cfg).await;

    if let Err(e) = page.close().await {
        warn!("driver shutdown error: {}", e);
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("failed to serialize report: {}", e),
    }

    let failed = report
        .checks
        .iter()
        .filter(|c| !matches!(c.status, CheckStatus::Passed))
        .count();
    if failed == 0 {
        info!("all {} checks passed", report.checks.len());
        ExitCode::SUCCESS
    } else {
        error!("{} of {} checks did not pass", failed, report.checks.len());
        ExitCode::FAILURE
    }
}
