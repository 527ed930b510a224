//! End-to-end checks against the live listing.
//!
//! Two groups run in order. "Site Functionality" checks are independent and
//! each starts from the target URL. The ordering group is serial: the scrape
//! fills [`SuiteContext::articles`] and the later checks read it; when the
//! scrape fails they are skipped.

use std::time::Instant;

use anyhow::{ensure, Context, Result};
use serde::Serialize;
use tracing::{debug, error, info};

use super::order::{first_violation, is_descending};
use super::paginate::collect_articles;
use crate::core::config::SuiteConfig;
use crate::scraping::page::{ListingPage, ListingSource};
use crate::types::Article;

/// Timestamp of the synthetic "old" article used by the manipulation check (2023).
pub const OLD_ARTICLE_TIMESTAMP: i64 = 1_690_000_000;

pub const SITE_GROUP: &str = "Site Functionality";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed { reason: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub group: String,
    pub name: String,
    #[serde(flatten)]
    pub status: CheckStatus,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub target_url: String,
    pub test_count: usize,
    pub started_at: String,
    pub finished_at: String,
    pub articles_collected: usize,
    pub checks: Vec<CheckResult>,
}

impl SuiteReport {
    /// `true` when no check failed or was skipped.
    pub fn passed(&self) -> bool {
        self.checks
            .iter()
            .all(|c| matches!(c.status, CheckStatus::Passed))
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// State shared by the serial ordering checks.
#[derive(Debug)]
pub struct SuiteContext<'a> {
    pub config: &'a SuiteConfig,
    /// Filled by the scrape check; empty when it failed.
    pub articles: Vec<Article>,
}

impl<'a> SuiteContext<'a> {
    pub fn new(config: &'a SuiteConfig) -> Self {
        Self {
            config,
            articles: Vec::new(),
        }
    }
}

pub fn check_names(test_count: usize) -> [String; 6] {
    [
        "Page has title".to_string(),
        "Articles exist".to_string(),
        "More items is working".to_string(),
        format!("Can read exactly {} articles", test_count),
        format!("The {} articles are in descending order", test_count),
        "The articles are not in descending order when manipulated".to_string(),
    ]
}

struct Recorder {
    checks: Vec<CheckResult>,
}

impl Recorder {
    fn record(&mut self, group: &str, name: &str, started: Instant, outcome: Result<()>) {
        let status = match outcome {
            Ok(()) => {
                info!("✅ {} › {}", group, name);
                CheckStatus::Passed
            }
            Err(e) => {
                error!("❌ {} › {}: {:#}", group, name, e);
                CheckStatus::Failed {
                    reason: format!("{:#}", e),
                }
            }
        };
        self.push(group, name, started, status);
    }

    fn skip(&mut self, group: &str, name: &str, reason: &str) {
        info!("⏭️  {} › {}: skipped ({})", group, name, reason);
        self.push(
            group,
            name,
            Instant::now(),
            CheckStatus::Skipped {
                reason: reason.to_string(),
            },
        );
    }

    fn push(&mut self, group: &str, name: &str, started: Instant, status: CheckStatus) {
        self.checks.push(CheckResult {
            group: group.to_string(),
            name: name.to_string(),
            status,
            duration_ms: started.elapsed().as_millis() as u64,
        });
    }
}

async fn page_has_title<P: ListingPage + ?Sized>(page: &mut P, config: &SuiteConfig) -> Result<()> {
    page.navigate(config.target_url.as_str()).await?;
    let title = page.snapshot().await?.title();
    ensure!(
        config.title_keyword.is_match(&title),
        "page title {:?} does not match /{}/",
        title,
        config.title_keyword
    );
    Ok(())
}

async fn articles_exist<P: ListingPage + ?Sized>(page: &mut P, config: &SuiteConfig) -> Result<()> {
    page.navigate(config.target_url.as_str()).await?;
    let count = page.snapshot().await?.count_of(&config.locators.article)?;
    ensure!(count > 0, "no elements match {:?}", config.locators.article);
    debug!("{} article rows on first page", count);
    Ok(())
}

async fn more_link_works<P: ListingPage + ?Sized>(page: &mut P, config: &SuiteConfig) -> Result<()> {
    let more = &config.locators.more;
    page.navigate(config.target_url.as_str()).await?;

    info!("step: verify the 'More' link is visible");
    ensure!(page.is_visible(more).await?, "{:?} is not visible", more);

    info!("step: click the 'More' link");
    page.click_more(&config.locators)
        .await
        .context("clicking 'More' failed")?;

    info!("step: verify the 'More' link is still visible");
    ensure!(
        page.is_visible(more).await?,
        "{:?} is not visible on the second page",
        more
    );
    Ok(())
}

async fn read_exact_articles<P: ListingPage + ?Sized>(
    page: &mut P,
    ctx: &mut SuiteContext<'_>,
) -> Result<()> {
    let config = ctx.config;
    info!("step: go to the target URL [{}]", config.target_url);
    page.navigate(config.target_url.as_str()).await?;

    let mut source = ListingSource::new(page, &config.locators)
        .with_screenshots(config.screenshots_dir.is_some());
    let articles = collect_articles(&mut source, config.test_count).await?;

    debug!(
        "scraped articles: {}",
        serde_json::to_string(&articles).unwrap_or_default()
    );
    ensure!(
        articles.len() == config.test_count,
        "expected {} articles, got {}",
        config.test_count,
        articles.len()
    );
    ctx.articles = articles;
    Ok(())
}

fn articles_descending(ctx: &SuiteContext<'_>) -> Result<()> {
    ensure!(!ctx.articles.is_empty(), "no articles were scraped");
    if let Some(violation) = first_violation(&ctx.articles) {
        anyhow::bail!("articles are not in descending order: {}", violation);
    }
    Ok(())
}

/// An old article must break the order at the front and keep it at the end.
/// Works on copies; the scraped list is left untouched.
fn manipulated_order_detected(articles: &[Article]) -> Result<()> {
    ensure!(
        is_descending(articles),
        "scraped articles are not descending to begin with"
    );

    let oldest = articles
        .iter()
        .filter_map(|a| a.timestamp.as_unix())
        .min()
        .unwrap_or(OLD_ARTICLE_TIMESTAMP + 1);
    // Stays a valid (positive) timestamp even when the oldest article is at 1.
    let old_ts = OLD_ARTICLE_TIMESTAMP.min(oldest - 1).max(1);
    let old = Article::new(1, "Some old thing", old_ts);

    info!("step: add an old article to the front and check it's no longer descending");
    let mut front = Vec::with_capacity(articles.len() + 1);
    front.push(old.clone());
    front.extend_from_slice(articles);
    ensure!(
        !is_descending(&front),
        "old article at the front was not detected"
    );

    info!("step: verify adding the old article to the end is still descending");
    let mut back = articles.to_vec();
    back.push(old);
    ensure!(
        is_descending(&back),
        "old article at the end broke the order: {}",
        first_violation(&back).map(|v| v.to_string()).unwrap_or_default()
    );
    Ok(())
}

/// Run every check against `page`. Never fails: problems end up in the report.
pub async fn run_suite<P: ListingPage + ?Sized>(page: &mut P, config: &SuiteConfig) -> SuiteReport {
    let started_at = chrono::Utc::now().to_rfc3339();
    let [title, exist, more, read, descending, manipulated] = check_names(config.test_count);
    let mut rec = Recorder { checks: Vec::new() };

    let t = Instant::now();
    let outcome = page_has_title(page, config).await;
    rec.record(SITE_GROUP, &title, t, outcome);

    let t = Instant::now();
    let outcome = articles_exist(page, config).await;
    rec.record(SITE_GROUP, &exist, t, outcome);

    let t = Instant::now();
    let outcome = more_link_works(page, config).await;
    rec.record(SITE_GROUP, &more, t, outcome);

    let order_group = format!("{} Articles In Descending Order", config.test_count);
    let mut ctx = SuiteContext::new(config);

    let t = Instant::now();
    let outcome = read_exact_articles(page, &mut ctx).await;
    let scraped = outcome.is_ok();
    rec.record(&order_group, &read, t, outcome);

    if scraped {
        let t = Instant::now();
        rec.record(&order_group, &descending, t, articles_descending(&ctx));

        let t = Instant::now();
        rec.record(
            &order_group,
            &manipulated,
            t,
            manipulated_order_detected(&ctx.articles),
        );
    } else {
        rec.skip(&order_group, &descending, "article scrape failed");
        rec.skip(&order_group, &manipulated, "article scrape failed");
    }

    SuiteReport {
        target_url: config.target_url.to_string(),
        test_count: config.test_count,
        started_at,
        finished_at: chrono::Utc::now().to_rfc3339(),
        articles_collected: ctx.articles.len(),
        checks: rec.checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(timestamps: &[i64]) -> Vec<Article> {
        timestamps
            .iter()
            .enumerate()
            .map(|(i, ts)| Article::new(i as u32 + 1, "x", *ts))
            .collect()
    }

    #[test]
    fn test_manipulation_does_not_touch_input() {
        let articles = articles(&[1_800_000_000, 1_799_999_963, 1_799_999_926]);
        let before = articles.clone();
        manipulated_order_detected(&articles).unwrap();
        assert_eq!(articles, before);
    }

    #[test]
    fn test_manipulation_with_old_listing() {
        // Older than the synthetic article; the inserted one must still be older.
        manipulated_order_detected(&articles(&[1_000, 900])).unwrap();
    }

    #[test]
    fn test_manipulation_when_oldest_is_one_second() {
        // The inserted article lands at 1, not 0, so the tail stays valid.
        manipulated_order_detected(&articles(&[2, 1])).unwrap();
    }

    #[test]
    fn test_manipulation_rejects_unordered_input() {
        let err = manipulated_order_detected(&articles(&[10, 20])).unwrap_err();
        assert!(err.to_string().contains("not descending"), "{}", err);
    }

    #[test]
    fn test_check_names_carry_the_count() {
        let names = check_names(25);
        assert_eq!(names[3], "Can read exactly 25 articles");
        assert_eq!(names[4], "The 25 articles are in descending order");
    }

    #[test]
    fn test_report_serializes_status_inline() {
        let result = CheckResult {
            group: SITE_GROUP.to_string(),
            name: "Page has title".to_string(),
            status: CheckStatus::Failed {
                reason: "nope".to_string(),
            },
            duration_ms: 3,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "nope");
    }
}
