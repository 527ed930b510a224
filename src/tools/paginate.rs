//! Collect exactly N articles from a paginated listing.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::error::ScrapeError;
use crate::types::{Article, ListingItem, Timestamp};

/// A listing that can be read one page at a time.
#[async_trait]
pub trait PageSource: Send {
    /// Ranked items visible on the current page, in display order.
    async fn current_items(&mut self) -> Result<Vec<ListingItem>, ScrapeError>;

    /// Move to the next page. `Ok(false)` when there is none.
    async fn next_page(&mut self) -> Result<bool, ScrapeError>;

    /// Called once a page has been consumed (1-based).
    async fn page_scraped(&mut self, _page: usize) -> Result<(), ScrapeError> {
        Ok(())
    }
}

/// Parse a displayed rank such as `"17."` into a positive integer.
pub fn parse_rank(raw: &str) -> Result<u32, ScrapeError> {
    let trimmed = raw.trim().trim_end_matches('.');
    match trimmed.parse::<u32>() {
        Ok(rank) if rank > 0 => Ok(rank),
        _ => Err(ScrapeError::MalformedRank {
            raw: raw.to_string(),
        }),
    }
}

/// Validate one raw row into an [`Article`], failing fast on bad fields.
pub fn article_from_item(item: &ListingItem) -> Result<Article, ScrapeError> {
    let rank = parse_rank(&item.rank)?;

    let title = item.title.trim();
    if title.is_empty() {
        return Err(ScrapeError::EmptyTitle { rank });
    }

    let timestamp = item
        .age
        .as_deref()
        .map(Timestamp::from_age_attribute)
        .filter(Timestamp::is_valid)
        .ok_or_else(|| ScrapeError::MalformedTimestamp {
            rank,
            raw: item.age.clone(),
        })?;

    Ok(Article {
        observed_order: rank,
        title: title.to_string(),
        timestamp,
    })
}

/// Pages needed for `target` items when a page holds `per_page` items.
///
/// Advisory only: the last rank on the first page may not reflect how many
/// items later pages carry.
pub fn estimate_pages(target: usize, per_page: u32) -> usize {
    let per_page = per_page.max(1) as usize;
    target.div_ceil(per_page)
}

/// Pull pages from `source` until exactly `target` articles are collected.
///
/// Stops appending mid-page once `target` is reached and never advances past
/// that page. Returns `IncompleteCollection` when the listing runs out first.
pub async fn collect_articles<S>(source: &mut S, target: usize) -> Result<Vec<Article>, ScrapeError>
where
    S: PageSource + ?Sized,
{
    if target == 0 {
        return Err(ScrapeError::InvalidTarget);
    }

    let mut articles: Vec<Article> = Vec::with_capacity(target);
    let mut estimate: Option<usize> = None;
    let mut page = 1usize;

    loop {
        let items = source.current_items().await?;
        if items.is_empty() {
            warn!("page {} has no ranked items", page);
            return Err(ScrapeError::IncompleteCollection {
                collected: articles.len(),
                target,
            });
        }

        if page == 1 {
            estimate = match items.last().map(|i| parse_rank(&i.rank)) {
                Some(Ok(last)) => {
                    let pages = estimate_pages(target, last);
                    info!(
                        "first page ends at rank {}; expecting about {} page(s) for {} articles",
                        last, pages, target
                    );
                    Some(pages)
                }
                _ => {
                    warn!("cannot estimate page count: last rank on first page is unreadable");
                    None
                }
            };
        }

        for item in &items {
            if articles.len() >= target {
                break;
            }
            articles.push(article_from_item(item)?);
        }
        debug!("page {}: {} article(s) collected", page, articles.len());

        source.page_scraped(page).await?;

        if articles.len() == target {
            info!("collected {} articles over {} page(s)", target, page);
            return Ok(articles);
        }

        if estimate.is_some_and(|pages| page >= pages) {
            warn!(
                "page estimate exceeded at page {} with {}/{} articles; continuing",
                page,
                articles.len(),
                target
            );
        }

        if !source.next_page().await? {
            return Err(ScrapeError::IncompleteCollection {
                collected: articles.len(),
                target,
            });
        }
        page += 1;
    }
}
