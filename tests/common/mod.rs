#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use newest_order::config::Locators;
use newest_order::{ListingDocument, ListingPage};

pub fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// HN-style listing markup: article row (with a site link inside the title
/// cell), metadata row, spacer, then an optional "More" link.
pub fn listing_html(first_rank: u32, timestamps: &[i64], more_href: Option<&str>) -> String {
    let mut rows = String::new();
    for (i, ts) in timestamps.iter().enumerate() {
        let rank = first_rank + i as u32;
        rows.push_str(&format!(
            r#"<tr class="athing submission" id="{rank}">
<td class="title"><span class="rank">{rank}.</span></td>
<td class="title"><span class="titleline"><a href="https://example.org/{rank}">Show HN: thing {rank}</a><span class="sitebit comhead"> (<a href="from?site=example.org"><span class="sitestr">example.org</span></a>)</span></span></td>
</tr>
<tr><td colspan="2"></td><td class="subtext"><span class="age" title="2027-03-01T08:00:00 {ts}"><a href="item?id={rank}">just now</a></span></td></tr>
<tr class="spacer"></tr>
"#
        ));
    }
    if let Some(href) = more_href {
        rows.push_str(&format!(
            r#"<tr><td colspan="2"></td><td class="title"><a href="{href}" class="morelink" rel="next">More</a></td></tr>"#
        ));
    }
    format!("<html><head><title>New Links | Hacker News</title></head><body><table>{rows}</table></body></html>")
}

/// In-memory site: page `i` lives at `{base}?p={i}` (page 0 at `base`).
pub struct StaticSite {
    pub base: String,
    pages: Vec<String>,
    current: Option<ListingDocument>,
    pub clicks: usize,
}

impl StaticSite {
    pub fn new(base: &str, timestamps: &[i64], per_page: usize) -> Self {
        let chunks: Vec<&[i64]> = timestamps.chunks(per_page).collect();
        let pages = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let more = (i + 1 < chunks.len()).then(|| format!("?p={}", i + 1));
                listing_html((i * per_page) as u32 + 1, chunk, more.as_deref())
            })
            .collect();
        Self {
            base: base.to_string(),
            pages,
            current: None,
            clicks: 0,
        }
    }

    fn page_index(&self, url: &str) -> Option<usize> {
        if url == self.base {
            return Some(0);
        }
        url.strip_prefix(&format!("{}?p=", self.base))?.parse().ok()
    }
}

#[async_trait]
impl ListingPage for StaticSite {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let index = self
            .page_index(url)
            .filter(|i| *i < self.pages.len())
            .ok_or_else(|| anyhow!("404 {}", url))?;
        self.current = Some(ListingDocument::new(url, self.pages[index].clone()));
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<ListingDocument> {
        self.current.clone().ok_or_else(|| anyhow!("nothing loaded"))
    }

    async fn click_more(&mut self, locators: &Locators) -> Result<()> {
        let doc = self.snapshot().await?;
        let href = doc
            .more_href(locators)?
            .ok_or_else(|| anyhow!("no pagination link"))?;
        let next = newest_order::scraping::http::resolve_href(doc.url(), &href)?;
        self.clicks += 1;
        self.navigate(&next).await
    }
}

/// Strictly falling timestamps, one minute apart.
pub fn falling(n: usize) -> Vec<i64> {
    (0..n as i64).map(|i| 1_800_000_000 - i * 60).collect()
}
