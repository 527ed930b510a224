//! Read-only view over one rendered listing page.
//!
//! `scraper::Html` is not `Send`, so the document keeps the raw markup and
//! parses it inside each call. Nothing parsed outlives the call, which keeps
//! drivers usable across `.await` points.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

use crate::core::config::Locators;
use crate::types::ListingItem;

#[derive(Debug, Clone)]
pub struct ListingDocument {
    url: String,
    html: String,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {}", css, e))
}

fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_ws(&el.text().collect::<Vec<_>>().join(" "))
}

impl ListingDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Contents of `<title>`, whitespace-collapsed.
    pub fn title(&self) -> String {
        let doc = self.parse();
        let Ok(sel) = selector("title") else {
            return String::new();
        };
        doc.select(&sel).next().map(element_text).unwrap_or_default()
    }

    pub fn count_of(&self, css: &str) -> Result<usize> {
        let sel = selector(css)?;
        Ok(self.parse().select(&sel).count())
    }

    pub fn contains(&self, css: &str) -> Result<bool> {
        Ok(self.count_of(css)? > 0)
    }

    /// Text of the `index`-th match, `None` when there are fewer matches.
    pub fn read_text(&self, css: &str, index: usize) -> Result<Option<String>> {
        let sel = selector(css)?;
        Ok(self.parse().select(&sel).nth(index).map(element_text))
    }

    /// Attribute of the `index`-th match.
    pub fn read_attribute(&self, css: &str, index: usize, name: &str) -> Result<Option<String>> {
        let sel = selector(css)?;
        Ok(self
            .parse()
            .select(&sel)
            .nth(index)
            .and_then(|el| el.value().attr(name).map(str::to_string)))
    }

    /// Raw `href` of the pagination link.
    pub fn more_href(&self, locators: &Locators) -> Result<Option<String>> {
        self.read_attribute(&locators.more, 0, "href")
    }

    /// Every article row, in display order.
    ///
    /// The timestamp lives in the metadata row that follows each article row,
    /// so the age element is looked up in the next sibling `<tr>`.
    pub fn listing_items(&self, locators: &Locators) -> Result<Vec<ListingItem>> {
        let sel_article = selector(&locators.article)?;
        let sel_rank = selector(&locators.rank)?;
        let sel_title = selector(&locators.title)?;
        let sel_age = selector(&locators.age)?;

        let doc = self.parse();
        let items = doc
            .select(&sel_article)
            .map(|row| {
                let rank = row.select(&sel_rank).next().map(element_text).unwrap_or_default();
                let title = row.select(&sel_title).next().map(element_text).unwrap_or_default();
                let age = row
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name() == "tr")
                    .and_then(|meta| meta.select(&sel_age).next())
                    .and_then(|age| age.value().attr(&locators.age_attribute))
                    .map(str::to_string);
                ListingItem { rank, title, age }
            })
            .collect();
        Ok(items)
    }
}
