use serde::{Deserialize, Serialize};

/// Unix timestamp of an article, as read from the listing.
///
/// The scraper never produces `Unparsed`, but validation input can come from
/// anywhere, so the raw text is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timestamp {
    Unix(i64),
    Unparsed(String),
}

impl Timestamp {
    /// Parse an age attribute such as `"2024-05-01T12:00:00 1714564800"`.
    ///
    /// The Unix seconds are the second whitespace-separated token.
    pub fn from_age_attribute(raw: &str) -> Self {
        match raw.split_whitespace().nth(1).map(str::parse::<i64>) {
            Some(Ok(secs)) if secs > 0 => Timestamp::Unix(secs),
            _ => Timestamp::Unparsed(raw.to_string()),
        }
    }

    /// Seconds since epoch, only when usable for comparison (parsed and > 0).
    pub fn as_unix(&self) -> Option<i64> {
        match self {
            Timestamp::Unix(secs) if *secs > 0 => Some(*secs),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.as_unix().is_some()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timestamp::Unix(secs) => write!(f, "{}", secs),
            Timestamp::Unparsed(raw) => write!(f, "{:?} (unparsed)", raw),
        }
    }
}

/// One scraped listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Rank shown on the page at scrape time. Not used for ordering.
    pub observed_order: u32,
    pub title: String,
    pub timestamp: Timestamp,
}

impl Article {
    pub fn new(observed_order: u32, title: impl Into<String>, unix_secs: i64) -> Self {
        Self {
            observed_order,
            title: title.into(),
            timestamp: Timestamp::Unix(unix_secs),
        }
    }
}

/// Raw ranked row as found on a listing page, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingItem {
    pub rank: String,
    pub title: String,
    /// Age attribute of the row's metadata line; `None` when missing.
    pub age: Option<String>,
}
