//! Chronological order checks over scraped articles.
//!
//! A listing is "descending" when every article's Unix timestamp is greater
//! than or equal to the next one. Ties are allowed. Any article without a
//! usable timestamp makes the whole sequence unordered.

use serde::Serialize;

use crate::types::{Article, Timestamp};

/// First reason a sequence is not in descending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderViolation {
    InvalidTimestamp {
        index: usize,
        observed_order: u32,
        raw: Timestamp,
    },
    OutOfOrder {
        index: usize,
        earlier: i64,
        later: i64,
    },
}

impl std::fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderViolation::InvalidTimestamp {
                index,
                observed_order,
                raw,
            } => write!(
                f,
                "article #{} (rank {}) has no usable timestamp: {}",
                index, observed_order, raw
            ),
            OrderViolation::OutOfOrder {
                index,
                earlier,
                later,
            } => write!(
                f,
                "article #{} ({}) is older than article #{} ({})",
                index,
                earlier,
                index + 1,
                later
            ),
        }
    }
}

/// Scan adjacent pairs and return the first violation, if any.
///
/// Every element is checked for a valid timestamp, the last one included.
pub fn first_violation(articles: &[Article]) -> Option<OrderViolation> {
    let invalid = |index: usize, article: &Article| OrderViolation::InvalidTimestamp {
        index,
        observed_order: article.observed_order,
        raw: article.timestamp.clone(),
    };

    for (index, pair) in articles.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        let Some(earlier) = current.timestamp.as_unix() else {
            return Some(invalid(index, current));
        };
        let Some(later) = next.timestamp.as_unix() else {
            return Some(invalid(index + 1, next));
        };
        if earlier < later {
            return Some(OrderViolation::OutOfOrder {
                index,
                earlier,
                later,
            });
        }
    }

    // windows(2) yields nothing for a single element
    match articles {
        [only] if !only.timestamp.is_valid() => Some(invalid(0, only)),
        _ => None,
    }
}

/// `true` when timestamps are non-increasing and all valid.
pub fn is_descending(articles: &[Article]) -> bool {
    first_violation(articles).is_none()
}
