pub mod core;
pub mod scraping;
pub mod tools;

// --- Primary core exports ---
pub use crate::core::config;
pub use crate::core::error::{ConfigError, ScrapeError};
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::SuiteConfig;

pub use scraping::{BrowserListing, HttpListing, ListingDocument, ListingPage, ListingSource};
pub use tools::{collect_articles, first_violation, is_descending, run_suite, PageSource};
pub use tools::{order, paginate, suite};
