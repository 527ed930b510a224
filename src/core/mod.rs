pub mod config;
pub mod error;
pub mod types;

pub use config::{Locators, SuiteConfig};
pub use error::{ConfigError, ScrapeError};
