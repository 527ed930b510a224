use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::error::ConfigError;

pub const DEFAULT_TARGET_URL: &str = "https://news.ycombinator.com/newest";
pub const DEFAULT_TEST_COUNT: usize = 100;
pub const DEFAULT_TITLE_KEYWORD: &str = "Hacker News";
pub const DEFAULT_SCREENSHOTS_DIR: &str = "screenshots";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SETTLE_QUIET_MS: u64 = 300;
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 5000;

pub const ENV_TARGET_URL: &str = "TARGET_URL";
pub const ENV_TEST_COUNT: &str = "TEST_COUNT";
pub const ENV_TITLE_KEYWORD: &str = "TITLE_KEYWORD";
pub const ENV_DRIVER: &str = "NEWEST_ORDER_DRIVER";
pub const ENV_SCREENSHOTS: &str = "NEWEST_ORDER_SCREENSHOTS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_CONFIG_PATH: &str = "NEWEST_ORDER_CONFIG";

/// CSS selectors used to read the listing.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Locators {
    /// One row per article.
    pub article: String,
    /// Rank cell inside an article row.
    pub rank: String,
    /// Title link inside an article row; the first match is used.
    pub title: String,
    /// Element in the row's following sibling carrying the timestamp.
    pub age: String,
    pub age_attribute: String,
    /// The "More" pagination link.
    pub more: String,
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            article: ".submission".to_string(),
            rank: ".rank".to_string(),
            title: ".titleline > a".to_string(),
            age: "span.age".to_string(),
            age_attribute: "title".to_string(),
            more: ".morelink".to_string(),
        }
    }
}

impl Locators {
    fn validate(&self) -> Result<(), ConfigError> {
        for selector in [&self.article, &self.rank, &self.title, &self.age, &self.more] {
            scraper::Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
                selector: selector.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Driver {
    /// Headless Chromium over CDP.
    Browser,
    /// Plain HTTP fetches; "More" is followed by its href.
    Http,
}

impl std::str::FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" | "chrome" | "cdp" => Ok(Driver::Browser),
            "http" => Ok(Driver::Http),
            other => Err(ConfigError::UnknownDriver(other.to_string())),
        }
    }
}

/// Contents of `newest-order.json`. Every field is optional.
#[derive(Deserialize, Default, Clone, Debug)]
pub struct FileConfig {
    pub target_url: Option<String>,
    pub test_count: Option<usize>,
    pub title_keyword: Option<String>,
    pub driver: Option<String>,
    /// Empty string disables screenshots.
    pub screenshots_dir: Option<String>,
    pub http_timeout_secs: Option<u64>,
    /// Browser driver: how long the resource count must stay flat.
    pub settle_quiet_ms: Option<u64>,
    /// Browser driver: upper bound on waiting for a page to settle.
    pub settle_timeout_ms: Option<u64>,
    #[serde(default)]
    pub locators: Locators,
}

/// How long the browser driver waits for a page to go idle after navigating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSettle {
    pub quiet: Duration,
    pub timeout: Duration,
}

impl Default for PageSettle {
    fn default() -> Self {
        Self {
            quiet: Duration::from_millis(DEFAULT_SETTLE_QUIET_MS),
            timeout: Duration::from_millis(DEFAULT_SETTLE_TIMEOUT_MS),
        }
    }
}

/// Values given on the command line; they win over env and file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub target_url: Option<String>,
    pub test_count: Option<usize>,
    pub title_keyword: Option<String>,
    pub driver: Option<String>,
    pub screenshots_dir: Option<String>,
    pub no_screenshots: bool,
}

/// Fully resolved and validated run configuration.
#[derive(Clone, Debug)]
pub struct SuiteConfig {
    pub target_url: Url,
    pub test_count: usize,
    pub title_keyword: Regex,
    pub driver: Driver,
    pub screenshots_dir: Option<PathBuf>,
    pub http_timeout: Duration,
    pub page_settle: PageSettle,
    pub locators: Locators,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self::resolve(&FileConfig::default(), &ConfigOverrides::default(), |_| None)
            .unwrap_or_else(|e| unreachable!("built-in defaults are valid: {e}"))
    }
}

impl SuiteConfig {
    /// Resolve against the process environment.
    pub fn from_env(file: &FileConfig, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve(file, overrides, |key| std::env::var(key).ok())
    }

    /// Per field: override → env → file → default.
    pub fn resolve(
        file: &FileConfig,
        overrides: &ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw_env = |key: &str| env(key);
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let target_url = overrides
            .target_url
            .clone()
            .or_else(|| env(ENV_TARGET_URL))
            .or_else(|| file.target_url.clone())
            .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string());
        let target_url = Url::parse(target_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            url: target_url.clone(),
            source,
        })?;

        let env_count = env(ENV_TEST_COUNT)
            .map(|v| {
                v.trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidCount(v.clone()))
            })
            .transpose()?;
        let test_count = overrides
            .test_count
            .or(env_count)
            .or(file.test_count)
            .unwrap_or(DEFAULT_TEST_COUNT);
        if test_count == 0 {
            return Err(ConfigError::ZeroCount);
        }

        let pattern = overrides
            .title_keyword
            .clone()
            .or_else(|| env(ENV_TITLE_KEYWORD))
            .or_else(|| file.title_keyword.clone())
            .unwrap_or_else(|| DEFAULT_TITLE_KEYWORD.to_string());
        let title_keyword =
            Regex::new(&pattern).map_err(|source| ConfigError::InvalidTitlePattern {
                pattern: pattern.clone(),
                source,
            })?;

        let driver = match overrides
            .driver
            .clone()
            .or_else(|| env(ENV_DRIVER))
            .or_else(|| file.driver.clone())
        {
            Some(d) => d.parse()?,
            None => Driver::Browser,
        };

        let screenshots_dir = if overrides.no_screenshots {
            None
        } else {
            // An explicitly empty value (env or file) disables screenshots.
            let dir = overrides
                .screenshots_dir
                .clone()
                .or_else(|| raw_env(ENV_SCREENSHOTS))
                .or_else(|| file.screenshots_dir.clone())
                .unwrap_or_else(|| DEFAULT_SCREENSHOTS_DIR.to_string());
            let dir = dir.trim();
            (!dir.is_empty()).then(|| PathBuf::from(dir))
        };

        let env_timeout = env(ENV_HTTP_TIMEOUT_SECS)
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout(v.clone()))
            })
            .transpose()?;
        let http_timeout_secs = env_timeout
            .or(file.http_timeout_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if http_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(http_timeout_secs.to_string()));
        }

        let defaults = PageSettle::default();
        let page_settle = PageSettle {
            quiet: file
                .settle_quiet_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.quiet),
            timeout: file
                .settle_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
        };

        file.locators.validate()?;

        Ok(Self {
            target_url,
            test_count,
            title_keyword,
            driver,
            screenshots_dir,
            http_timeout: Duration::from_secs(http_timeout_secs),
            page_settle,
            locators: file.locators.clone(),
        })
    }
}

/// Load `newest-order.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `NEWEST_ORDER_CONFIG` env var path
/// 2. `./newest-order.json`
/// 3. an explicit `path`, when given, replaces both
///
/// Missing file → `FileConfig::default()`.
/// Parse error → log a warning, return `FileConfig::default()`.
pub fn load_file_config(path: Option<&std::path::Path>) -> FileConfig {
    let candidates: Vec<PathBuf> = match path {
        Some(p) => vec![p.to_path_buf()],
        None => {
            let mut v = vec![PathBuf::from("newest-order.json")];
            if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
                v.insert(0, PathBuf::from(env_path));
            }
            v
        }
    };

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        match serde_json::from_str::<FileConfig>(&contents) {
            Ok(cfg) => {
                tracing::info!("config loaded from {}", path.display());
                return cfg;
            }
            Err(e) => {
                tracing::warn!(
                    "config parse error at {}: {}, using defaults",
                    path.display(),
                    e
                );
                return FileConfig::default();
            }
        }
    }

    FileConfig::default()
}
