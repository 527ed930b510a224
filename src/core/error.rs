use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("target article count must be positive")]
    InvalidTarget,

    #[error("malformed rank {raw:?}: expected a positive integer")]
    MalformedRank { raw: String },

    #[error("article at rank {rank} has an empty title")]
    EmptyTitle { rank: u32 },

    #[error("article at rank {rank} has a malformed timestamp: {raw:?}")]
    MalformedTimestamp { rank: u32, raw: Option<String> },

    #[error("listing exhausted after {collected} of {target} articles")]
    IncompleteCollection { collected: usize, target: usize },

    #[error("page driver error: {0}")]
    Driver(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("test count must be positive")]
    ZeroCount,

    #[error("invalid test count {0:?}: expected a positive integer")]
    InvalidCount(String),

    #[error("invalid http timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("invalid title keyword pattern {pattern:?}: {source}")]
    InvalidTitlePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("unknown driver {0:?} (expected \"browser\" or \"http\")")]
    UnknownDriver(String),

    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}
