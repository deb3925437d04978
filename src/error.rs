//! Error types for fetching, parsing, and exporting headlines.
//!
//! Each source runs behind its own error boundary: [`FetchError`] and
//! [`ParseError`] are caught per source and turned into a
//! [`SourceOutcome::Failed`](crate::models::SourceOutcome) entry, while
//! [`ValidationError`] never leaves the extractor (invalid elements are
//! skipped). The crate-level [`Error`] covers the surfaces around the
//! pipeline: configuration, exports, and the CLI.

use thiserror::Error;

/// A source page could not be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is disallowed by robots.txt")]
    RobotsDisallowed { url: String },

    #[error("robots.txt for {url} could not be read: {reason}")]
    RobotsUnavailable { url: String, reason: String },
}

impl FetchError {
    /// Whether retrying the same request has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } => true,
            FetchError::Network { source, .. } => source.is_connect() || source.is_request(),
            FetchError::Status { status, .. } => is_retryable_status(*status),
            FetchError::RobotsDisallowed { .. } | FetchError::RobotsUnavailable { .. } => false,
        }
    }
}

/// Statuses worth a second attempt: rate limiting and gateway hiccups.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// The page did not match the source's selection rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no elements matched `{selector}` (page layout may have changed)")]
    NoMatches { selector: String },
}

/// Why a single matched element was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("element has no title text")]
    EmptyTitle,

    #[error("element has no link")]
    MissingHref,

    #[error("link `{href}` cannot be resolved to an http(s) URL")]
    UnresolvableUrl { href: String },
}

/// Crate-level error for configuration, exports, and client setup.
///
/// Per-source fetch and parse failures pass through here only on
/// [`HeadlineExtractor::extract_source`](crate::HeadlineExtractor::extract_source);
/// full runs report them in the returned report instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result alias over the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
