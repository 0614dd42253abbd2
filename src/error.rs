//! Error taxonomy.
//!
//! Each component owns one enum and returns it from its fallible operations.
//! The bot is the only place that turns these into user-visible notices.

use thiserror::Error;

/// A song URL that must not be fetched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing address")]
    Empty,
    #[error("unsupported protocol")]
    Scheme,
    #[error("malformed address")]
    Malformed,
    #[error("restricted address: {0}")]
    Blocked(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog endpoint not configured")]
    NotConfigured,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty result")]
    Empty,
    #[error("http client closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("content length unknown")]
    UnknownLength,
    #[error("empty body")]
    EmptyBody,
    #[error("file too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http client closed")]
    Closed,
}

impl FetchError {
    /// Size violations are reported to the user differently from transport failures.
    pub fn is_size_limit(&self) -> bool {
        matches!(self, FetchError::TooLarge { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no pending search")]
    NotFound,
    #[error("search session expired")]
    Expired,
    #[error("selection {} out of range (1-{len})", .index.saturating_add(1))]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
