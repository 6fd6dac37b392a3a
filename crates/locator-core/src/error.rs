// crates/locator-core/src/error.rs
//! Error types for locator-core operations.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LocatorError>;

/// Errors surfaced by loaders, configuration and engine construction.
///
/// Matching, ranking and recents bookkeeping never fail: malformed input is
/// skipped and persistence problems are logged instead of returned.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Underlying file-system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON payload could not be parsed or written.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A requested resource (file, dataset) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input was syntactically valid but semantically unusable.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The search engine needs a tokio runtime to schedule debounce commits.
    #[error("no tokio runtime available: {0}")]
    NoRuntime(String),
}
