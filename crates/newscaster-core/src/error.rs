//! Error types shared by the core and the driver crates.
//!
//! Each port has its own error enum so the worker can tell the failure
//! classes apart when logging and counting.

use thiserror::Error;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("environment variable {0} is required but not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("environment variable {name} has invalid value {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value as found in the environment.
        value: String,
    },
}

/// Errors raised by a [`FeedFetcher`](crate::ports::FeedFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source URL is malformed or uses an unsupported scheme.
    #[error("invalid feed URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The feed body exceeds the configured limit.
    #[error("feed too large: {size} bytes (max {max} bytes)")]
    TooLarge {
        /// Actual or announced body size.
        size: u64,
        /// Configured maximum.
        max: u64,
    },

    /// The body is not a valid RSS/Atom document.
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

/// Errors raised by a [`TextEnhancer`](crate::ports::TextEnhancer).
#[derive(Debug, Error)]
pub enum EnhanceError {
    /// The request never produced a response.
    #[error("enhancement request failed: {0}")]
    Request(String),

    /// The provider rejected the request.
    #[error("enhancement API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response could not be interpreted.
    #[error("failed to parse enhancement response: {0}")]
    Parse(String),
}

/// Errors raised by a [`Publisher`](crate::ports::Publisher).
#[derive(Debug, Error)]
pub enum PublishError {
    /// The messaging API refused or failed the request.
    #[error("publish failed: {0}")]
    Api(String),

    /// A local file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
