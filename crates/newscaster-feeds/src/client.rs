//! HTTP feed client.

use std::time::Duration;

use async_trait::async_trait;
use newscaster_core::{Entry, FeedFetcher, FetchError};
use reqwest::Client;
use tracing::debug;

use crate::parse::parse_entries;

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for feed fetching.
const USER_AGENT: &str = concat!("Newscaster/", env!("CARGO_PKG_VERSION"), " (RSS Reader)");

/// Largest feed body accepted, in bytes.
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// Fetches feeds over HTTP(S) with timeouts and a size limit.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    max_size: u64,
}

impl FeedClient {
    /// Create a client with default limits.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_size: MAX_FEED_SIZE,
        })
    }

    /// Override the body size limit.
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size {
                return Err(FetchError::TooLarge {
                    size: content_length,
                    max: self.max_size,
                });
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_size {
            return Err(FetchError::TooLarge {
                size: bytes.len() as u64,
                max: self.max_size,
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FeedFetcher for FeedClient {
    async fn fetch(&self, url: &str) -> Result<Vec<Entry>, FetchError> {
        let bytes = self.download(url).await?;
        let entries = parse_entries(&bytes)?;
        debug!(url, entries = entries.len(), "Feed fetched");
        Ok(entries)
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(url: &str) -> Result<(), FetchError> {
    let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(FetchError::InvalidUrl(format!(
            "unsupported URL scheme: {}",
            scheme
        ))),
    }
}
