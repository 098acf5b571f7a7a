//! Collaborator traits consumed by the worker.
//!
//! Each trait is implemented by a driver crate (`newscaster-feeds`,
//! `newscaster-yandex`, `newscaster-render`, `newscaster-telegram`) and by
//! in-memory mocks in tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{EnhanceError, FetchError, PublishError};
use crate::models::{EnhancedText, Entry};

/// Fetches the current entries of a feed.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch entries in the order the source lists them (newest first for
    /// typical RSS). An empty feed is `Ok(vec![])`, not an error.
    async fn fetch(&self, url: &str) -> Result<Vec<Entry>, FetchError>;
}

/// Rewrites a headline and body with a language model.
#[async_trait]
pub trait TextEnhancer: Send + Sync {
    /// Returns `Ok(None)` when no enhancement is available for this input.
    /// Errors are never fatal to publishing; the caller keeps the original.
    async fn enhance(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Option<EnhancedText>, EnhanceError>;
}

/// Renders a headline onto an image file.
#[async_trait]
pub trait ImageRenderer: Send + Sync {
    /// Returns the path of the produced file, or `None` on any failure.
    /// The caller owns the file and deletes it after use.
    async fn render(&self, title: &str) -> Option<PathBuf>;
}

/// Delivers formatted posts to a channel.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send an image with an HTML caption.
    async fn publish_photo(
        &self,
        channel: &str,
        image: &Path,
        caption: &str,
    ) -> Result<(), PublishError>;

    /// Send an HTML text message.
    async fn publish_text(&self, channel: &str, text: &str) -> Result<(), PublishError>;
}
