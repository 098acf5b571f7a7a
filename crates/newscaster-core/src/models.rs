//! Domain types passed between the worker and its collaborators.

use std::fmt;

/// A configured feed source. The list of sources is fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedSource {
    url: String,
}

impl FeedSource {
    /// Creates a source from its URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl From<&str> for FeedSource {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// A single item as returned by a feed.
///
/// `link` is the stable identifier used for de-duplication; entries without
/// one are never published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Link to the full article.
    pub link: Option<String>,
    /// Headline, possibly containing markup.
    pub title: Option<String>,
    /// Summary or body, possibly containing markup.
    pub description: Option<String>,
}

impl Entry {
    /// Creates an entry with a link and a title.
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            title: Some(title.into()),
            description: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The de-duplication key, if the entry has a non-blank link.
    pub fn identifier(&self) -> Option<&str> {
        self.link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}

/// Rewritten headline and body proposed by a text enhancer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedText {
    /// Proposed headline.
    pub title: String,
    /// Proposed body.
    pub description: String,
}

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// No worker is running.
    #[default]
    Stopped,
    /// A worker is polling and publishing.
    Running,
}

impl ControllerState {
    /// Returns true for [`ControllerState::Running`].
    pub fn is_running(self) -> bool {
        matches!(self, ControllerState::Running)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::Stopped => f.write_str("stopped"),
            ControllerState::Running => f.write_str("running"),
        }
    }
}
