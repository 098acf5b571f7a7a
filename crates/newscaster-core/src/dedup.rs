//! In-memory record of published entry links.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Links of every entry published during this process lifetime.
///
/// The set only grows. It survives controller restarts but is not persisted,
/// so a new process may re-publish entries still present in a feed.
#[derive(Debug, Default)]
pub struct PublishedSet {
    links: Mutex<HashSet<String>>,
}

impl PublishedSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    fn links(&self) -> MutexGuard<'_, HashSet<String>> {
        self.links.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns true if the link was already published.
    pub fn contains(&self, link: &str) -> bool {
        self.links().contains(link)
    }

    /// Records a published link. Returns false if it was already present.
    pub fn insert(&self, link: impl Into<String>) -> bool {
        self.links().insert(link.into())
    }

    /// Number of recorded links.
    pub fn len(&self) -> usize {
        self.links().len()
    }

    /// Returns true if nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.links().is_empty()
    }
}
