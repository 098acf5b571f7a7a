//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use newscaster_core::{
    Collaborators, EnhanceError, EnhancedText, Entry, FeedFetcher, FeedSource, FetchError,
    ImageRenderer, Pipeline, PublishError, Publisher, TextEnhancer,
};

/// Serves canned entries per URL; unknown URLs answer with HTTP 404.
#[derive(Default)]
pub struct MockFetcher {
    feeds: Mutex<HashMap<String, Vec<Entry>>>,
    panic_on: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(self, url: &str, entries: Vec<Entry>) -> Self {
        self.set_feed(url, entries);
        self
    }

    pub fn set_feed(&self, url: &str, entries: Vec<Entry>) {
        self.feeds.lock().unwrap().insert(url.to_string(), entries);
    }

    /// Panic when `url` is fetched.
    pub fn panic_on(self, url: &str) -> Self {
        *self.panic_on.lock().unwrap() = Some(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<Entry>, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let should_panic = self.panic_on.lock().unwrap().as_deref() == Some(url);
        if should_panic {
            panic!("feed parser exploded on {url}");
        }
        self.feeds
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(FetchError::Status(404))
    }
}

/// A delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: String,
    pub text: String,
    pub photo: bool,
}

/// Records deliveries; messages containing a configured marker fail.
#[derive(Default)]
pub struct RecordingPublisher {
    deliveries: Mutex<Vec<Delivery>>,
    fail_marker: Mutex<Option<String>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(self, marker: &str) -> Self {
        *self.fail_marker.lock().unwrap() = Some(marker.to_string());
        self
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }

    fn record(&self, channel: &str, text: &str, photo: bool) -> Result<(), PublishError> {
        if let Some(marker) = self.fail_marker.lock().unwrap().as_deref() {
            if text.contains(marker) {
                return Err(PublishError::Api("Bad Request: chat not found".to_string()));
            }
        }
        self.deliveries.lock().unwrap().push(Delivery {
            channel: channel.to_string(),
            text: text.to_string(),
            photo,
        });
        Ok(())
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish_photo(
        &self,
        channel: &str,
        _image: &Path,
        caption: &str,
    ) -> Result<(), PublishError> {
        self.record(channel, caption, true)
    }

    async fn publish_text(&self, channel: &str, text: &str) -> Result<(), PublishError> {
        self.record(channel, text, false)
    }
}

/// Always answers with the same rewrite.
pub struct FixedEnhancer(pub EnhancedText);

#[async_trait]
impl TextEnhancer for FixedEnhancer {
    async fn enhance(
        &self,
        _title: &str,
        _description: &str,
    ) -> Result<Option<EnhancedText>, EnhanceError> {
        Ok(Some(self.0.clone()))
    }
}

/// Takes `delay` to decide there is nothing to improve.
pub struct SlowEnhancer(pub Duration);

#[async_trait]
impl TextEnhancer for SlowEnhancer {
    async fn enhance(
        &self,
        _title: &str,
        _description: &str,
    ) -> Result<Option<EnhancedText>, EnhanceError> {
        tokio::time::sleep(self.0).await;
        Ok(None)
    }
}

/// Writes an empty image file per call into a temporary directory.
pub struct FileRenderer {
    dir: tempfile::TempDir,
    seq: AtomicUsize,
}

impl FileRenderer {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            seq: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageRenderer for FileRenderer {
    async fn render(&self, _title: &str) -> Option<PathBuf> {
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.path().join(format!("post_{n}.jpg"));
        std::fs::write(&path, b"jpeg").ok()?;
        Some(path)
    }
}

pub fn entry(n: usize) -> Entry {
    Entry::new(
        format!("https://news.example.com/{n}"),
        format!("Headline number {n}"),
    )
    .with_description(format!("Body of story {n}."))
}

/// Newest-first feed of entries `first..=last`.
pub fn feed(first: usize, last: usize) -> Vec<Entry> {
    (first..=last).rev().map(entry).collect()
}

pub fn pipeline(
    urls: &[&str],
    fetcher: Arc<MockFetcher>,
    publisher: Arc<RecordingPublisher>,
) -> Arc<Pipeline> {
    let sources = urls.iter().map(|url| FeedSource::new(*url)).collect();
    Arc::new(Pipeline::new(
        sources,
        "@test_channel",
        Collaborators::new(fetcher, publisher),
    ))
}

pub fn pipeline_with(urls: &[&str], collaborators: Collaborators) -> Arc<Pipeline> {
    let sources = urls.iter().map(|url| FeedSource::new(*url)).collect();
    Arc::new(Pipeline::new(sources, "@test_channel", collaborators))
}

/// Poll `condition` until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
