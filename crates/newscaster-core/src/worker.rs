//! The poll-and-publish loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::WorkerConfig;
use crate::dedup::PublishedSet;
use crate::error::PublishError;
use crate::format::{FormattedPost, Formatter};
use crate::models::{Entry, FeedSource};
use crate::ports::{FeedFetcher, ImageRenderer, Publisher, TextEnhancer};
use crate::stats::StatsStore;

/// Driver implementations plugged into a [`Pipeline`].
#[derive(Clone)]
pub struct Collaborators {
    fetcher: Arc<dyn FeedFetcher>,
    publisher: Arc<dyn Publisher>,
    enhancer: Option<Arc<dyn TextEnhancer>>,
    renderer: Option<Arc<dyn ImageRenderer>>,
}

impl Collaborators {
    /// Fetcher and publisher are mandatory; enhancement and rendering are not.
    pub fn new(fetcher: Arc<dyn FeedFetcher>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            fetcher,
            publisher,
            enhancer: None,
            renderer: None,
        }
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn TextEnhancer>) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ImageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

/// Everything a worker needs, shared across controller activations.
///
/// The published set outlives restarts of the worker; the stats are reset
/// by the controller on every start.
pub struct Pipeline {
    sources: Vec<FeedSource>,
    channel: String,
    fetcher: Arc<dyn FeedFetcher>,
    publisher: Arc<dyn Publisher>,
    formatter: Formatter,
    enhancement_enabled: bool,
    stats: Arc<StatsStore>,
    published: PublishedSet,
}

impl Pipeline {
    /// Creates a pipeline publishing `sources` to `channel`.
    pub fn new(
        sources: Vec<FeedSource>,
        channel: impl Into<String>,
        collaborators: Collaborators,
    ) -> Self {
        let stats = Arc::new(StatsStore::new());
        let enhancement_enabled = collaborators.enhancer.is_some();
        let formatter = Formatter::new(
            collaborators.enhancer,
            collaborators.renderer,
            Arc::clone(&stats),
        );

        Self {
            sources,
            channel: channel.into(),
            fetcher: collaborators.fetcher,
            publisher: collaborators.publisher,
            formatter,
            enhancement_enabled,
            stats,
            published: PublishedSet::new(),
        }
    }

    pub fn sources(&self) -> &[FeedSource] {
        &self.sources
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn stats(&self) -> &StatsStore {
        &self.stats
    }

    pub fn published(&self) -> &PublishedSet {
        &self.published
    }

    /// Whether a text enhancer is plugged in.
    pub fn enhancement_enabled(&self) -> bool {
        self.enhancement_enabled
    }
}

/// One activation of the background loop.
pub struct FeedWorker {
    pipeline: Arc<Pipeline>,
    config: WorkerConfig,
    shutdown: watch::Receiver<bool>,
}

impl FeedWorker {
    /// Creates a worker that stops once `shutdown` carries `true`.
    pub fn new(
        pipeline: Arc<Pipeline>,
        config: WorkerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            pipeline,
            config,
            shutdown,
        }
    }

    /// Run cycles until the stop signal is set.
    pub async fn run(&mut self) {
        info!(
            sources = self.pipeline.sources.len(),
            check_interval_secs = self.config.check_interval.as_secs(),
            "Feed worker started"
        );

        while !self.is_stopped() {
            let outcome = AssertUnwindSafe(self.run_cycle()).catch_unwind().await;

            let delay = match outcome {
                Ok(()) => {
                    if self.is_stopped() {
                        break;
                    }
                    info!(
                        next_check_secs = self.config.check_interval.as_secs(),
                        "Cycle complete"
                    );
                    self.config.check_interval
                }
                Err(panic) => {
                    error!(
                        reason = panic_message(&*panic),
                        cooldown_secs = self.config.cooldown.as_secs(),
                        "Critical error in feed worker cycle"
                    );
                    self.pipeline.stats.record_error();
                    self.config.cooldown
                }
            };

            if !self.pause(delay).await {
                break;
            }
        }

        info!("Feed worker stopped");
    }

    /// A single sweep over every source.
    pub async fn run_cycle(&self) {
        self.pipeline.stats.mark_check();

        for source in &self.pipeline.sources {
            if self.is_stopped() {
                debug!("Stop requested, abandoning cycle");
                return;
            }
            self.process_source(source).await;
        }
    }

    async fn process_source(&self, source: &FeedSource) {
        let entries = match self.pipeline.fetcher.fetch(source.url()).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(source = %source, error = %e, "Failed to fetch feed");
                self.pipeline.stats.record_error();
                return;
            }
        };

        if entries.is_empty() {
            warn!(source = %source, "Feed returned no entries");
            return;
        }

        // Feeds list newest first; publish the window oldest first.
        let window: Vec<Entry> = entries
            .into_iter()
            .take(self.config.max_entries_per_source)
            .collect();

        for entry in window.iter().rev() {
            if self.is_stopped() {
                return;
            }
            self.process_entry(source, entry).await;
        }
    }

    async fn process_entry(&self, source: &FeedSource, entry: &Entry) {
        let Some(link) = entry.identifier() else {
            debug!(source = %source, "Skipping entry without link");
            return;
        };
        if self.pipeline.published.contains(link) {
            return;
        }

        let post = self.pipeline.formatter.format(entry).await;

        // Enhancement and rendering can outlast a stop request.
        if self.is_stopped() {
            debug!(source = %source, link, "Stop requested, dropping formatted entry");
            remove_image(&post).await;
            return;
        }

        let result = self.deliver(&post).await;
        remove_image(&post).await;

        match result {
            Ok(()) => {
                self.pipeline.published.insert(link);
                self.pipeline.stats.record_post();
                info!(source = %source, link, "Post published");
                tokio::time::sleep(self.config.post_delay).await;
            }
            Err(e) => {
                error!(source = %source, link, error = %e, "Failed to publish entry");
                self.pipeline.stats.record_error();
            }
        }
    }

    /// Photo with caption when an image exists, falling back to plain text.
    async fn deliver(&self, post: &FormattedPost) -> Result<(), PublishError> {
        let publisher = &self.pipeline.publisher;
        let channel = self.pipeline.channel.as_str();

        if let Some(image) = &post.image {
            match publisher.publish_photo(channel, image, &post.message).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(error = %e, "Photo publish failed, sending text only");
                }
            }
        }

        publisher.publish_text(channel, &post.message).await
    }

    /// Sleep for `duration` unless stopped first. Returns false on stop.
    async fn pause(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.shutdown.wait_for(|stop| *stop) => false,
        }
    }

    fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }
}

async fn remove_image(post: &FormattedPost) {
    if let Some(image) = &post.image {
        if let Err(e) = tokio::fs::remove_file(image).await {
            warn!(path = %image.display(), error = %e, "Failed to remove rendered image");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
