//! Newscaster Core - the polling-and-publish engine.
//!
//! This crate owns everything with state-machine or concurrency character:
//!
//! - **controller**: start/stop/restart lifecycle of the background worker
//! - **worker**: the poll-and-publish cycle with per-source/per-entry isolation
//! - **format**: tag stripping, optional LLM enhancement, message composition
//! - **dedup**: the set of already-published entry links
//! - **stats**: running counters shown to the operator
//! - **ports**: the traits implemented by the driver crates (feeds, LLM,
//!   image rendering, publishing)
//! - **config**: environment-driven settings and state paths
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use newscaster_core::{Collaborators, Controller, FeedSource, Pipeline, WorkerConfig};
//!
//! let collaborators = Collaborators::new(fetcher, publisher)
//!     .with_enhancer(enhancer)
//!     .with_renderer(renderer);
//! let pipeline = Pipeline::new(
//!     vec![FeedSource::new("https://example.com/rss")],
//!     "@my_channel",
//!     collaborators,
//! );
//! let controller = Controller::new(Arc::new(pipeline), WorkerConfig::default());
//!
//! controller.start().await;
//! // ...
//! controller.stop().await;
//! ```

pub mod config;
pub mod controller;
pub mod dedup;
pub mod error;
pub mod format;
pub mod models;
pub mod ports;
pub mod stats;
pub mod worker;

pub use config::{Settings, WorkerConfig};
pub use controller::Controller;
pub use dedup::PublishedSet;
pub use error::{ConfigError, EnhanceError, FetchError, PublishError};
pub use format::{html_escape, strip_tags, truncate_chars, FormattedPost, Formatter};
pub use models::{ControllerState, EnhancedText, Entry, FeedSource};
pub use ports::{FeedFetcher, ImageRenderer, Publisher, TextEnhancer};
pub use stats::{RunStats, StatsStore};
pub use worker::{Collaborators, FeedWorker, Pipeline};
