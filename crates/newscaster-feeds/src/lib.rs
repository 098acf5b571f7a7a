//! Newscaster Feeds - RSS/Atom fetching over HTTP.
//!
//! [`FeedClient`] implements the core [`FeedFetcher`](newscaster_core::FeedFetcher)
//! port with `reqwest` for transport and `feed-rs` for parsing.

pub mod client;
pub mod parse;

pub use client::{FeedClient, MAX_FEED_SIZE};
pub use parse::parse_entries;
