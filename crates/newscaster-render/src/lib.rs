//! Newscaster Render - headline images for posts.
//!
//! [`TitleRenderer`] implements the core
//! [`ImageRenderer`](newscaster_core::ImageRenderer) port: a random
//! background template (or a plain canvas) with the headline centered in
//! outlined white text, saved as a JPEG.

pub mod error;
pub mod layout;
pub mod renderer;

pub use error::{RenderError, Result};
pub use renderer::{RenderConfig, TitleRenderer, DEFAULT_CANVAS};
