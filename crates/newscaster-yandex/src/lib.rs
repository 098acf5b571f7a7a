//! Newscaster YandexGPT - headline and body rewriting.
//!
//! [`YandexGpt`] implements the core [`TextEnhancer`](newscaster_core::TextEnhancer)
//! port against the Foundation Models completion endpoint.

pub mod client;
pub mod prompt;
pub mod protocol;

pub use client::{YandexGpt, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use prompt::{build_prompt, parse_proposal};
