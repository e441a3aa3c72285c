//! Twitter/X API integration surface used by the reply and post jobs.
//!
//! Submodules provide the HTTP client wrapper, client-side extraction helpers,
//! and strongly typed request/response models.
pub mod client;
pub mod extract;
pub mod types;

pub use client::{TimelineQuery, TwitterApi};
