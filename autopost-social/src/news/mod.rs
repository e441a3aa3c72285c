//! NewsAPI (`newsapi.org`) client used by the digest job.
pub mod client;
pub mod types;

pub use client::{NewsApi, NewsQuery};
