//! Read/write clients for the services the jobs talk to.
//!
//! `twitter` covers the X v2 endpoints (who am I, home timeline, create post)
//! signed with OAuth 1.0a user context. `news` covers the NewsAPI
//! `everything` search. Both decode responses into typed records here so the
//! pipeline never handles raw JSON.
pub mod news;
pub mod twitter;
