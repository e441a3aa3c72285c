//! Provider-agnostic text generation for autopost.
//!
//! This crate exposes a common [`traits::LlmClient`] interface whose
//! `generate` call never raises: blocks, empty answers and transport failures
//! come back as [`traits::GenerationResult`] variants for the caller to
//! inspect. [`gemini::GeminiClient`] is the concrete provider.
//!
//! # Examples
//! ```no_run
//! use autopost_llm::gemini::GeminiClient;
//! use autopost_llm::traits::{GenerationRequest, GenerationResult, LlmClient};
//!
//! # #[tokio::main]
//! # async fn main() -> autopost_common::Result<()> {
//! let client = GeminiClient::new(
//!     autopost_llm::gemini::GEMINI_BASE_URL,
//!     "api-key".to_string(),
//!     autopost_llm::DEFAULT_GEMINI_MODEL.to_string(),
//! )?;
//! let request = GenerationRequest::new("Say hello", 20);
//! if let GenerationResult::Text(text) = client.generate(&request).await {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod traits;

/// Default model for reply generation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
