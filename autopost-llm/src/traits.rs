use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single prompt plus the knobs the generator is allowed to set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Hard cap on output tokens.
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            max_output_tokens,
        }
    }

    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction.filter(|s| !s.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyRating {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub probability: String,
    #[serde(default)]
    pub blocked: bool,
}

impl fmt::Display for SafetyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.category, self.probability)?;
        if self.blocked {
            f.write_str("(blocked)")?;
        }
        Ok(())
    }
}

/// Outcome of one generation call. Never partially retried.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    /// The model answered with text (untrimmed).
    Text(String),
    /// The call succeeded but carried no text.
    Empty,
    /// The prompt or the answer was stopped by the provider's filters.
    Blocked {
        block_reason: Option<String>,
        finish_reason: Option<String>,
        safety_ratings: Vec<SafetyRating>,
    },
    /// The call itself failed (transport, auth, quota, decoding).
    Failed(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response for the request. Failures are reported as
    /// [`GenerationResult`] variants rather than errors.
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}
