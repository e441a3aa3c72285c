use crate::traits::{GenerationRequest, GenerationResult, LlmClient, SafetyRating};
use async_trait::async_trait;
use autopost_common::{AutopostError, Result};
use autopost_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Finish reasons that mean the answer was withheld by a filter.
const BLOCKING_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    total_token_count: Option<u32>,
}

/// Google Gemini `generateContent` client.
///
/// Requires a valid API key and internet access.
pub struct GeminiClient {
    http: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client using the provided base URL, API key and model.
    pub fn new(base_url: &str, api_key: String, model: String) -> Result<Self> {
        let http = HttpClient::new(base_url)
            .map_err(|e| AutopostError::Service(format!("Failed to create HTTP client: {e}")))?
            .with_timeout(Duration::from_secs(60));

        Ok(Self {
            http,
            api_key,
            model,
        })
    }
}

fn build_request(request: &GenerationRequest) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: GeminiGenerationConfig {
            max_output_tokens: request.max_output_tokens,
        },
        system_instruction: request.system_instruction.as_ref().map(|s| GeminiContent {
            parts: vec![GeminiPart { text: s.clone() }],
        }),
    }
}

/// Turn a decoded response into a [`GenerationResult`].
fn interpret(resp: GeminiResponse) -> GenerationResult {
    if let Some(feedback) = resp.prompt_feedback {
        if feedback.block_reason.is_some() {
            return GenerationResult::Blocked {
                block_reason: feedback.block_reason,
                finish_reason: None,
                safety_ratings: feedback.safety_ratings,
            };
        }
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return GenerationResult::Empty;
    };

    let text: String = candidate
        .content
        .unwrap_or_default()
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect();

    let blocked = candidate
        .finish_reason
        .as_deref()
        .is_some_and(|r| BLOCKING_FINISH_REASONS.contains(&r));

    if blocked && text.trim().is_empty() {
        return GenerationResult::Blocked {
            block_reason: None,
            finish_reason: candidate.finish_reason,
            safety_ratings: candidate.safety_ratings,
        };
    }
    if text.trim().is_empty() {
        return GenerationResult::Empty;
    }
    GenerationResult::Text(text)
}

fn describe_http_error(e: &HttpError) -> String {
    match e.status().map(|s| s.as_u16()) {
        Some(429) => "Rate limit exceeded".to_string(),
        Some(401) => "Invalid API key".to_string(),
        Some(403) => "API access forbidden".to_string(),
        _ => format!("Gemini API error: {e}"),
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let path = format!("models/{}:generateContent", self.model);
        let body = build_request(request);

        tracing::debug!(
            model = %self.model,
            prompt_chars = request.prompt.chars().count(),
            max_output_tokens = request.max_output_tokens,
            "gemini.generate.start"
        );

        let resp: std::result::Result<GeminiResponse, HttpError> = self
            .http
            .post_json(
                &path,
                &body,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "key",
                        value: Cow::Borrowed(&self.api_key),
                    }),
                    ..Default::default()
                },
            )
            .await;

        match resp {
            Ok(resp) => {
                let tokens_used = resp.usage_metadata.as_ref().and_then(|u| u.total_token_count);
                let result = interpret(resp);
                tracing::debug!(
                    model = %self.model,
                    ?tokens_used,
                    outcome = match &result {
                        GenerationResult::Text(_) => "text",
                        GenerationResult::Empty => "empty",
                        GenerationResult::Blocked { .. } => "blocked",
                        GenerationResult::Failed(_) => "failed",
                    },
                    "gemini.generate.done"
                );
                result
            }
            Err(e) => {
                let reason = describe_http_error(&e);
                tracing::warn!(model = %self.model, error = %e, "gemini.generate.failed");
                GenerationResult::Failed(reason)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
