//! Prompt assembly, acceptance checks and the rejection policy.
//!
//! The generator never returns an error: a blocked, empty, failed or too
//! short answer is turned into a [`Rejection`], and the configured
//! [`RejectionPolicy`] decides between skipping the run and publishing a
//! templated fallback sentence.
use crate::candidate::Candidate;
use autopost_common::RejectionPolicy;
use autopost_llm::traits::{GenerationRequest, GenerationResult, LlmClient};
use std::fmt;
use std::sync::Arc;

/// Used when the configured template renders to nothing.
pub const DEFAULT_FALLBACK_TEMPLATE: &str = "Today's headline: {title}";

const TITLE_PLACEHOLDER: &str = "{title}";
const ELLIPSIS: char = '…';

/// Which instruction template wraps the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// A reply to a single post, including its image URLs.
    Reply,
    /// One post summarising a list of articles.
    Digest,
}

#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub style: PromptStyle,
    /// Language the post is written in, e.g. `Japanese`.
    pub language: String,
    pub system_instruction: Option<String>,
    pub max_output_tokens: u32,
    pub min_length: usize,
    pub char_limit: usize,
    pub policy: RejectionPolicy,
    pub fallback_template: String,
}

impl GeneratorSettings {
    pub fn reply() -> Self {
        Self {
            style: PromptStyle::Reply,
            language: "Japanese".into(),
            system_instruction: None,
            max_output_tokens: 150,
            min_length: 10,
            char_limit: 140,
            policy: RejectionPolicy::Abort,
            fallback_template: DEFAULT_FALLBACK_TEMPLATE.into(),
        }
    }

    pub fn digest() -> Self {
        Self {
            style: PromptStyle::Digest,
            max_output_tokens: 100,
            policy: RejectionPolicy::Fallback,
            ..Self::reply()
        }
    }
}

/// Why generated text was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// There was nothing to generate from.
    NoInput,
    Empty,
    TooShort { chars: usize, min: usize },
    Blocked { reason: String },
    Failed(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoInput => f.write_str("no input"),
            Rejection::Empty => f.write_str("empty response"),
            Rejection::TooShort { chars, min } => {
                write!(f, "too short ({chars} < {min} characters)")
            }
            Rejection::Blocked { reason } => write!(f, "blocked ({reason})"),
            Rejection::Failed(msg) => write!(f, "generation failed: {msg}"),
        }
    }
}

/// What the generator hands to the publishing stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    Generated(String),
    Fallback(String),
    Skipped(Rejection),
}

pub struct ContentGenerator {
    llm: Arc<dyn LlmClient>,
    settings: GeneratorSettings,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, settings: GeneratorSettings) -> Self {
        Self { llm, settings }
    }

    pub fn with_policy(mut self, policy: RejectionPolicy) -> Self {
        self.settings.policy = policy;
        self
    }

    /// The request sent for `candidates`. Reply prompts use the first one.
    pub fn build_request(&self, candidates: &[Candidate]) -> Option<GenerationRequest> {
        let s = &self.settings;
        let prompt = match s.style {
            PromptStyle::Reply => reply_prompt(candidates.first()?, &s.language, s.char_limit),
            PromptStyle::Digest if candidates.is_empty() => return None,
            PromptStyle::Digest => digest_prompt(candidates, &s.language, s.char_limit),
        };
        Some(
            GenerationRequest::new(prompt, s.max_output_tokens)
                .with_system_instruction(s.system_instruction.clone()),
        )
    }

    pub async fn compose(&self, candidates: &[Candidate]) -> Composition {
        let outcome = match self.build_request(candidates) {
            None => Err(Rejection::NoInput),
            Some(request) => {
                let result = self.llm.generate(&request).await;
                self.judge(result)
            }
        };

        match outcome {
            Ok(text) => {
                tracing::info!(
                    model = self.llm.model_name(),
                    chars = text.chars().count(),
                    "generation.accepted"
                );
                Composition::Generated(text)
            }
            Err(rejection) => self.on_rejection(rejection, candidates.first()),
        }
    }

    fn judge(&self, result: GenerationResult) -> Result<String, Rejection> {
        match result {
            GenerationResult::Text(raw) => {
                accept(&raw, self.settings.min_length, self.settings.char_limit)
            }
            GenerationResult::Empty => Err(Rejection::Empty),
            GenerationResult::Blocked {
                block_reason,
                finish_reason,
                safety_ratings,
            } => {
                let ratings: Vec<String> = safety_ratings.iter().map(ToString::to_string).collect();
                tracing::warn!(
                    model = self.llm.model_name(),
                    block_reason = block_reason.as_deref().unwrap_or("-"),
                    finish_reason = finish_reason.as_deref().unwrap_or("-"),
                    safety_ratings = %ratings.join(","),
                    "generation.blocked"
                );
                let reason = block_reason
                    .or(finish_reason)
                    .unwrap_or_else(|| "unspecified".into());
                Err(Rejection::Blocked { reason })
            }
            GenerationResult::Failed(msg) => {
                tracing::warn!(model = self.llm.model_name(), error = %msg, "generation.failed");
                Err(Rejection::Failed(msg))
            }
        }
    }

    fn on_rejection(&self, rejection: Rejection, first: Option<&Candidate>) -> Composition {
        match self.settings.policy {
            RejectionPolicy::Abort => {
                tracing::info!(reason = %rejection, policy = "abort", "generation.rejected");
                Composition::Skipped(rejection)
            }
            RejectionPolicy::Fallback => {
                let text = fallback_text(
                    &self.settings.fallback_template,
                    first,
                    self.settings.char_limit,
                );
                tracing::info!(
                    reason = %rejection,
                    policy = "fallback",
                    chars = text.chars().count(),
                    "generation.rejected"
                );
                Composition::Fallback(text)
            }
        }
    }
}

/// Instruction for replying to a single post.
pub fn reply_prompt(candidate: &Candidate, language: &str, char_limit: usize) -> String {
    let mut prompt = format!(
        "Write one natural, polite reply to the post below in {language}, \
         no longer than {char_limit} characters, leaving out anything inappropriate.\n\
         Take the image URLs into account if they help.\n\n\
         Post:\n{}\n",
        candidate.text
    );
    if !candidate.media_urls.is_empty() {
        prompt.push_str("\nImage URLs:\n");
        for url in &candidate.media_urls {
            prompt.push_str("- ");
            prompt.push_str(url);
            prompt.push('\n');
        }
    }
    prompt.push_str("\nReply:");
    prompt
}

/// Instruction for a single post drawn from a list of articles.
pub fn digest_prompt(candidates: &[Candidate], language: &str, char_limit: usize) -> String {
    let mut prompt = format!(
        "From the articles below, leave out anything ethically or morally inappropriate, \
         pick an interesting story and write exactly one unique post in {language} that reads \
         like something a person casually wrote (about {char_limit} characters or fewer):\n"
    );
    for c in candidates {
        prompt.push_str("\n- Title: ");
        prompt.push_str(c.headline());
        prompt.push_str("\n  Summary: ");
        prompt.push_str(c.text.trim());
    }
    prompt
}

/// Trim, enforce the minimum length and clamp to the character limit.
pub fn accept(raw: &str, min_length: usize, char_limit: usize) -> Result<String, Rejection> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(Rejection::Empty);
    }
    let chars = text.chars().count();
    if chars < min_length {
        return Err(Rejection::TooShort {
            chars,
            min: min_length,
        });
    }
    Ok(truncate_chars(text, char_limit))
}

/// Render the fallback sentence from the first candidate's headline.
/// The result is non-empty whenever `char_limit > 0`.
pub fn fallback_text(template: &str, first: Option<&Candidate>, char_limit: usize) -> String {
    let headline = first.map(Candidate::headline).unwrap_or_default();
    let render = |t: &str| t.replace(TITLE_PLACEHOLDER, headline).trim().to_string();

    let mut text = render(template);
    if text.is_empty() {
        text = render(DEFAULT_FALLBACK_TEMPLATE);
    }
    truncate_chars(&text, char_limit)
}

/// Cut `text` to at most `limit` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    if limit == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(limit - 1).collect();
    out.truncate(out.trim_end().len());
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_prompt_lists_media_in_order() {
        let c = Candidate::new("1", "Look at my cat").with_media_urls(vec![
            "https://img/b.jpg".into(),
            "https://img/a.jpg".into(),
            "https://img/c.jpg".into(),
        ]);
        let prompt = reply_prompt(&c, "Japanese", 140);
        assert!(prompt.contains("Post:\nLook at my cat\n"));
        assert_eq!(prompt.matches("https://img/").count(), 3);
        let b = prompt.find("- https://img/b.jpg\n").unwrap();
        let a = prompt.find("- https://img/a.jpg\n").unwrap();
        let cc = prompt.find("- https://img/c.jpg\n").unwrap();
        assert!(b < a && a < cc);
        assert!(prompt.ends_with("Reply:"));
    }

    #[test]
    fn reply_prompt_without_media_has_no_label() {
        let prompt = reply_prompt(&Candidate::new("1", "plain"), "English", 140);
        assert!(!prompt.contains("Image URLs:"));
        assert!(prompt.contains("in English"));
    }

    #[test]
    fn digest_prompt_lists_every_article() {
        let items = vec![
            Candidate::new("u1", "First summary").with_title("First"),
            Candidate::new("u2", "Second summary").with_title("Second"),
        ];
        let prompt = digest_prompt(&items, "Japanese", 140);
        assert!(prompt.contains("\n- Title: First\n  Summary: First summary"));
        assert!(prompt.contains("\n- Title: Second\n  Summary: Second summary"));
    }

    #[test]
    fn accept_trims_and_checks_length() {
        assert_eq!(accept("  hello world  ", 10, 140).unwrap(), "hello world");
        assert_eq!(
            accept(" short ", 10, 140).unwrap_err(),
            Rejection::TooShort { chars: 5, min: 10 }
        );
        assert_eq!(accept("   ", 10, 140).unwrap_err(), Rejection::Empty);
    }

    #[test]
    fn accept_counts_characters_not_bytes() {
        // Ten characters, thirty bytes.
        let text = "こんにちは、元気です";
        assert_eq!(accept(text, 10, 140).unwrap(), text);
    }

    #[test]
    fn accepted_text_is_clamped() {
        let long = "x".repeat(200);
        let out = accept(&long, 10, 140).unwrap();
        assert_eq!(out.chars().count(), 140);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("日本語のテキスト", 4), "日本語…");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
        assert_eq!(truncate_chars("ab   cd", 4), "ab…");
    }

    #[test]
    fn fallback_uses_title_then_text() {
        let titled = Candidate::new("1", "body").with_title("Markets rally");
        assert_eq!(
            fallback_text(DEFAULT_FALLBACK_TEMPLATE, Some(&titled), 140),
            "Today's headline: Markets rally"
        );

        let untitled = Candidate::new("1", "just a post");
        assert_eq!(
            fallback_text("Re: {title}", Some(&untitled), 140),
            "Re: just a post"
        );
    }

    #[test]
    fn fallback_is_never_empty_or_over_limit() {
        let long = Candidate::new("1", "b").with_title("t".repeat(500));
        let text = fallback_text(DEFAULT_FALLBACK_TEMPLATE, Some(&long), 140);
        assert_eq!(text.chars().count(), 140);

        let blank = Candidate::new("1", "   ");
        let text = fallback_text("{title}", Some(&blank), 140);
        assert_eq!(text, "Today's headline:");

        assert!(!fallback_text("{title}", None, 140).is_empty());
    }
}
