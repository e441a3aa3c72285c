//! Strongly typed settings. Every field has a default so an empty file (or
//! no file at all) is a valid configuration.
use autopost_common::RejectionPolicy;
use autopost_common::observability::LogFormat;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

use crate::SettingsError;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AutopostConfig {
    pub twitter: TwitterSettings,
    pub gemini: GeminiSettings,
    pub news: NewsSettings,
    pub reply: ReplyJobSettings,
    pub digest: DigestJobSettings,
    pub generation: GenerationSettings,
    pub greetings: GreetingSettings,
    pub logging: LoggingSettings,
}

impl AutopostConfig {
    /// Reject combinations that would make a job misbehave at run time.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let g = &self.generation;
        if g.char_limit == 0 {
            return Err(SettingsError::invalid("generation.char_limit", "must be > 0"));
        }
        if g.min_length > g.char_limit {
            return Err(SettingsError::invalid(
                "generation.min_length",
                "must not exceed generation.char_limit",
            ));
        }
        if g.fallback_template.trim().is_empty() {
            return Err(SettingsError::invalid(
                "generation.fallback_template",
                "must not be empty",
            ));
        }
        if self.reply.max_output_tokens == 0 {
            return Err(SettingsError::invalid("reply.max_output_tokens", "must be > 0"));
        }
        if self.digest.max_output_tokens == 0 {
            return Err(SettingsError::invalid("digest.max_output_tokens", "must be > 0"));
        }
        if !(1..=100).contains(&self.twitter.max_results) {
            return Err(SettingsError::invalid(
                "twitter.max_results",
                "must be between 1 and 100",
            ));
        }
        if !(1..=100).contains(&self.news.page_size) {
            return Err(SettingsError::invalid("news.page_size", "must be between 1 and 100"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterSettings {
    pub base_url: String,
    /// Skip the `users/me` lookup when the account id is known.
    #[serde(deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
    pub max_results: u32,
    pub exclude: Vec<String>,
}

impl Default for TwitterSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com".into(),
            user_id: None,
            max_results: 50,
            exclude: vec!["retweets".into(), "replies".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub base_url: String,
    pub query: String,
    pub sort_by: String,
    pub language: String,
    pub page_size: u32,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".into(),
            query: "news".into(),
            sort_by: "publishedAt".into(),
            language: "jp".into(),
            page_size: 100,
        }
    }
}

/// The timeline reply job.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplyJobSettings {
    pub model: String,
    pub max_output_tokens: u32,
    /// Language the reply is written in.
    pub language: String,
    pub on_rejection: RejectionPolicy,
}

impl Default for ReplyJobSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".into(),
            max_output_tokens: 150,
            language: "Japanese".into(),
            on_rejection: RejectionPolicy::Abort,
        }
    }
}

/// The news digest job.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DigestJobSettings {
    pub model: String,
    pub max_output_tokens: u32,
    pub language: String,
    pub system_instruction: Option<String>,
    pub on_rejection: RejectionPolicy,
}

impl Default for DigestJobSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            max_output_tokens: 100,
            language: "Japanese".into(),
            system_instruction: Some(
                "Write from a personal point of view, within the platform's character limit, \
                 like a casual and funny post by a real person."
                    .into(),
            ),
            on_rejection: RejectionPolicy::Fallback,
        }
    }
}

/// Acceptance and fallback rules shared by the generating jobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Generated text shorter than this (in characters, after trimming) is rejected.
    pub min_length: usize,
    /// Platform character limit applied to everything that gets posted.
    pub char_limit: usize,
    /// Fallback sentence; `{title}` is replaced with the first candidate's title.
    pub fallback_template: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            min_length: 10,
            char_limit: 140,
            fallback_template: "Today's headline: {title}".into(),
        }
    }
}

/// The fixed list the greeting job picks from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GreetingSettings {
    pub messages: Vec<String>,
}

impl Default for GreetingSettings {
    fn default() -> Self {
        let lines = [
            "Good morning! Hope today is full of good moments with everyone!",
            "Good morning! A fresh start. Keep smiling and keep going!",
            "Good morning! Let's make today bright and energetic!",
            "Good morning! May your smile shine today too!",
            "Good morning! Be yourself and take it one step at a time!",
            "Good morning! Let's do our best today with energy and smiles!",
            "Good morning! Wishing everyone a day full of smiles!",
            "Good morning! New day, new challenge. Let's go!",
            "Good morning! Find a small happiness and enjoy your day!",
            "Good morning! Let's walk forward together with a smile!",
            "Good morning! Small steps lead to big dreams!",
            "Good morning! Go at your own pace and enjoy the day!",
        ];
        Self {
            messages: lines
                .iter()
                .map(|l| format!("{l} #GoodMorningVtuber"))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Directory for the rolling file sink; stdout only when unset.
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            filter: "info".into(),
        }
    }
}

/// Environment overrides are type-parsed, so a numeric account id arrives as
/// a number.
fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(u64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Raw::Int(n)) => Some(n.to_string()),
        _ => None,
    })
}
