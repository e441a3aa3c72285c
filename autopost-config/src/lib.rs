//! Loader for autopost configuration with YAML + environment overlays.
//!
//! Precedence, lowest first: built-in defaults, the YAML file(s), inline YAML,
//! then `AUTOPOST__`-prefixed environment variables (`AUTOPOST__GENERATION__CHAR_LIMIT=120`).
//! String values may reference other variables as `${VAR}`; expansion runs after
//! merging so overrides can use it too. Secrets are never read from here, see
//! [`secrets`].
use config::{Config, Environment, File, FileFormat};
use serde_json::Value;
use std::path::Path;

pub mod secrets;
pub mod settings;

pub use secrets::{Secrets, TwitterCredentials};
pub use settings::{
    AutopostConfig, DigestJobSettings, GeminiSettings, GenerationSettings, GreetingSettings,
    LoggingSettings, NewsSettings, ReplyJobSettings, TwitterSettings,
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct AutopostConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for AutopostConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AutopostConfigLoader {
    /// ```
    /// use autopost_config::AutopostConfigLoader;
    ///
    /// let config = AutopostConfigLoader::new()
    ///     .with_yaml_str("generation:\n  char_limit: 120\n")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.generation.char_limit, 120);
    /// assert_eq!(config.generation.min_length, 10);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when absent, so a deployment can
    /// run on defaults and environment variables alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge every source, expand `${VAR}` placeholders and validate the result.
    pub fn load(self) -> Result<AutopostConfig, SettingsError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("AUTOPOST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: AutopostConfig = serde_json::from_value(v)
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_inside_a_string() {
        temp_env::with_var("AP_MODEL", Some("gemini-2.0-flash"), || {
            let mut v = json!("models/${AP_MODEL}:generateContent");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("models/gemini-2.0-flash:generateContent"));
        });
    }

    #[test]
    fn nested_values_are_visited() {
        temp_env::with_vars([("AP_LANG", Some("Japanese")), ("AP_Q", Some("vtuber"))], || {
            let mut v = json!({
                "reply": { "language": "$AP_LANG", "max_output_tokens": 150 },
                "news": { "query": "${AP_Q} news", "page_size": 100 },
                "exclude": ["retweets", "${AP_Q}"],
                "user_id": null
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!({
                    "reply": { "language": "Japanese", "max_output_tokens": 150 },
                    "news": { "query": "vtuber news", "page_size": 100 },
                    "exclude": ["retweets", "vtuber"],
                    "user_id": null
                })
            );
        });
    }

    #[test]
    fn chained_placeholders_resolve() {
        temp_env::with_vars(
            [
                ("AP_HOST", Some("api.example")),
                ("AP_BASE", Some("https://${AP_HOST}")),
                ("AP_URL", Some("${AP_BASE}/v2")),
            ],
            || {
                let mut v = json!("${AP_URL}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("https://api.example/v2"));
            },
        );
    }

    #[test]
    fn self_referencing_values_terminate() {
        temp_env::with_vars([("AP_PING", Some("${AP_PONG}")), ("AP_PONG", Some("${AP_PING}"))], || {
            let mut v = json!("<${AP_PING}>");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with('<') && s.ends_with('>'));
            assert!(s.contains("${AP_P"));
        });
    }

    #[test]
    fn unset_placeholders_are_kept() {
        let mut v = json!("prefix-${AP_SURELY_UNSET}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("prefix-${AP_SURELY_UNSET}"));
    }

    #[test]
    fn missing_secrets_message_lists_names() {
        let err = SettingsError::MissingSecrets(vec!["GEMINI_API_KEY", "NEWS_API_KEY"]);
        assert_eq!(
            err.to_string(),
            "missing required environment variables: GEMINI_API_KEY, NEWS_API_KEY"
        );
    }
}
