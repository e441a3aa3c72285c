//! Credentials read from the process environment.
//!
//! Secrets never go through the YAML layer. Each job asks for the names it
//! needs up front, and every missing one is reported in a single error
//! before any network call is made.
use std::collections::HashMap;
use std::fmt;

use crate::SettingsError;

pub const CONSUMER_KEY: &str = "CONSUMER_KEY";
pub const CONSUMER_SECRET: &str = "CONSUMER_SECRET";
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ACCESS_TOKEN_SECRET: &str = "ACCESS_TOKEN_SECRET";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const NEWS_API_KEY: &str = "NEWS_API_KEY";

/// The four OAuth 1.0a values used to sign posting requests.
pub const TWITTER_SECRETS: [&str; 4] = [
    CONSUMER_KEY,
    CONSUMER_SECRET,
    ACCESS_TOKEN,
    ACCESS_TOKEN_SECRET,
];

/// A resolved set of secrets, keyed by environment variable name.
#[derive(Clone, Default)]
pub struct Secrets {
    values: HashMap<&'static str, String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&str> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Secrets").field("loaded", &names).finish()
    }
}

impl Secrets {
    /// Read `names` from the process environment.
    pub fn from_env(names: &[&'static str]) -> Result<Self, SettingsError> {
        Self::from_lookup(names, |name| std::env::var(name).ok())
    }

    /// Read `names` through an arbitrary lookup. Blank values count as missing.
    pub fn from_lookup<F>(names: &[&'static str], lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = HashMap::new();
        let mut missing = Vec::new();
        for &name in names {
            match lookup(name).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => {
                    values.insert(name, v);
                }
                _ => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(SettingsError::MissingSecrets(missing));
        }
        Ok(Self { values })
    }

    pub fn require(&self, name: &'static str) -> Result<&str, SettingsError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| SettingsError::MissingSecrets(vec![name]))
    }

    pub fn twitter(&self) -> Result<TwitterCredentials, SettingsError> {
        Ok(TwitterCredentials {
            consumer_key: self.require(CONSUMER_KEY)?.to_string(),
            consumer_secret: self.require(CONSUMER_SECRET)?.to_string(),
            access_token: self.require(ACCESS_TOKEN)?.to_string(),
            access_token_secret: self.require(ACCESS_TOKEN_SECRET)?.to_string(),
        })
    }
}

#[derive(Clone)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TwitterCredentials(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn all_missing_names_are_reported() {
        let err = Secrets::from_lookup(
            &[CONSUMER_KEY, GEMINI_API_KEY, NEWS_API_KEY],
            lookup(&[(CONSUMER_KEY, "ck"), (NEWS_API_KEY, "   ")]),
        )
        .unwrap_err();
        match err {
            SettingsError::MissingSecrets(names) => {
                assert_eq!(names, vec![GEMINI_API_KEY, NEWS_API_KEY]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn twitter_credentials_are_assembled() {
        let secrets = Secrets::from_lookup(
            &TWITTER_SECRETS,
            lookup(&[
                (CONSUMER_KEY, "ck"),
                (CONSUMER_SECRET, "cs"),
                (ACCESS_TOKEN, " at "),
                (ACCESS_TOKEN_SECRET, "ats"),
            ]),
        )
        .unwrap();
        let creds = secrets.twitter().unwrap();
        assert_eq!(creds.access_token, "at");
        assert_eq!(format!("{creds:?}"), "TwitterCredentials(<redacted>)");
        assert!(!format!("{secrets:?}").contains("ats\""));
    }

    #[test]
    fn require_on_unloaded_name_fails() {
        let secrets = Secrets::from_lookup(&[], lookup(&[])).unwrap();
        assert!(matches!(
            secrets.require(GEMINI_API_KEY),
            Err(SettingsError::MissingSecrets(_))
        ));
    }
}
