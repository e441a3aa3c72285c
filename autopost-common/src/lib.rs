//! Common types and utilities shared across autopost crates.
//!
//! This crate defines the shared error type, the policy enums that more than
//! one crate needs to agree on, and the observability helpers. It is
//! intentionally lightweight so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`RejectionPolicy`]: what a job does when generated text is rejected
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`AutopostError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use autopost_common::RejectionPolicy;
//!
//! let policy: RejectionPolicy = "fallback".parse().unwrap();
//! assert_eq!(policy, RejectionPolicy::Fallback);
//! assert_eq!(policy.as_str(), "fallback");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// What the content generator does when generated text is rejected
/// (too short, empty, blocked by a safety filter, or the call failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RejectionPolicy {
    /// Skip publishing for this run.
    #[default]
    Abort,
    /// Publish a deterministic, template-built sentence instead.
    Fallback,
}

impl RejectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RejectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectionPolicy {
    type Err = AutopostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "skip" => Ok(Self::Abort),
            "fallback" => Ok(Self::Fallback),
            other => Err(AutopostError::Config(format!(
                "unknown rejection policy '{other}' (expected 'abort' or 'fallback')"
            ))),
        }
    }
}

/// Error types used across the autopost system.
#[derive(thiserror::Error, Debug)]
pub enum AutopostError {
    /// A remote service call could not be completed.
    #[error("Service error: {0}")]
    Service(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`AutopostError`].
pub type Result<T> = std::result::Result<T, AutopostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(
            " Fallback ".parse::<RejectionPolicy>().unwrap(),
            RejectionPolicy::Fallback
        );
        assert_eq!(
            "ABORT".parse::<RejectionPolicy>().unwrap(),
            RejectionPolicy::Abort
        );
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let err = "retry".parse::<RejectionPolicy>().unwrap_err();
        assert!(matches!(err, AutopostError::Config(_)));
        assert!(err.to_string().contains("retry"));
    }

    #[test]
    fn policy_deserializes_from_lowercase() {
        let p: RejectionPolicy = serde_json::from_str("\"fallback\"").unwrap();
        assert_eq!(p, RejectionPolicy::Fallback);
        assert_eq!(RejectionPolicy::default(), RejectionPolicy::Abort);
    }
}
