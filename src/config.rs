//! Wizard policies, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::navigation::AdvancePolicy;

/// How the "at least one event" and "at least one category" preconditions are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreconditionMode {
    /// Reject the operation locally.
    #[default]
    Strict,
    /// Log and let the gateway decide.
    Advisory,
}

/// What abandoning a session does with resources already created remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonPolicy {
    /// Leave them in place for operators to clean up.
    #[default]
    Orphan,
    /// Delete tracked resources, newest first.
    Compensate,
}

/// Errors raised while loading a [`WizardConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The document is not valid TOML or has unknown values.
    #[error("invalid wizard config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Per-session wizard behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// See [`PreconditionMode`].
    pub preconditions: PreconditionMode,
    /// See [`AdvancePolicy`].
    pub advance: AdvancePolicy,
    /// Reject a create whose payload matches an earlier success in the session.
    pub deduplicate_submissions: bool,
    /// See [`AbandonPolicy`].
    pub on_abandon: AbandonPolicy,
}

impl WizardConfig {
    /// Parse a config from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Caller-driven navigation, advisory preconditions, no deduplication.
    pub fn permissive() -> Self {
        Self {
            preconditions: PreconditionMode::Advisory,
            advance: AdvancePolicy::Free,
            deduplicate_submissions: false,
            on_abandon: AbandonPolicy::Orphan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = WizardConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, WizardConfig::default());
        assert_eq!(config.preconditions, PreconditionMode::Strict);
        assert_eq!(config.advance, AdvancePolicy::RequirePrerequisites);
        assert!(!config.deduplicate_submissions);
        assert_eq!(config.on_abandon, AbandonPolicy::Orphan);
    }

    #[test]
    fn parses_every_key() {
        let config = WizardConfig::from_toml_str(
            r#"
            preconditions = "advisory"
            advance = "free"
            deduplicate_submissions = true
            on_abandon = "compensate"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.preconditions, PreconditionMode::Advisory);
        assert_eq!(config.advance, AdvancePolicy::Free);
        assert!(config.deduplicate_submissions);
        assert_eq!(config.on_abandon, AbandonPolicy::Compensate);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = WizardConfig::from_toml_str(r#"on_abandon = "shred""#)
            .expect_err("unknown variant must fail");
        assert!(err.to_string().starts_with("invalid wizard config"));
    }
}
