//! Verifier configuration
//!
//! Loaded from a JSON file, falling back to built-in defaults:
//!
//! ```json
//! {
//!   "bot_token_env": "TELEGRAM_BOT_TOKEN",
//!   "max_age_seconds": 600,
//!   "future_skew_seconds": 30,
//!   "key_derivation": "label-prefixed-sha256"
//! }
//! ```
//!
//! The bot token itself never lives in this file; only the name of the
//! environment variable that holds it.

use crate::auth::error::AuthError;
use crate::auth::freshness::FreshnessPolicy;
use crate::auth::hasher::KeyDerivation;
use crate::auth::{DEFAULT_FUTURE_SKEW_SECS, DEFAULT_MAX_AGE_SECS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level verifier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    /// Environment variable holding the bot token
    #[serde(default = "default_bot_token_env")]
    pub bot_token_env: String,

    /// Maximum accepted age of `auth_date`, in seconds
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,

    /// How far in the future `auth_date` may be before it is rejected
    #[serde(default = "default_future_skew")]
    pub future_skew_seconds: u64,

    #[serde(default)]
    pub key_derivation: KeyDerivation,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            bot_token_env: default_bot_token_env(),
            max_age_seconds: default_max_age(),
            future_skew_seconds: default_future_skew(),
            key_derivation: KeyDerivation::default(),
        }
    }
}

fn default_bot_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

fn default_max_age() -> u64 {
    DEFAULT_MAX_AGE_SECS
}

fn default_future_skew() -> u64 {
    DEFAULT_FUTURE_SKEW_SECS
}

impl VerifierConfig {
    /// Load and validate configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, AuthError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| AuthError::ConfigReadError {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|source| AuthError::ConfigParseError { source })?;
        config.validate()?;

        tracing::debug!("Loaded verifier config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AuthError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.max_age_seconds == 0 {
            return Err(AuthError::InvalidConfig {
                reason: "max_age_seconds must be greater than zero".to_string(),
            });
        }
        if self.bot_token_env.trim().is_empty() {
            return Err(AuthError::InvalidConfig {
                reason: "bot_token_env must name an environment variable".to_string(),
            });
        }
        Ok(())
    }

    pub fn freshness_policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::new(self.max_age_seconds, self.future_skew_seconds)
    }
}
