//! Init data error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of an [`AuthError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The payload itself is unusable. Per-request; the caller denies the action.
    MalformedPayload,
    /// The verifying service is misconfigured. Fatal to the service.
    Configuration,
}

/// Errors raised while parsing init data or setting up a verifier
///
/// A payload that parses but fails the signature or freshness check is not an
/// error; see [`crate::auth::VerificationResult`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// The `hash` field is absent
    #[error("Malformed init data: the `hash` field is missing.\n\nThe host always signs init data; a payload without `hash` cannot be trusted.")]
    MissingHash,

    /// The `auth_date` field is absent
    #[error("Malformed init data: the `auth_date` field is missing")]
    MissingAuthDate,

    /// `auth_date` is not a non-negative integer number of seconds
    #[error("Malformed init data: `auth_date` must be an integer Unix timestamp, got {value:?}")]
    InvalidAuthDate { value: String },

    /// A `name=value` pair has an empty name
    #[error("Malformed init data: a field has an empty name")]
    EmptyFieldName,

    /// The same field name appears more than once
    #[error("Malformed init data: field `{name}` appears more than once")]
    DuplicateField { name: String },

    /// Percent-decoding produced invalid UTF-8
    #[error("Malformed init data: field `{field}` is not valid percent-encoded UTF-8")]
    InvalidEncoding { field: String },

    /// A map-form value (nested, null or fractional) with no original string form
    #[error("Malformed init data: field `{field}` is not a string, integer or boolean.\n\nPass the original string exactly as delivered by the host; re-serialized JSON does not match what was signed.")]
    StructuredValue { field: String },

    /// The shared bot token is missing or empty
    #[error("Verifier is not configured: no bot token found in {source_name}.\n\nSet the token in the environment before starting the service.")]
    MissingSecret { source_name: String },

    /// Failed to read the verifier configuration file
    #[error("Failed to read verifier configuration from {path}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the verifier configuration file
    #[error("Failed to parse verifier configuration (invalid JSON or unknown values)")]
    ConfigParseError {
        #[source]
        source: serde_json::Error,
    },

    /// Configuration parsed but holds unusable values
    #[error("Invalid verifier configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl AuthError {
    /// Map this error onto the malformed-payload / configuration taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingHash
            | AuthError::MissingAuthDate
            | AuthError::InvalidAuthDate { .. }
            | AuthError::EmptyFieldName
            | AuthError::DuplicateField { .. }
            | AuthError::InvalidEncoding { .. }
            | AuthError::StructuredValue { .. } => ErrorKind::MalformedPayload,
            AuthError::MissingSecret { .. }
            | AuthError::ConfigReadError { .. }
            | AuthError::ConfigParseError { .. }
            | AuthError::InvalidConfig { .. } => ErrorKind::Configuration,
        }
    }

    pub fn is_malformed_payload(&self) -> bool {
        self.kind() == ErrorKind::MalformedPayload
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Log configuration faults loudly. Messages never carry secret material.
    pub fn log_if_security_critical(&self) {
        if self.is_configuration() {
            tracing::error!(target: "security", "VERIFIER MISCONFIGURED: {}", self);
        }
    }
}
