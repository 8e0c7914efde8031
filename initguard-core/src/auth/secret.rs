//! Secret material: the shared bot token and keys derived from it
//!
//! Both types zero their memory on drop and redact themselves in `Debug`
//! output so they cannot leak through logs or panic messages.

use crate::auth::error::AuthError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The long-lived secret shared with the issuing host (the bot token)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wrap raw token bytes
    ///
    /// Leading and trailing ASCII whitespace is stripped, as it is for
    /// [`SharedSecret::from_env`]; bot tokens never contain it. Input that is
    /// empty after trimming is a configuration fault.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, AuthError> {
        Self::trimmed(bytes.into(), "the supplied secret")
    }

    /// Read the token from an environment variable
    pub fn from_env(var: &str) -> Result<Self, AuthError> {
        let value = std::env::var(var).unwrap_or_default();
        Self::trimmed(value.into_bytes(), &format!("environment variable {var}"))
    }

    fn trimmed(mut bytes: Vec<u8>, source_name: &str) -> Result<Self, AuthError> {
        let end = bytes
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        let start = bytes[..end]
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(end);

        let secret = SharedSecret(bytes[start..end].to_vec());
        bytes.zeroize();
        if secret.0.is_empty() {
            return Err(AuthError::MissingSecret {
                source_name: source_name.to_string(),
            });
        }
        Ok(secret)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// 32-byte HMAC key derived from a [`SharedSecret`]
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey([u8; 32]);

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; 32]) -> Self {
        DerivedKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(<redacted>)")
    }
}
