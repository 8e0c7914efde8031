//! Cryptographic primitives for init data
//!
//! Uses SHA-256 to derive the per-application key and HMAC-SHA256 to tag the
//! check string.

use crate::auth::check_string::build_from_fields;
use crate::auth::secret::{DerivedKey, SharedSecret};
use crate::auth::WEB_APP_DATA_LABEL;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// How the HMAC key is derived from the bot token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyDerivation {
    /// `SHA256("WebAppData" || token)`
    #[default]
    LabelPrefixedSha256,
    /// `HMAC-SHA256(key = "WebAppData", message = token)`, as published in
    /// the Telegram Bot API documentation
    TelegramHmac,
}

/// Derive the signing key for a shared secret
pub fn derive_key(secret: &SharedSecret, derivation: KeyDerivation) -> DerivedKey {
    let mut key = [0u8; 32];

    match derivation {
        KeyDerivation::LabelPrefixedSha256 => {
            let mut hasher = Sha256::new();
            hasher.update(WEB_APP_DATA_LABEL.as_bytes());
            hasher.update(secret.as_bytes());
            key.copy_from_slice(&hasher.finalize());
        }
        KeyDerivation::TelegramHmac => {
            let mut mac = new_mac(WEB_APP_DATA_LABEL.as_bytes());
            mac.update(secret.as_bytes());
            key.copy_from_slice(&mac.finalize().into_bytes());
        }
    }

    DerivedKey::from_bytes(key)
}

/// Compute the lowercase hex HMAC-SHA256 tag of a message
pub fn compute_tag(key: &DerivedKey, message: &[u8]) -> String {
    let mut mac = new_mac(key.as_bytes());
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a claimed tag against the expected one
///
/// Lengths are compared first; equal-length inputs are then compared over
/// their full length with no early exit.
pub fn tags_match(expected: &str, claimed: &str) -> bool {
    if expected.len() != claimed.len() {
        return false;
    }
    expected.as_bytes().ct_eq(claimed.as_bytes()).into()
}

/// Recompute the tag for `check_string` and compare it to `claimed`
pub fn verify_tag(key: &DerivedKey, check_string: &str, claimed: &str) -> bool {
    let expected = compute_tag(key, check_string.as_bytes());
    tags_match(&expected, claimed)
}

/// Tag a set of fields the way the host does. Not used on the verification path.
pub fn sign_fields<'a, I>(key: &DerivedKey, fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let check_string = build_from_fields(fields);
    compute_tag(key, check_string.as_bytes())
}

fn new_mac(key: &[u8]) -> HmacSha256 {
    match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    }
}
