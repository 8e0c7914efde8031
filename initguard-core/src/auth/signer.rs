//! Produce signed init data, the way the host does
//!
//! Intended for fixtures, local development and the `initguard sign` command.
//! Verification never goes through this module.

use crate::auth::error::AuthError;
use crate::auth::hasher::{derive_key, sign_fields, KeyDerivation};
use crate::auth::payload::InitPayload;
use crate::auth::secret::{DerivedKey, SharedSecret};
use crate::auth::{AUTH_DATE_FIELD, HASH_FIELD};

pub struct InitDataSigner {
    key: DerivedKey,
}

impl InitDataSigner {
    pub fn new(secret: &SharedSecret, derivation: KeyDerivation) -> Self {
        Self {
            key: derive_key(secret, derivation),
        }
    }

    /// Tag for the given fields (any `hash` entry is ignored)
    pub fn tag<'a, I>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        sign_fields(&self.key, fields)
    }

    /// Render a complete URL-encoded `initData` string
    ///
    /// Fields keep the given order, `auth_date` is added when absent and
    /// `hash` is appended last. Field sets the parser would reject (duplicate
    /// or empty names, a non-numeric `auth_date`) are refused with the same
    /// error, so nothing is signed that cannot be verified.
    pub fn sign(
        &self,
        fields: &[(String, String)],
        auth_date: i64,
    ) -> Result<String, AuthError> {
        let mut all: Vec<(&str, String)> = fields
            .iter()
            .filter(|(name, _)| name != HASH_FIELD)
            .map(|(name, value)| (name.as_str(), value.clone()))
            .collect();
        if !all.iter().any(|(name, _)| *name == AUTH_DATE_FIELD) {
            all.push((AUTH_DATE_FIELD, auth_date.to_string()));
        }

        let hash = self.tag(all.iter().map(|(n, v)| (*n, v.as_str())));
        InitPayload::from_pairs(
            all.iter()
                .map(|(n, v)| (*n, v.as_str()))
                .chain([(HASH_FIELD, hash.as_str())]),
        )?;

        let mut parts: Vec<String> = all
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect();
        parts.push(format!("{HASH_FIELD}={hash}"));
        Ok(parts.join("&"))
    }
}
