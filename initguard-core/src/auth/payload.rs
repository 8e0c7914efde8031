//! Init data parsing
//!
//! Turns the host-supplied payload into an ordered list of fields. Values are
//! kept exactly as delivered (after URL decoding) because the host signed
//! those bytes; nothing here re-serializes structured values.

use crate::auth::error::AuthError;
use crate::auth::user::WebAppUser;
use crate::auth::{AUTH_DATE_FIELD, HASH_FIELD};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashSet;

/// Parsed init data: every field in original order, plus the claimed tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitPayload {
    /// All fields except `hash`, in the order the host sent them
    fields: Vec<(String, String)>,

    /// Claimed authenticity tag (`hash` field)
    hash: String,

    /// Parsed `auth_date`, seconds since the Unix epoch
    auth_date: i64,
}

impl InitPayload {
    /// Parse a URL-encoded `initData` string (`name=value&name=value...`)
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let mut pairs = Vec::new();

        for segment in raw.split('&') {
            if segment.is_empty() {
                continue;
            }
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            let name = form_decode(name, name)?;
            let value = form_decode(value, &name)?;
            pairs.push((name, value));
        }

        Self::from_pairs(pairs)
    }

    /// Build from an already-parsed mapping of string values, in caller order
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        let mut hash = None;

        for (name, value) in pairs {
            let name = name.into();
            let value = value.into();

            if name.is_empty() {
                return Err(AuthError::EmptyFieldName);
            }
            if !seen.insert(name.clone()) {
                return Err(AuthError::DuplicateField { name });
            }

            if name == HASH_FIELD {
                hash = Some(value);
            } else {
                fields.push((name, value));
            }
        }

        let hash = hash.ok_or(AuthError::MissingHash)?;

        let raw_auth_date = fields
            .iter()
            .find(|(name, _)| name == AUTH_DATE_FIELD)
            .map(|(_, value)| value.as_str())
            .ok_or(AuthError::MissingAuthDate)?;
        let auth_date = parse_auth_date(raw_auth_date)?;

        tracing::debug!(
            field_count = fields.len(),
            auth_date,
            "Parsed init data payload"
        );

        Ok(InitPayload {
            fields,
            hash,
            auth_date,
        })
    }

    /// Build from a JSON object
    ///
    /// String values are used verbatim. Integers and booleans are rendered
    /// with their JSON text. Nested objects, arrays, `null` and non-integer
    /// numbers are rejected: their original string form is unknown, and
    /// rendering them would not reproduce what the host signed.
    pub fn from_json(value: &Value) -> Result<Self, AuthError> {
        let object = value.as_object().ok_or(AuthError::StructuredValue {
            field: "<root>".to_string(),
        })?;

        let mut pairs = Vec::with_capacity(object.len());
        for (name, value) in object {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Number(_) | Value::Object(_) | Value::Array(_) => {
                    return Err(AuthError::StructuredValue {
                        field: name.clone(),
                    })
                }
            };
            pairs.push((name.clone(), rendered));
        }

        Self::from_pairs(pairs)
    }

    /// Look up a signed field by name. `hash` is not a signed field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Signed fields in original order (excludes `hash`)
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// The claimed authenticity tag
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn auth_date(&self) -> i64 {
        self.auth_date
    }

    pub fn query_id(&self) -> Option<&str> {
        self.get("query_id")
    }

    /// Decode the `user` field into a typed view
    ///
    /// The original string is left untouched; verification keeps using it.
    pub fn user(&self) -> Result<Option<WebAppUser>, serde_json::Error> {
        self.get("user")
            .map(serde_json::from_str::<WebAppUser>)
            .transpose()
    }

    /// Number of signed fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// `application/x-www-form-urlencoded` decoding: `+` is a space, then `%XX`
fn form_decode(input: &str, field: &str) -> Result<String, AuthError> {
    let spaced: Cow<'_, str> = if input.contains('+') {
        Cow::Owned(input.replace('+', " "))
    } else {
        Cow::Borrowed(input)
    };

    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|_| AuthError::InvalidEncoding {
            field: field.to_string(),
        })
}

fn parse_auth_date(raw: &str) -> Result<i64, AuthError> {
    let invalid = || AuthError::InvalidAuthDate {
        value: raw.to_string(),
    };

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<i64>().map_err(|_| invalid())
}
