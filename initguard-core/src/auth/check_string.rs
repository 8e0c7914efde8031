//! Data-check-string construction
//!
//! The host signs `name=value` lines for every field except `hash`, sorted by
//! name byte-wise and joined with `\n` with no trailing newline. Any deviation
//! changes the bytes and breaks every signature.

use crate::auth::payload::InitPayload;
use crate::auth::HASH_FIELD;

/// Build the check string for a parsed payload
pub fn build_check_string(payload: &InitPayload) -> String {
    build_from_fields(payload.fields().iter().map(|(n, v)| (n.as_str(), v.as_str())))
}

/// Build the check string from raw fields. A `hash` entry, if present, is skipped.
pub fn build_from_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut fields: Vec<(&str, &str)> = fields
        .into_iter()
        .filter(|(name, _)| *name != HASH_FIELD)
        .collect();

    // Byte-wise ordering, never locale-aware
    fields.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let capacity = fields.iter().map(|(n, v)| n.len() + v.len() + 2).sum();
    let mut out = String::with_capacity(capacity);
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(name);
        out.push('=');
        out.push_str(value);
    }
    out
}
