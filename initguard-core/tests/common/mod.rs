//! Shared fixtures for init data integration tests
//!
//! Golden tags were computed with an independent HMAC-SHA256 implementation
//! (Python `hashlib`/`hmac`), not with this crate.

#![allow(dead_code)]

use initguard_core::auth::{InitDataVerifier, KeyDerivation, SharedSecret};
use std::sync::Once;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const GOLDEN_TOKEN: &str = "123456:TEST-golden-vector-token";

pub const GOLDEN_AUTH_DATE: i64 = 1_700_000_000;

pub const GOLDEN_USER: &str = r#"{"id":1,"first_name":"A"}"#;

/// Tag over `auth_date=1700000000\nquery_id=AAH\nuser={"id":1,"first_name":"A"}`
/// with key `SHA256("WebAppData" || GOLDEN_TOKEN)`
pub const GOLDEN_HASH: &str = "4db812310efe48e73aee42ddc3477a5be270584dfbcb5ab367fc4cd7b38294c3";

/// Same check string, key `HMAC-SHA256("WebAppData", GOLDEN_TOKEN)`
pub const GOLDEN_HASH_TELEGRAM_HMAC: &str =
    "45c5fbba3cc19b93f72818a6e1300f26ef4257a76659b2c8d59cc205ccbf41cf";

pub fn golden_init_data(hash: &str) -> String {
    format!(
        "auth_date=1700000000&query_id=AAH&user=%7B%22id%22%3A1%2C%22first_name%22%3A%22A%22%7D&hash={hash}"
    )
}

/// Golden fields in map form, `hash` included
pub fn golden_fields() -> Vec<(String, String)> {
    vec![
        ("auth_date".to_string(), GOLDEN_AUTH_DATE.to_string()),
        ("query_id".to_string(), "AAH".to_string()),
        ("user".to_string(), GOLDEN_USER.to_string()),
        ("hash".to_string(), GOLDEN_HASH.to_string()),
    ]
}

pub fn golden_verifier() -> InitDataVerifier {
    InitDataVerifier::new(&SharedSecret::new(GOLDEN_TOKEN).expect("non-empty token"))
}

pub fn golden_verifier_with(derivation: KeyDerivation) -> InitDataVerifier {
    InitDataVerifier::with_options(
        &SharedSecret::new(GOLDEN_TOKEN).expect("non-empty token"),
        derivation,
        Default::default(),
    )
}
