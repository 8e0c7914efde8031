//! Init data authentication for Telegram Mini Apps
//!
//! A Mini App host hands the embedded page a signed `initData` string. This
//! module proves the string came from the host and is recent, without the
//! bot token ever leaving the verifying service.
//!
//! Pipeline:
//! - [`payload`] parses the string into ordered fields plus the claimed `hash`
//! - [`check_string`] rebuilds the exact bytes the host signed
//! - [`hasher`] derives the per-app key and recomputes the HMAC-SHA256 tag
//! - [`freshness`] rejects payloads outside the `auth_date` window
//! - [`verifier`] ties the stages together and returns a verdict

pub mod check_string;
pub mod config;
pub mod error;
pub mod freshness;
pub mod hasher;
pub mod payload;
pub mod secret;
pub mod signer;
pub mod user;
pub mod verifier;

pub use config::VerifierConfig;
pub use error::{AuthError, ErrorKind};
pub use freshness::{Freshness, FreshnessPolicy};
pub use hasher::KeyDerivation;
pub use payload::InitPayload;
pub use secret::{DerivedKey, SharedSecret};
pub use signer::InitDataSigner;
pub use user::WebAppUser;
pub use verifier::{InitDataVerifier, TrustedInitData, VerificationResult};

/// Domain-separation label mixed into the derived key
pub const WEB_APP_DATA_LABEL: &str = "WebAppData";

/// Field carrying the claimed tag; never part of the signed content
pub const HASH_FIELD: &str = "hash";

pub const AUTH_DATE_FIELD: &str = "auth_date";

/// Default freshness window in seconds
pub const DEFAULT_MAX_AGE_SECS: u64 = 600;

/// Default tolerance for `auth_date` values ahead of the local clock
pub const DEFAULT_FUTURE_SKEW_SECS: u64 = 30;
