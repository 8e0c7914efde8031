//! Init data verification - parse, rebuild the check string, recompute the tag,
//! check freshness.
//!
//! Every call is an independent pure function of (payload, key, now). The
//! verifier holds no mutable state, so one instance can be cloned freely and
//! shared across threads.

use crate::auth::check_string::build_check_string;
use crate::auth::config::VerifierConfig;
use crate::auth::error::AuthError;
use crate::auth::freshness::FreshnessPolicy;
use crate::auth::hasher::{derive_key, verify_tag, KeyDerivation};
use crate::auth::payload::InitPayload;
use crate::auth::secret::{DerivedKey, SharedSecret};
use crate::auth::user::WebAppUser;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Verdict for one payload. Callers must require both flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// The tag matches the one recomputed from the shared secret
    pub authentic: bool,

    /// `auth_date` is inside the freshness window
    pub fresh: bool,

    /// Why the payload was rejected, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationResult {
    pub fn is_trusted(&self) -> bool {
        self.authentic && self.fresh
    }
}

/// Init data that passed both checks
///
/// Only [`InitDataVerifier::trusted`] constructs this, so holding one is proof
/// the payload was verified. Gate privileged downstream actions on it.
#[derive(Debug, Clone)]
pub struct TrustedInitData {
    payload: InitPayload,
    verified_at: i64,
}

impl TrustedInitData {
    pub fn payload(&self) -> &InitPayload {
        &self.payload
    }

    pub fn auth_date(&self) -> i64 {
        self.payload.auth_date()
    }

    pub fn query_id(&self) -> Option<&str> {
        self.payload.query_id()
    }

    pub fn user(&self) -> Result<Option<WebAppUser>, serde_json::Error> {
        self.payload.user()
    }

    /// Clock reading (Unix seconds) used for the freshness check
    pub fn verified_at(&self) -> i64 {
        self.verified_at
    }

    pub fn into_payload(self) -> InitPayload {
        self.payload
    }
}

/// Verifies init data against one shared secret
#[derive(Clone)]
pub struct InitDataVerifier {
    /// Derived once at construction and reused for every call
    key: Arc<DerivedKey>,

    freshness: FreshnessPolicy,
}

impl std::fmt::Debug for InitDataVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitDataVerifier")
            .field("key", &self.key)
            .field("freshness", &self.freshness)
            .finish()
    }
}

impl InitDataVerifier {
    /// Create a verifier with the default key derivation and freshness window
    pub fn new(secret: &SharedSecret) -> Self {
        Self::with_options(secret, KeyDerivation::default(), FreshnessPolicy::default())
    }

    pub fn with_options(
        secret: &SharedSecret,
        derivation: KeyDerivation,
        freshness: FreshnessPolicy,
    ) -> Self {
        info!(
            ?derivation,
            max_age_secs = freshness.max_age_secs(),
            future_skew_secs = freshness.future_skew_secs(),
            "Init data verifier ready"
        );

        InitDataVerifier {
            key: Arc::new(derive_key(secret, derivation)),
            freshness,
        }
    }

    /// Build from configuration, reading the bot token from the environment
    ///
    /// Fails with a configuration error when the token is missing; callers
    /// should treat that as fatal at startup.
    pub fn from_config(config: &VerifierConfig) -> Result<Self, AuthError> {
        config.validate()?;
        let secret = SharedSecret::from_env(&config.bot_token_env).inspect_err(|e| {
            e.log_if_security_critical();
        })?;
        Ok(Self::with_options(
            &secret,
            config.key_derivation,
            config.freshness_policy(),
        ))
    }

    pub fn freshness_policy(&self) -> FreshnessPolicy {
        self.freshness
    }

    /// Verify a URL-encoded `initData` string against the wall clock
    pub fn verify(&self, raw: &str) -> Result<VerificationResult, AuthError> {
        self.verify_at(raw, now_unix())
    }

    /// Verify a URL-encoded `initData` string at an explicit time
    pub fn verify_at(&self, raw: &str, now: i64) -> Result<VerificationResult, AuthError> {
        let payload = parse_logged(raw)?;
        Ok(self.verify_payload(&payload, now))
    }

    /// Verify an already-parsed payload at an explicit time
    pub fn verify_payload(&self, payload: &InitPayload, now: i64) -> VerificationResult {
        let check_string = build_check_string(payload);
        let authentic = verify_tag(&self.key, &check_string, payload.hash());
        let freshness = self.freshness.check(payload.auth_date(), now);
        let fresh = freshness.is_fresh();

        let mut reasons = Vec::new();
        if !authentic {
            reasons.push("signature mismatch".to_string());
        }
        if let Some(reason) = freshness.reason() {
            reasons.push(reason);
        }
        let reason = (!reasons.is_empty()).then(|| reasons.join("; "));

        match &reason {
            Some(reason) => warn!(
                auth_date = payload.auth_date(),
                authentic,
                fresh,
                "Init data not trusted: {}",
                reason
            ),
            None => debug!(
                auth_date = payload.auth_date(),
                fields = payload.len(),
                "Init data verified"
            ),
        }

        VerificationResult {
            authentic,
            fresh,
            reason,
        }
    }

    /// Verify and, only if trusted, hand back the payload as [`TrustedInitData`]
    pub fn trusted(&self, raw: &str) -> Result<Option<TrustedInitData>, AuthError> {
        self.trusted_at(raw, now_unix())
    }

    pub fn trusted_at(&self, raw: &str, now: i64) -> Result<Option<TrustedInitData>, AuthError> {
        let payload = parse_logged(raw)?;
        let result = self.verify_payload(&payload, now);
        Ok(result.is_trusted().then_some(TrustedInitData {
            payload,
            verified_at: now,
        }))
    }
}

fn parse_logged(raw: &str) -> Result<InitPayload, AuthError> {
    InitPayload::parse(raw).inspect_err(|e| {
        warn!("Rejected init data: {}", e);
    })
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
