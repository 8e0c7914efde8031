//! Freshness window for `auth_date`

use crate::auth::{DEFAULT_FUTURE_SKEW_SECS, DEFAULT_MAX_AGE_SECS};

/// Outcome of a freshness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    /// Older than the window; `age` is in seconds
    Expired { age: i64 },
    /// Claims a time further ahead than the skew tolerance allows
    FromFuture { ahead: i64 },
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }

    /// Human-readable reason for a stale verdict
    pub fn reason(&self) -> Option<String> {
        match self {
            Freshness::Fresh => None,
            Freshness::Expired { age } => Some(format!("auth_date is {age}s old")),
            Freshness::FromFuture { ahead } => {
                Some(format!("auth_date is {ahead}s in the future"))
            }
        }
    }
}

/// Maximum age and future skew accepted for `auth_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    max_age_secs: i64,
    future_skew_secs: i64,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_MAX_AGE_SECS as i64,
            future_skew_secs: DEFAULT_FUTURE_SKEW_SECS as i64,
        }
    }
}

impl FreshnessPolicy {
    pub fn new(max_age_secs: u64, future_skew_secs: u64) -> Self {
        Self {
            max_age_secs: clamp_secs(max_age_secs),
            future_skew_secs: clamp_secs(future_skew_secs),
        }
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    pub fn future_skew_secs(&self) -> i64 {
        self.future_skew_secs
    }

    /// Fresh when `now - auth_date < max_age` and `auth_date <= now + skew`
    pub fn check(&self, auth_date: i64, now: i64) -> Freshness {
        let age = now.saturating_sub(auth_date);
        if age < 0 {
            let ahead = age.saturating_neg();
            if ahead > self.future_skew_secs {
                return Freshness::FromFuture { ahead };
            }
            return Freshness::Fresh;
        }
        if age < self.max_age_secs {
            Freshness::Fresh
        } else {
            Freshness::Expired { age }
        }
    }
}

fn clamp_secs(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}
