// Shopline CLI — Credential rotation policy
//
// Advisory only: a stale credential still works, it is just flagged in
// `auth list` / `auth status` and warned about when it is the active one.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Credentials older than this should be rotated.
pub const MAX_CREDENTIAL_AGE_DAYS: i64 = 90;

pub fn max_credential_age() -> Duration {
    Duration::days(MAX_CREDENTIAL_AGE_DAYS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStatus {
    Ok,
    Rotate,
}

impl RotationStatus {
    pub fn is_stale(self) -> bool {
        self == RotationStatus::Rotate
    }
}

impl fmt::Display for RotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationStatus::Ok => write!(f, "OK"),
            RotationStatus::Rotate => write!(f, "ROTATE"),
        }
    }
}

/// `Rotate` once the credential is strictly older than the maximum age.
/// Exactly 90 days old is still `Ok`; a `created_at` in the future is `Ok`.
pub fn classify(created_at: DateTime<Utc>, now: DateTime<Utc>) -> RotationStatus {
    if now.signed_duration_since(created_at) > max_credential_age() {
        RotationStatus::Rotate
    } else {
        RotationStatus::Ok
    }
}

/// The line printed when the active profile is stale.
pub fn stale_warning(profile: &str) -> String {
    format!(
        "Warning: credentials for profile {} are older than {} days. Consider rotating them with 'spl auth login'.",
        profile, MAX_CREDENTIAL_AGE_DAYS
    )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
