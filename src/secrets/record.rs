// Shopline CLI — Store credential record
//
// SECURITY: `access_token` is private and never appears in Debug or Display
// output. It is wiped from memory when the record is dropped.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::rotation::{self, RotationStatus};

/// Prefix for every store-profile key in the secure store.
pub const ACCOUNT_PREFIX: &str = "store:";

/// Authentication data for one store profile.
///
/// Records are immutable once written: a re-login replaces the whole record
/// (with a fresh `created_at`), there is no in-place update.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreCredentials {
    name: String,
    handle: String,
    access_token: String,
    created_at: DateTime<Utc>,
}

impl StoreCredentials {
    pub fn new(
        name: impl Into<String>,
        handle: impl Into<String>,
        access_token: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            access_token: access_token.into(),
            created_at,
        }
    }

    /// A fresh record stamped with the current time.
    pub fn issue(
        name: impl Into<String>,
        handle: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self::new(name, handle, access_token, Utc::now())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The raw bearer token. Only the API client constructor should need this.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Token with everything but the last four characters masked.
    /// Short tokens are masked entirely.
    pub fn masked_token(&self) -> String {
        let chars: Vec<char> = self.access_token.chars().collect();
        if chars.len() < 8 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }

    /// The secure-store key this record lives under.
    pub fn key(&self) -> String {
        key_for(&self.name)
    }

    pub fn rotation_status(&self, now: DateTime<Utc>) -> RotationStatus {
        rotation::classify(self.created_at, now)
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }
}

/// Build the secure-store key for a profile name.
pub fn key_for(name: &str) -> String {
    format!("{}{}", ACCOUNT_PREFIX, name)
}

/// Extract the profile name from a secure-store key, if it is a profile key.
pub fn name_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(ACCOUNT_PREFIX).filter(|name| !name.is_empty())
}

impl Drop for StoreCredentials {
    fn drop(&mut self) {
        self.access_token.zeroize();
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("access_token", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl fmt::Display for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.handle)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
