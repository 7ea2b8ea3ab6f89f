// Shopline CLI — Secret store
//
// Namespaced record storage on top of a raw `SecretBackend`. Profile records
// live under `store:<name>`; anything else in the backend (the keyring
// index, foreign entries) is invisible to profile enumeration.

use super::opener::get_opener;
use super::record::{key_for, name_from_key};
use super::{BackendError, SecretBackend, SecretsError, StoreCredentials};
use crate::config::StoreConfig;

/// Outcome of reading one enumerated profile.
#[derive(Debug)]
pub enum StoredProfile {
    Loaded(StoreCredentials),
    /// The entry exists but could not be read or parsed.
    Skipped { name: String, reason: String },
}

pub struct SecretStore {
    backend: Box<dyn SecretBackend>,
}

impl SecretStore {
    /// Open the store through the process-wide opener with settings from the
    /// environment.
    pub fn open() -> Result<Self, SecretsError> {
        Self::open_with(&StoreConfig::from_env())
    }

    pub fn open_with(config: &StoreConfig) -> Result<Self, SecretsError> {
        let backend = get_opener()
            .open(config)
            .map_err(|e| SecretsError::Unavailable(e.to_string()))?;
        tracing::debug!(backend = backend.kind(), "Opened credential store");
        Ok(Self { backend })
    }

    pub fn with_backend(backend: Box<dyn SecretBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_kind(&self) -> &'static str {
        self.backend.kind()
    }

    // ─── Key-level operations ────────────────────────────────────────────────

    pub fn get(&self, key: &str) -> Result<StoreCredentials, SecretsError> {
        let data = self.backend.get(key).map_err(|e| match e {
            BackendError::NotFound => SecretsError::NotFound(display_name(key).to_string()),
            other => SecretsError::Unavailable(other.to_string()),
        })?;
        StoreCredentials::from_bytes(&data).map_err(|source| SecretsError::Corrupt {
            name: display_name(key).to_string(),
            source,
        })
    }

    pub fn set(&self, key: &str, record: &StoreCredentials) -> Result<(), SecretsError> {
        let data = record.to_bytes()?;
        self.backend
            .set(key, &data)
            .map_err(|e| SecretsError::Unavailable(e.to_string()))?;
        tracing::debug!(key, backend = self.backend.kind(), "Stored credentials");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), SecretsError> {
        self.backend.remove(key).map_err(|e| SecretsError::Remove {
            name: display_name(key).to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(key, backend = self.backend.kind(), "Removed credentials");
        Ok(())
    }

    pub fn keys(&self) -> Result<Vec<String>, SecretsError> {
        self.backend
            .keys()
            .map_err(|e| SecretsError::List(e.to_string()))
    }

    // ─── Profile-level operations ────────────────────────────────────────────

    pub fn load(&self, name: &str) -> Result<StoreCredentials, SecretsError> {
        self.get(&key_for(name))
    }

    /// Write `creds` under its own name, replacing any existing profile.
    pub fn save(&self, creds: &StoreCredentials) -> Result<(), SecretsError> {
        self.set(&creds.key(), creds)
    }

    pub fn delete(&self, name: &str) -> Result<(), SecretsError> {
        self.remove(&key_for(name))
    }

    /// Names of all stored profiles, sorted case-insensitively.
    pub fn profile_names(&self) -> Result<Vec<String>, SecretsError> {
        let mut names: Vec<String> = self
            .keys()?
            .iter()
            .filter_map(|key| name_from_key(key))
            .map(str::to_string)
            .collect();
        names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
        names.dedup();
        Ok(names)
    }

    /// Read every stored profile. A record that cannot be read is reported
    /// as [`StoredProfile::Skipped`] instead of failing the whole traversal.
    pub fn profiles(&self) -> Result<Vec<StoredProfile>, SecretsError> {
        let profiles = self
            .profile_names()?
            .into_iter()
            .map(|name| match self.load(&name) {
                Ok(creds) => StoredProfile::Loaded(creds),
                Err(e) => {
                    tracing::warn!(profile = %name, error = %e, "Skipping unreadable profile");
                    StoredProfile::Skipped {
                        name,
                        reason: e.to_string(),
                    }
                }
            })
            .collect();
        Ok(profiles)
    }

    /// Only the profiles that could be read.
    pub fn loaded_profiles(&self) -> Result<Vec<StoreCredentials>, SecretsError> {
        Ok(self
            .profiles()?
            .into_iter()
            .filter_map(|p| match p {
                StoredProfile::Loaded(creds) => Some(creds),
                StoredProfile::Skipped { .. } => None,
            })
            .collect())
    }
}

fn display_name(key: &str) -> &str {
    name_from_key(key).unwrap_or(key)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
