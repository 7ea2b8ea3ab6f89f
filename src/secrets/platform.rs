// Shopline CLI — OS keyring backend (platform-native secret store)
//
// Dispatches through the `keyring` crate to:
//   - Linux: D-Bus Secret Service (GNOME Keyring / KDE Wallet)
//   - macOS: Security.framework Keychain
//   - Windows: Windows Credential Manager
//
// Platform keyrings cannot enumerate their entries, so the backend keeps a
// JSON index of stored keys in a reserved entry next to them.

use std::collections::BTreeSet;

use super::{BackendError, SecretBackend};

/// Reserved keyring account holding the JSON array of stored keys.
pub const INDEX_ACCOUNT: &str = "__index__";

pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    /// Open the keyring for `service`, reading its index once so an unusable
    /// platform store fails here rather than on first write.
    pub fn open(service: &str) -> Result<Self, BackendError> {
        let backend = Self {
            service: service.to_string(),
        };
        backend.read_index()?;
        tracing::debug!(service, "Opened platform keyring");
        Ok(backend)
    }

    fn entry(&self, account: &str) -> Result<keyring::Entry, BackendError> {
        keyring::Entry::new(&self.service, account)
            .map_err(|e| BackendError::Unavailable(format!("failed to create keyring entry: {}", e)))
    }

    fn read_index(&self) -> Result<BTreeSet<String>, BackendError> {
        match self.entry(INDEX_ACCOUNT)?.get_secret() {
            Ok(data) => Ok(parse_index(&self.service, &data)),
            Err(keyring::Error::NoEntry) => Ok(BTreeSet::new()),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    fn write_index(&self, index: &BTreeSet<String>) -> Result<(), BackendError> {
        let data = serde_json::to_vec(index)
            .map_err(|e| BackendError::Failure(format!("failed to encode keyring index: {}", e)))?;
        self.entry(INDEX_ACCOUNT)?
            .set_secret(&data)
            .map_err(map_keyring_error)
    }
}

impl SecretBackend for KeyringBackend {
    fn kind(&self) -> &'static str {
        "keyring"
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, BackendError> {
        self.entry(key)?.get_secret().map_err(map_keyring_error)
    }

    fn set(&self, key: &str, data: &[u8]) -> Result<(), BackendError> {
        self.entry(key)?.set_secret(data).map_err(map_keyring_error)?;

        let mut index = self.read_index()?;
        if index.insert(key.to_string()) {
            self.write_index(&index)?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        let result = self.entry(key)?.delete_credential().map_err(map_keyring_error);

        // Drop the key from the index even when the entry itself was already
        // gone, so a stale index cannot keep listing it.
        if matches!(result, Ok(()) | Err(BackendError::NotFound)) {
            let mut index = self.read_index()?;
            if index.remove(key) {
                self.write_index(&index)?;
            }
        }
        result
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.read_index()?.into_iter().collect())
    }
}

/// A corrupt index reads as empty; the next `set` rewrites it.
fn parse_index(service: &str, data: &[u8]) -> BTreeSet<String> {
    match serde_json::from_slice(data) {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(service, error = %e, "Keyring index is corrupt; treating it as empty");
            BTreeSet::new()
        }
    }
}

fn map_keyring_error(err: keyring::Error) -> BackendError {
    match err {
        keyring::Error::NoEntry => BackendError::NotFound,
        keyring::Error::NoStorageAccess(e) => {
            BackendError::Unavailable(format!("no access to platform keyring: {}", e))
        }
        keyring::Error::PlatformFailure(e) => {
            BackendError::Unavailable(format!("platform keyring failure: {}", e))
        }
        other => BackendError::Failure(other.to_string()),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
