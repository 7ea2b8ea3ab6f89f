// Shopline CLI — Secret backend abstraction
//
// A backend is a flat key → bytes map living somewhere durable (the OS
// keyring, a file). The store layer on top handles profile keys and record
// (de)serialization, so backends never see a `StoreCredentials`.

use super::BackendError;

/// Narrow interface over a platform secret store.
pub trait SecretBackend: Send + Sync {
    /// Human-readable backend name for log lines.
    fn kind(&self) -> &'static str;

    /// Read the raw bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>, BackendError>;

    /// Store `data` under `key`, replacing any previous value.
    fn set(&self, key: &str, data: &[u8]) -> Result<(), BackendError>;

    /// Delete `key`. Must report [`BackendError::NotFound`] when absent.
    fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Every stored key, in no particular order.
    fn keys(&self) -> Result<Vec<String>, BackendError>;
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────

/// An in-memory backend with fault injection.
/// Used for unit tests so we don't touch the real platform keyring.
#[cfg(test)]
pub mod mock {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::secrets::StoreCredentials;

    #[derive(Default)]
    pub struct MemoryBackend {
        items: Mutex<BTreeMap<String, Vec<u8>>>,
        fail_keys: Option<BackendError>,
        fail_get: Option<BackendError>,
        fail_set: Option<BackendError>,
        fail_remove: Option<BackendError>,
    }

    impl MemoryBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// A backend pre-loaded with the given profiles.
        pub fn with_profiles(profiles: &[StoreCredentials]) -> Self {
            let backend = Self::new();
            for creds in profiles {
                backend.insert_raw(&creds.key(), &creds.to_bytes().unwrap());
            }
            backend
        }

        pub fn insert_raw(&self, key: &str, data: &[u8]) {
            self.items.lock().unwrap().insert(key.to_string(), data.to_vec());
        }

        pub fn failing_keys(mut self, err: BackendError) -> Self {
            self.fail_keys = Some(err);
            self
        }

        pub fn failing_get(mut self, err: BackendError) -> Self {
            self.fail_get = Some(err);
            self
        }

        pub fn failing_set(mut self, err: BackendError) -> Self {
            self.fail_set = Some(err);
            self
        }

        pub fn failing_remove(mut self, err: BackendError) -> Self {
            self.fail_remove = Some(err);
            self
        }
    }

    impl SecretBackend for MemoryBackend {
        fn kind(&self) -> &'static str {
            "memory"
        }

        fn get(&self, key: &str) -> Result<Vec<u8>, BackendError> {
            if let Some(err) = &self.fail_get {
                return Err(err.clone());
            }
            self.items
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or(BackendError::NotFound)
        }

        fn set(&self, key: &str, data: &[u8]) -> Result<(), BackendError> {
            if let Some(err) = &self.fail_set {
                return Err(err.clone());
            }
            self.insert_raw(key, data);
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), BackendError> {
            if let Some(err) = &self.fail_remove {
                return Err(err.clone());
            }
            self.items
                .lock()
                .unwrap()
                .remove(key)
                .map(|_| ())
                .ok_or(BackendError::NotFound)
        }

        fn keys(&self) -> Result<Vec<String>, BackendError> {
            if let Some(err) = &self.fail_keys {
                return Err(err.clone());
            }
            Ok(self.items.lock().unwrap().keys().cloned().collect())
        }
    }
}
