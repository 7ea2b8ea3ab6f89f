// Shopline CLI — Secrets Module
//
// Store-profile credentials persisted in the platform's native secret store
// (Keychain / Credential Manager / Secret Service), with a file fallback for
// headless hosts. One entry per profile, keyed `store:<name>`.

mod backend;
mod error;
mod file;
mod opener;
mod platform;
mod record;
mod store;

pub use backend::SecretBackend;
pub use error::{BackendError, SecretsError};
pub use file::{FileBackend, KdfParams};
pub use opener::{get_opener, override_opener, set_opener, BackendOpener, OpenerGuard, PlatformOpener};
pub use platform::KeyringBackend;
pub use record::{key_for, name_from_key, StoreCredentials, ACCOUNT_PREFIX};
pub use store::{SecretStore, StoredProfile};

#[cfg(test)]
pub(crate) use backend::mock::MemoryBackend;
#[cfg(test)]
pub(crate) use opener::mock::{lock_global_opener, MemoryOpener};
#[cfg(test)]
pub(crate) use store::test_support;
