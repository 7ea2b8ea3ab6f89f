// Shopline CLI — Backend opener
//
// The opener decides which concrete backend a `SecretStore` talks to. It is
// a process-wide slot because the platform keyring is genuinely global, but
// it holds a strategy object rather than a bare function so tests can swap
// in an isolated backend and put the previous opener back on teardown.

use std::sync::{mpsc, Arc, LazyLock, RwLock};
use std::thread;
use std::time::Duration;

use super::file::FileBackend;
use super::platform::KeyringBackend;
use super::{BackendError, SecretBackend};
use crate::config::{BackendChoice, StoreConfig, ENV_KEYRING_PASSPHRASE, SERVICE_NAME};

/// Strategy for opening a secret backend from a [`StoreConfig`].
pub trait BackendOpener: Send + Sync {
    fn open(&self, config: &StoreConfig) -> Result<Box<dyn SecretBackend>, BackendError>;
}

/// Production opener: the OS keyring, or the file backend when configured
/// (or when headless Linux was detected).
pub struct PlatformOpener;

impl BackendOpener for PlatformOpener {
    fn open(&self, config: &StoreConfig) -> Result<Box<dyn SecretBackend>, BackendError> {
        match config.backend {
            BackendChoice::Keyring => {
                let service = config.service_name.clone();
                open_keyring_or_fallback(config, move || {
                    KeyringBackend::open(&service).map(|b| Box::new(b) as Box<dyn SecretBackend>)
                })
            }
            BackendChoice::File => open_file(config),
        }
    }
}

fn open_file(config: &StoreConfig) -> Result<Box<dyn SecretBackend>, BackendError> {
    let passphrase = match config.file_passphrase.as_deref() {
        Some(passphrase) => passphrase.as_str(),
        None => {
            tracing::warn!(
                "Using default keyring passphrase; set {} for encryption at rest",
                ENV_KEYRING_PASSPHRASE
            );
            SERVICE_NAME
        }
    };
    Ok(Box::new(FileBackend::open(&config.file_dir, passphrase)?))
}

/// Open the platform keyring within `config.keyring_timeout`. A Secret
/// Service that never answers falls back to the file backend, but only when
/// a passphrase was configured for it.
fn open_keyring_or_fallback<F>(config: &StoreConfig, open_keyring: F) -> Result<Box<dyn SecretBackend>, BackendError>
where
    F: FnOnce() -> Result<Box<dyn SecretBackend>, BackendError> + Send + 'static,
{
    match with_timeout(config.keyring_timeout, open_keyring) {
        Err(BackendError::TimedOut) if config.file_passphrase.is_some() => {
            tracing::warn!(
                dir = %config.file_dir.display(),
                "System keyring timed out; falling back to the file backend"
            );
            open_file(config)
        }
        Err(BackendError::TimedOut) => Err(BackendError::Unavailable(format!(
            "system keyring timed out; set {} to enable file backend fallback",
            ENV_KEYRING_PASSPHRASE
        ))),
        other => other,
    }
}

/// Run `open` on a helper thread and give up after `timeout`. The thread is
/// left to finish on its own; its result is dropped.
fn with_timeout<T, F>(timeout: Option<Duration>, open: F) -> Result<T, BackendError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BackendError> + Send + 'static,
{
    let Some(timeout) = timeout else {
        return open();
    };

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("keyring-open".to_string())
        .spawn(move || {
            let _ = tx.send(open());
        })
        .map_err(|e| BackendError::Unavailable(format!("failed to start keyring thread: {}", e)))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(BackendError::TimedOut),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(BackendError::Unavailable(
            "keyring thread exited without a result".to_string(),
        )),
    }
}

static OPENER: LazyLock<RwLock<Arc<dyn BackendOpener>>> =
    LazyLock::new(|| RwLock::new(Arc::new(PlatformOpener) as Arc<dyn BackendOpener>));

/// The opener currently installed for this process.
pub fn get_opener() -> Arc<dyn BackendOpener> {
    match OPENER.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

/// Install `opener` for this process, returning the one it replaced.
pub fn set_opener(opener: Arc<dyn BackendOpener>) -> Arc<dyn BackendOpener> {
    let mut guard = match OPENER.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    std::mem::replace(&mut *guard, opener)
}

/// Install `opener` until the returned guard is dropped.
pub fn override_opener(opener: Arc<dyn BackendOpener>) -> OpenerGuard {
    OpenerGuard {
        previous: Some(set_opener(opener)),
    }
}

/// Restores the previously installed opener on drop.
#[must_use = "the previous opener is restored as soon as the guard is dropped"]
pub struct OpenerGuard {
    previous: Option<Arc<dyn BackendOpener>>,
}

impl Drop for OpenerGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            set_opener(previous);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
