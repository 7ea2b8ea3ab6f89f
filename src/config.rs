// Shopline CLI — Configuration
//
// Everything here is read from the environment and platform directories.
// Lookups go through a `Fn(&str) -> Option<String>` so tests can feed a
// fixed map instead of mutating the process environment.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::profile::StoreAliases;

/// Service name used to identify entries in the platform keyring.
pub const SERVICE_NAME: &str = "shopline-cli";

pub const ENV_STORE: &str = "SHOPLINE_STORE";
pub const ENV_STORE_ALIASES: &str = "SHOPLINE_STORE_ALIASES";
pub const ENV_KEYRING_BACKEND: &str = "SHOPLINE_KEYRING_BACKEND";
pub const ENV_CREDENTIALS_DIR: &str = "SHOPLINE_CREDENTIALS_DIR";
pub const ENV_KEYRING_PASSPHRASE: &str = "SHOPLINE_KEYRING_PASSPHRASE";
pub const ENV_DBUS_SESSION: &str = "DBUS_SESSION_BUS_ADDRESS";

/// How long opening the Linux Secret Service may block before giving up.
pub const KEYRING_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Direct-token variables, in precedence order.
pub const ENV_DIRECT_TOKENS: [&str; 3] =
    ["SHOPLINE_ACCESS_TOKEN", "SHOPLINE_API_TOKEN", "SHOPLINE_TOKEN"];

pub const ENV_NO_BROWSER: [&str; 2] = ["SHOPLINE_NO_BROWSER", "NO_BROWSER"];

// ─── Store backend configuration ─────────────────────────────────────────────

/// Which secret backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    Keyring,
    File,
}

/// Everything a [`BackendOpener`](crate::secrets::BackendOpener) needs.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub service_name: String,
    /// Directory for the file backend.
    pub file_dir: PathBuf,
    pub backend: BackendChoice,
    /// Passphrase the file backend encrypts with. `None` means the built-in
    /// default, which only obscures the file.
    pub file_passphrase: Option<Zeroizing<String>>,
    /// Upper bound on opening the platform keyring. `None` waits forever.
    pub keyring_timeout: Option<Duration>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let requested = lookup(ENV_KEYRING_BACKEND)
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let backend = match requested.as_str() {
            "keyring" => BackendChoice::Keyring,
            "file" => BackendChoice::File,
            "" | "auto" => auto_backend(std::env::consts::OS, lookup(ENV_DBUS_SESSION).as_deref()),
            other => {
                tracing::warn!(value = other, "Unknown {}; using auto detection", ENV_KEYRING_BACKEND);
                auto_backend(std::env::consts::OS, lookup(ENV_DBUS_SESSION).as_deref())
            }
        };

        Self {
            service_name: SERVICE_NAME.to_string(),
            file_dir: credentials_dir(&lookup).join("keyring"),
            backend,
            file_passphrase: lookup(ENV_KEYRING_PASSPHRASE)
                .filter(|p| !p.is_empty())
                .map(Zeroizing::new),
            keyring_timeout: cfg!(target_os = "linux").then_some(KEYRING_OPEN_TIMEOUT),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("service_name", &self.service_name)
            .field("file_dir", &self.file_dir)
            .field("backend", &self.backend)
            .field("file_passphrase", &self.file_passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("keyring_timeout", &self.keyring_timeout)
            .finish()
    }
}

/// Headless Linux (no D-Bus session) has no Secret Service to talk to.
pub fn auto_backend(os: &str, dbus_session: Option<&str>) -> BackendChoice {
    let headless = dbus_session.map(str::trim).unwrap_or_default().is_empty();
    if os == "linux" && headless {
        BackendChoice::File
    } else {
        BackendChoice::Keyring
    }
}

/// Default directory for credential files.
fn credentials_dir(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = lookup(ENV_CREDENTIALS_DIR).filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(SERVICE_NAME)
}

// ─── Invocation settings ─────────────────────────────────────────────────────

/// Per-invocation settings consumed by the resolver and login flow.
#[derive(Default)]
pub struct Settings {
    /// Value of `SHOPLINE_STORE`, if set and non-blank.
    pub store: Option<String>,
    pub aliases: StoreAliases,
    /// First non-blank direct access token variable.
    pub direct_token: Option<Zeroizing<String>>,
    pub no_browser: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            store: non_blank(ENV_STORE).map(|v| v.trim().to_string()),
            aliases: non_blank(ENV_STORE_ALIASES)
                .map(|raw| StoreAliases::parse(&raw))
                .unwrap_or_default(),
            direct_token: ENV_DIRECT_TOKENS
                .iter()
                .find_map(|name| non_blank(*name))
                .map(|token| Zeroizing::new(token.trim().to_string())),
            no_browser: ENV_NO_BROWSER
                .iter()
                .filter_map(|name| lookup(*name))
                .any(|v| is_truthy(&v)),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("store", &self.store)
            .field("aliases", &self.aliases)
            .field("direct_token", &self.direct_token.as_ref().map(|_| "[REDACTED]"))
            .field("no_browser", &self.no_browser)
            .finish()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
