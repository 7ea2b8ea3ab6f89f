// Shopline CLI — Client runtime
//
// The one entry point resource commands use: resolve the active profile and
// hand its handle and token to an API client constructor.

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::error::CliError;
use crate::profile::{ProfileResolver, Selector};
use crate::rotation;
use crate::secrets::SecretStore;

/// Builds an API client from a store handle and access token.
pub trait ClientFactory {
    type Client;

    /// `handle` is empty when the token came straight from the environment.
    fn build(&self, handle: &str, access_token: &str) -> Self::Client;
}

/// Resolve credentials for this invocation and build a client.
///
/// With no `--store` and no `SHOPLINE_STORE`, a token in
/// `SHOPLINE_ACCESS_TOKEN` (or its aliases) is used without opening the
/// credential store at all. Notes and stale warnings go to `diag`.
pub fn get_client<F: ClientFactory>(
    store_flag: Option<&str>,
    settings: &Settings,
    factory: &F,
    diag: &mut dyn Write,
) -> Result<F::Client, CliError> {
    let selector = Selector::new(store_flag, settings.store.as_deref());
    if !selector.is_set() {
        if let Some(token) = settings.direct_token.as_deref() {
            tracing::debug!("Using access token from the environment");
            return Ok(factory.build("", token));
        }
    }

    let store = SecretStore::open()?;
    client_from_store(&store, &selector, settings, factory, diag, Utc::now())
}

/// [`get_client`] against an already-open store.
pub fn client_from_store<F: ClientFactory>(
    store: &SecretStore,
    selector: &Selector,
    settings: &Settings,
    factory: &F,
    diag: &mut dyn Write,
    now: DateTime<Utc>,
) -> Result<F::Client, CliError> {
    let resolved = ProfileResolver::new(store)
        .with_aliases(settings.aliases.clone())
        .resolve(selector)?;

    if let Some(note) = resolved.note() {
        writeln!(diag, "{}", note)?;
    }
    let creds = &resolved.credentials;
    if creds.rotation_status(now).is_stale() {
        writeln!(diag, "{}", rotation::stale_warning(creds.name()))?;
    }

    tracing::debug!(profile = %creds.name(), source = ?resolved.source, "Resolved store profile");
    Ok(factory.build(creds.handle(), creds.access_token()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
