// Shopline CLI — CLI Command Handlers
//
// Opens the credential store once, then hands the parsed command to the auth
// facade. Dry-run login and remove are answered before the store is opened.
// `run` takes every collaborator explicitly so the whole command path can be
// driven from tests.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::auth::{preview_login, preview_remove, Auth, LoginRequest, TerminalTokenSource, TokenSource};
use crate::config::Settings;
use crate::error::CliError;
use crate::profile::Selector;
use crate::secrets::{SecretStore, SecretsError};

use super::{AuthCommand, Cli, Commands};

/// Execute the parsed CLI command against the real terminal and store.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::from_env();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut err = io::stderr();
    execute_with(
        cli,
        SecretStore::open,
        &settings,
        &mut out,
        &mut err,
        &mut TerminalTokenSource,
        Utc::now(),
    )
}

/// [`run`], opening the store with `open_store` only when the command needs it.
pub fn execute_with(
    cli: Cli,
    open_store: impl FnOnce() -> Result<SecretStore, SecretsError>,
    settings: &Settings,
    out: &mut dyn Write,
    err: &mut dyn Write,
    source: &mut dyn TokenSource,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    if cli.dry_run {
        match &cli.command {
            Commands::Auth(AuthCommand::Login {
                name,
                handle,
                no_browser,
            }) => {
                let request = login_request(name, handle, *no_browser, settings);
                preview_login(out, &request, source)?;
                return Ok(());
            }
            Commands::Auth(AuthCommand::Remove { name }) => {
                preview_remove(out, name)?;
                return Ok(());
            }
            Commands::Auth(AuthCommand::List | AuthCommand::Status) => {}
        }
    }

    let store = open_store()?;
    tracing::debug!(backend = store.backend_kind(), "Credential store ready");
    run(cli, &store, settings, out, err, source, now)
}

fn login_request(
    name: &Option<String>,
    handle: &Option<String>,
    no_browser: bool,
    settings: &Settings,
) -> LoginRequest {
    LoginRequest {
        name: name.clone(),
        handle: handle.clone(),
        no_browser: no_browser || settings.no_browser,
    }
}

pub fn run(
    cli: Cli,
    store: &SecretStore,
    settings: &Settings,
    out: &mut dyn Write,
    err: &mut dyn Write,
    source: &mut dyn TokenSource,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let auth = Auth::new(store)
        .with_aliases(settings.aliases.clone())
        .dry_run(cli.dry_run);

    match cli.command {
        Commands::Auth(AuthCommand::Login {
            name,
            handle,
            no_browser,
        }) => {
            let request = login_request(&name, &handle, no_browser, settings);
            auth.login(out, err, &request, source, now)?;
        }
        Commands::Auth(AuthCommand::List) => auth.list(out, now)?,
        Commands::Auth(AuthCommand::Remove { name }) => auth.remove(out, &name)?,
        Commands::Auth(AuthCommand::Status) => {
            let selector = Selector::new(cli.store.as_deref(), settings.store.as_deref());
            auth.status(out, &selector, now)?;
        }
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
