// Shopline CLI — Login
//
// Obtaining the token is delegated to a `TokenSource`; everything after that
// (normalisation, validation, persistence) is the same whichever source is
// used.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::{Auth, AuthError};
use crate::profile::{is_service_label, normalize_handle};
use crate::secrets::StoreCredentials;

/// Merchant admin page where an access token can be created.
pub fn admin_url(handle: &str) -> String {
    format!("https://admin.shoplineapp.com/admin/{}/", handle)
}

/// Store handles are ASCII letters, digits and hyphens.
pub fn validate_handle(handle: &str) -> Result<(), AuthError> {
    if handle.is_empty() {
        return Err(AuthError::Login("store handle is required".to_string()));
    }
    if !handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(AuthError::Login(format!(
            "invalid store handle '{}': use letters, digits and hyphens only",
            handle
        )));
    }
    if is_service_label(handle) {
        return Err(AuthError::Login(format!(
            "'{}' is a Shopline service host, not a store handle",
            handle
        )));
    }
    Ok(())
}

/// Arguments to `spl auth login`.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    /// Profile name; defaults to the handle.
    pub name: Option<String>,
    /// Store handle or admin URL; prompted for when absent.
    pub handle: Option<String>,
    pub no_browser: bool,
}

/// Where login gets its interactive input from.
pub trait TokenSource {
    /// Ask for the store handle when none was given on the command line.
    fn read_handle(&mut self) -> Result<String, AuthError>;

    /// Obtain an access token for `handle`.
    fn read_token(&mut self, handle: &str, open_browser: bool) -> Result<Zeroizing<String>, AuthError>;
}

/// Prompts on the terminal. Prompts go to stderr, the token is read without
/// echo.
pub struct TerminalTokenSource;

impl TokenSource for TerminalTokenSource {
    fn read_handle(&mut self) -> Result<String, AuthError> {
        eprint!("Store handle: ");
        io::stderr().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn read_token(&mut self, handle: &str, open_browser: bool) -> Result<Zeroizing<String>, AuthError> {
        let url = admin_url(handle);
        eprintln!("Create an access token in your store admin: {}", url);
        if open_browser {
            if let Err(e) = open::that(&url) {
                tracing::warn!(error = %e, "Could not open a browser");
                eprintln!("Could not open a browser; visit the URL above.");
            }
        }
        let token = rpassword::prompt_password("Access token: ")
            .map_err(|e| AuthError::Login(format!("failed to read access token: {}", e)))?;
        Ok(Zeroizing::new(token))
    }
}

impl LoginRequest {
    /// The profile name and bare handle this request targets, prompting for
    /// the handle when none was given.
    fn target(&self, source: &mut dyn TokenSource) -> Result<(String, String), AuthError> {
        let raw_handle = match self.handle.as_deref().map(str::trim) {
            Some(handle) if !handle.is_empty() => handle.to_string(),
            _ => source.read_handle()?,
        };
        let handle = normalize_handle(&raw_handle);
        validate_handle(&handle)?;

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(handle.as_str())
            .to_string();
        Ok((name, handle))
    }
}

/// Report what a login would save. Needs no credential store and never asks
/// for a token.
pub fn preview_login(
    out: &mut dyn Write,
    request: &LoginRequest,
    source: &mut dyn TokenSource,
) -> Result<(), AuthError> {
    let (name, handle) = request.target(source)?;
    writeln!(out, "[DRY-RUN] Would save store profile: {} ({})", name, handle)?;
    Ok(())
}

impl Auth<'_> {
    /// Write a new record for the store, replacing any profile of the same
    /// name. Warnings go to `err`.
    pub fn login(
        &self,
        out: &mut dyn Write,
        err: &mut dyn Write,
        request: &LoginRequest,
        source: &mut dyn TokenSource,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        if self.dry_run {
            return preview_login(out, request, source);
        }
        let (name, handle) = request.target(source)?;

        let token = source.read_token(&handle, !request.no_browser)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Login("access token is required".to_string()));
        }

        self.warn_on_collision(err, &name, &handle)?;

        let creds = StoreCredentials::new(name.as_str(), handle.as_str(), token, now);
        self.store.save(&creds)?;
        tracing::info!(profile = %name, handle = %handle, "Saved store profile");

        writeln!(out, "Successfully added store: {}", creds)?;
        writeln!(
            out,
            "Use --store {} (or SHOPLINE_STORE) to select it; check it with 'spl auth status'.",
            name
        )?;
        Ok(())
    }

    /// Name lookup wins over handle lookup, so a profile whose handle equals
    /// another profile's name can only be reached by its own name.
    fn warn_on_collision(&self, err: &mut dyn Write, name: &str, handle: &str) -> Result<(), AuthError> {
        let others = match self.store.loaded_profiles() {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping collision check");
                return Ok(());
            }
        };

        for other in others.iter().filter(|p| p.name() != name) {
            if other.name() == handle {
                writeln!(
                    err,
                    "Warning: handle \"{}\" is also the name of profile \"{}\"; --store {} selects that profile.",
                    handle,
                    other.name(),
                    handle
                )?;
            }
            if other.handle() == name {
                writeln!(
                    err,
                    "Warning: profile name \"{}\" is also the handle of profile \"{}\"; --store {} will select this profile.",
                    name,
                    other.name(),
                    name
                )?;
            }
        }
        Ok(())
    }
}


// ─── Tests ───────────────────────────────────────────────────────────────────
