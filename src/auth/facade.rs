// Shopline CLI — Auth facade
//
// list / status / remove over the secret store. Login lives in `login.rs`.

use std::io::Write;

use chrono::{DateTime, Utc};

use super::AuthError;
use crate::profile::{ProfileError, ProfileResolver, Selector, StoreAliases};
use crate::rotation;
use crate::secrets::{SecretStore, StoredProfile};

pub struct Auth<'a> {
    pub(super) store: &'a SecretStore,
    pub(super) aliases: StoreAliases,
    pub(super) dry_run: bool,
}

impl<'a> Auth<'a> {
    pub fn new(store: &'a SecretStore) -> Self {
        Self {
            store,
            aliases: StoreAliases::default(),
            dry_run: false,
        }
    }

    pub fn with_aliases(mut self, aliases: StoreAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Report mutations instead of performing them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    // ─── List ────────────────────────────────────────────────────────────────

    /// One row per readable profile. Unreadable records are named below the
    /// table instead of failing the listing.
    pub fn list(&self, out: &mut dyn Write, now: DateTime<Utc>) -> Result<(), AuthError> {
        let profiles = self.store.profiles()?;
        if profiles.is_empty() {
            writeln!(out, "No store profiles configured. Use 'spl auth login' to add one.")?;
            return Ok(());
        }

        let mut rows: Vec<[String; 4]> = Vec::new();
        let mut skipped = Vec::new();
        for profile in profiles {
            match profile {
                StoredProfile::Loaded(creds) => rows.push([
                    creds.name().to_string(),
                    creds.handle().to_string(),
                    creds.created_at().format("%Y-%m-%d").to_string(),
                    creds.rotation_status(now).to_string(),
                ]),
                StoredProfile::Skipped { name, .. } => skipped.push(name),
            }
        }

        let header = ["NAME", "HANDLE", "CREATED", "STATUS"].map(String::from);
        let mut widths = header.clone().map(|h| h.len());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        for row in std::iter::once(&header).chain(&rows) {
            writeln!(
                out,
                "{:<w0$}  {:<w1$}  {:<w2$}  {}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            )?;
        }
        for name in skipped {
            writeln!(out, "Skipped unreadable profile: {}", name)?;
        }
        Ok(())
    }

    // ─── Status ──────────────────────────────────────────────────────────────

    /// Show the profile the current invocation would use.
    pub fn status(
        &self,
        out: &mut dyn Write,
        selector: &Selector,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let resolver = ProfileResolver::new(self.store).with_aliases(self.aliases.clone());
        let resolved = match resolver.resolve(selector) {
            Ok(resolved) => resolved,
            Err(ProfileError::NoProfiles) => {
                writeln!(out, "Not authenticated. Use 'spl auth login' to add a profile.")?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(note) = resolved.note() {
            writeln!(out, "{}", note)?;
        }

        let creds = &resolved.credentials;
        let status = creds.rotation_status(now);
        writeln!(out, "Profile: {}", creds.name())?;
        writeln!(out, "Handle: {}", creds.handle())?;
        writeln!(out, "Created: {}", creds.created_at().format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out, "Token: {}", creds.masked_token())?;
        writeln!(out, "Status: {}", status)?;
        if status.is_stale() {
            writeln!(out, "{}", rotation::stale_warning(creds.name()))?;
        }
        Ok(())
    }

    // ─── Remove ──────────────────────────────────────────────────────────────

    pub fn remove(&self, out: &mut dyn Write, name: &str) -> Result<(), AuthError> {
        if self.dry_run {
            return preview_remove(out, name);
        }
        self.store.delete(name)?;
        tracing::info!(profile = %name, "Removed store profile");
        writeln!(out, "Removed store profile: {}", name)?;
        Ok(())
    }
}

/// Report what a remove would delete. Needs no credential store.
pub fn preview_remove(out: &mut dyn Write, name: &str) -> Result<(), AuthError> {
    writeln!(out, "[DRY-RUN] Would remove store profile: {}", name)?;
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::test_support::{aged_creds, creds, store_with};
    use crate::secrets::{BackendError, MemoryBackend, SecretsError};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<(), AuthError>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_list_empty_state() {
        let store = store_with(&[]);
        let text = render(|out| Auth::new(&store).list(out, Utc::now()));
        assert!(
            text.starts_with("No store profiles configured"),
            "Zero profiles is an explicit message, not an empty table: {}",
            text
        );
    }

    #[test]
    fn test_list_rows_with_rotation_status() {
        let store = store_with(&[aged_creds("fresh", "fresh-shop", 1), aged_creds("old", "old-shop", 120)]);
        let text = render(|out| Auth::new(&store).list(out, Utc::now()));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].starts_with("fresh"));
        assert!(lines[1].contains("fresh-shop"));
        assert!(lines[1].ends_with("OK"));
        assert!(lines[2].starts_with("old"));
        assert!(lines[2].ends_with("ROTATE"));
    }

    #[test]
    fn test_list_never_shows_tokens() {
        let store = store_with(&[creds("demo", "demo-shop")]);
        let text = render(|out| Auth::new(&store).list(out, Utc::now()));
        assert!(!text.contains("token-for-demo"));
    }

    #[test]
    fn test_list_skips_corrupt_record() {
        let backend = MemoryBackend::with_profiles(&[creds("good", "g")]);
        backend.insert_raw("store:bad", b"}{");
        let store = SecretStore::with_backend(Box::new(backend));

        let text = render(|out| Auth::new(&store).list(out, Utc::now()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3, "{}", text);
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].starts_with("good"));
        assert_eq!(lines[2], "Skipped unreadable profile: bad");
    }

    #[test]
    fn test_list_only_corrupt_records_is_not_empty_state() {
        let backend = MemoryBackend::new();
        backend.insert_raw("store:broken", b"not json");
        backend.insert_raw("store:garbled", b"{\"name\":1}");
        let store = SecretStore::with_backend(Box::new(backend));

        let text = render(|out| Auth::new(&store).list(out, Utc::now()));
        assert!(
            !text.contains("No store profiles configured"),
            "Stored but unreadable profiles must not look like an empty store: {}",
            text
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "NAME  HANDLE  CREATED  STATUS",
                "Skipped unreadable profile: broken",
                "Skipped unreadable profile: garbled",
            ]
        );
    }

    #[test]
    fn test_list_enumeration_failure_is_list_error() {
        let store = SecretStore::with_backend(Box::new(
            MemoryBackend::new().failing_keys(BackendError::Failure("dbus".to_string())),
        ));
        let err = Auth::new(&store).list(&mut Vec::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, AuthError::Secrets(SecretsError::List(_))));
        assert!(err.to_string().starts_with("failed to list profiles"));
    }

    #[test]
    fn test_status_single_profile() {
        let store = store_with(&[creds("only-store", "only-handle")]);
        let text = render(|out| Auth::new(&store).status(out, &Selector::none(), Utc::now()));

        assert!(text.contains("Profile: only-store"), "{}", text);
        assert!(text.contains("Handle: only-handle"), "{}", text);
        assert!(text.contains("Status: OK"));
        assert!(!text.contains("Warning:"));
    }

    #[test]
    fn test_status_masks_token() {
        let store = store_with(&[creds("demo", "demo-shop")]);
        let text = render(|out| Auth::new(&store).status(out, &Selector::none(), Utc::now()));
        assert!(text.contains("Token: ****demo"), "{}", text);
        assert!(!text.contains("token-for-demo"));
    }

    #[test]
    fn test_status_without_profiles_is_not_authenticated() {
        let store = store_with(&[]);
        let text = render(|out| Auth::new(&store).status(out, &Selector::none(), Utc::now()));
        assert!(text.starts_with("Not authenticated"));
    }

    #[test]
    fn test_status_ambiguous_names_both() {
        let store = store_with(&[creds("store1", "h1"), creds("store2", "h2")]);
        let err = Auth::new(&store)
            .status(&mut Vec::new(), &Selector::none(), Utc::now())
            .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, AuthError::Profile(ProfileError::Ambiguous { .. })));
        assert!(msg.contains("store1") && msg.contains("store2"), "{}", msg);
    }

    #[test]
    fn test_status_with_explicit_selector() {
        let store = store_with(&[creds("store1", "h1"), creds("store2", "h2")]);
        let text = render(|out| {
            Auth::new(&store).status(out, &Selector::new(Some("h2"), None), Utc::now())
        });
        assert!(text.contains("Profile: store2"));
        assert!(text.contains("matched from \"h2\""));
    }

    #[test]
    fn test_status_warns_when_stale() {
        let store = store_with(&[aged_creds("old", "old-shop", 91)]);
        let text = render(|out| Auth::new(&store).status(out, &Selector::none(), Utc::now()));
        assert!(text.contains("Status: ROTATE"));
        assert!(text.contains("Warning: credentials for profile old are older than 90 days"));
    }

    #[test]
    fn test_remove_then_list() {
        let store = store_with(&[creds("keep", "k"), creds("drop", "d")]);
        let auth = Auth::new(&store);

        let text = render(|out| auth.remove(out, "drop"));
        assert_eq!(text, "Removed store profile: drop\n");

        let listing = render(|out| auth.list(out, Utc::now()));
        assert!(listing.contains("keep"));
        assert!(!listing.contains("drop"), "Removed profile must not be listed");
    }

    #[test]
    fn test_remove_missing_is_remove_error() {
        let store = store_with(&[]);
        let mut out = Vec::new();
        let err = Auth::new(&store).remove(&mut out, "ghost").unwrap_err();

        assert!(matches!(err, AuthError::Secrets(SecretsError::Remove { .. })));
        assert!(out.is_empty(), "No confirmation text on failure");
    }

    #[test]
    fn test_remove_dry_run_keeps_record() {
        let store = store_with(&[creds("demo", "h")]);
        let text = render(|out| Auth::new(&store).dry_run(true).remove(out, "demo"));

        assert_eq!(text, "[DRY-RUN] Would remove store profile: demo\n");
        assert!(store.load("demo").is_ok());
    }
}
