// Shopline CLI — Profile resolver
//
// Precedence: `--store` flag, then SHOPLINE_STORE, then auto-select when
// exactly one profile exists. A selector is tried as a profile name first and
// only then matched against handles.

use super::alias::StoreAliases;
use super::error::ProfileError;
use super::matching;
use crate::secrets::{SecretStore, SecretsError, StoreCredentials};

/// Where the selector that picked the profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorSource {
    Flag,
    Env,
    AutoSelected,
}

/// How a selector was matched to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The selector is the profile name.
    ExactName,
    /// The selector is the profile's handle.
    Handle,
    /// Host, URL or prefix form of the name or handle.
    Lenient,
}

/// Explicit selectors for one invocation. Blank values count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    flag: Option<String>,
    env: Option<String>,
}

impl Selector {
    pub fn new(flag: Option<&str>, env: Option<&str>) -> Self {
        Self {
            flag: non_blank(flag),
            env: non_blank(env),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// The selector that wins, if any.
    pub fn active(&self) -> Option<(&str, SelectorSource)> {
        self.flag
            .as_deref()
            .map(|s| (s, SelectorSource::Flag))
            .or_else(|| self.env.as_deref().map(|s| (s, SelectorSource::Env)))
    }

    pub fn is_set(&self) -> bool {
        self.active().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The single profile chosen for this invocation.
#[derive(Debug)]
pub struct ResolvedProfile {
    pub credentials: StoreCredentials,
    pub source: SelectorSource,
    pub matched_by: MatchKind,
    /// The selector as typed, before alias expansion.
    pub requested: Option<String>,
    /// Every profile name seen during resolution. Empty when the profile was
    /// found by name without enumerating.
    pub known_names: Vec<String>,
}

impl ResolvedProfile {
    /// A one-line note for stderr when the selector did not name the profile
    /// directly.
    pub fn note(&self) -> Option<String> {
        let requested = self.requested.as_deref()?;
        if self.matched_by == MatchKind::ExactName && requested == self.credentials.name() {
            return None;
        }
        Some(format!(
            "Using profile \"{}\" (matched from \"{}\")",
            self.credentials.name(),
            requested
        ))
    }
}

pub struct ProfileResolver<'a> {
    store: &'a SecretStore,
    aliases: StoreAliases,
}

impl<'a> ProfileResolver<'a> {
    pub fn new(store: &'a SecretStore) -> Self {
        Self {
            store,
            aliases: StoreAliases::default(),
        }
    }

    pub fn with_aliases(mut self, aliases: StoreAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn resolve(&self, selector: &Selector) -> Result<ResolvedProfile, ProfileError> {
        match selector.active() {
            Some((requested, source)) => self.resolve_selector(requested, source),
            None => self.auto_select(),
        }
    }

    fn resolve_selector(
        &self,
        requested: &str,
        source: SelectorSource,
    ) -> Result<ResolvedProfile, ProfileError> {
        let target = self.aliases.expand(requested);
        if target != requested {
            tracing::debug!(alias = requested, expanded = target, "Expanded store alias");
        }

        match self.store.load(target) {
            Ok(credentials) => {
                return Ok(ResolvedProfile {
                    credentials,
                    source,
                    matched_by: MatchKind::ExactName,
                    requested: Some(requested.to_string()),
                    known_names: Vec::new(),
                });
            }
            Err(SecretsError::NotFound(_)) => {
                tracing::debug!(selector = target, "No profile by that name, scanning handles");
            }
            Err(e) => return Err(e.into()),
        }

        let profiles = self.store.loaded_profiles()?;
        let known_names: Vec<String> = profiles.iter().map(|c| c.name().to_string()).collect();

        let (found, matched_by) = match pick_by_handle(target, &profiles) {
            Some(found) => (found, MatchKind::Handle),
            None => {
                let matches = matching::find_matches(target, &profiles);
                match matches.as_slice() {
                    [only] => (*only, MatchKind::Lenient),
                    _ => {
                        return Err(ProfileError::NotFound {
                            selector: requested.to_string(),
                            candidates: matches.iter().map(|c| c.name().to_string()).collect(),
                        });
                    }
                }
            }
        };

        Ok(ResolvedProfile {
            credentials: found.clone(),
            source,
            matched_by,
            requested: Some(requested.to_string()),
            known_names,
        })
    }

    fn auto_select(&self) -> Result<ResolvedProfile, ProfileError> {
        let names = self.store.profile_names()?;
        if names.len() > 1 {
            return Err(ProfileError::Ambiguous { names });
        }
        let Some(only) = names.first() else {
            return Err(ProfileError::NoProfiles);
        };
        let credentials = self.store.load(only)?;
        tracing::debug!(profile = %only, "Auto-selected the only store profile");
        Ok(ResolvedProfile {
            credentials,
            source: SelectorSource::AutoSelected,
            matched_by: MatchKind::ExactName,
            requested: None,
            known_names: names,
        })
    }
}

/// The single record whose handle equals `selector` exactly. Several records
/// sharing a handle is left to lenient matching, which reports them all.
fn pick_by_handle<'p>(selector: &str, profiles: &'p [StoreCredentials]) -> Option<&'p StoreCredentials> {
    let mut hits = profiles.iter().filter(|c| c.handle() == selector);
    let first = hits.next()?;
    match hits.next() {
        Some(_) => None,
        None => Some(first),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::test_support::{creds, store_with};
    use crate::secrets::{BackendError, MemoryBackend};

    fn resolve(store: &SecretStore, flag: Option<&str>, env: Option<&str>) -> Result<ResolvedProfile, ProfileError> {
        ProfileResolver::new(store).resolve(&Selector::new(flag, env))
    }

    #[test]
    fn test_zero_profiles_is_no_profiles() {
        let store = store_with(&[]);
        let err = resolve(&store, None, None).unwrap_err();
        assert!(matches!(err, ProfileError::NoProfiles));
        assert!(err.to_string().contains("spl auth login"));
    }

    #[test]
    fn test_single_profile_is_auto_selected() {
        let store = store_with(&[creds("only-store", "only-handle")]);
        let resolved = resolve(&store, None, None).unwrap();

        assert_eq!(resolved.credentials.name(), "only-store");
        assert_eq!(resolved.credentials.handle(), "only-handle");
        assert_eq!(resolved.source, SelectorSource::AutoSelected);
        assert_eq!(resolved.known_names, vec!["only-store"]);
        assert!(resolved.note().is_none());
    }

    #[test]
    fn test_two_profiles_without_selector_is_ambiguous() {
        let store = store_with(&[creds("store2", "h2"), creds("store1", "h1")]);
        match resolve(&store, None, None) {
            Err(ProfileError::Ambiguous { names }) => {
                assert_eq!(names, vec!["store1", "store2"], "Both names listed in order");
            }
            other => panic!("expected Ambiguous, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_lists_every_profile() {
        for count in 2..=5 {
            let profiles: Vec<_> = (1..=count)
                .rev()
                .map(|i| creds(&format!("store{}", i), &format!("h{}", i)))
                .collect();
            let store = store_with(&profiles);
            let expected: Vec<String> = (1..=count).map(|i| format!("store{}", i)).collect();

            let err = resolve(&store, None, None).unwrap_err();
            let msg = err.to_string();
            match err {
                ProfileError::Ambiguous { names } => assert_eq!(names, expected, "{} profiles", count),
                other => panic!("{} profiles: expected Ambiguous, got {:?}", count, other),
            }
            for name in &expected {
                assert!(msg.contains(name.as_str()), "{} missing from {:?}", name, msg);
            }
        }
    }

    #[test]
    fn test_flag_beats_env() {
        let store = store_with(&[creds("a", "ha"), creds("b", "hb")]);
        let resolved = resolve(&store, Some("a"), Some("b")).unwrap();
        assert_eq!(resolved.credentials.name(), "a");
        assert_eq!(resolved.source, SelectorSource::Flag);
    }

    #[test]
    fn test_env_used_when_flag_absent() {
        let store = store_with(&[creds("a", "ha"), creds("b", "hb")]);
        let resolved = resolve(&store, None, Some("b")).unwrap();
        assert_eq!(resolved.credentials.name(), "b");
        assert_eq!(resolved.source, SelectorSource::Env);
    }

    #[test]
    fn test_blank_selectors_fall_through() {
        let store = store_with(&[creds("only", "h")]);
        let resolved = resolve(&store, Some("  "), Some("")).unwrap();
        assert_eq!(resolved.source, SelectorSource::AutoSelected);
    }

    #[test]
    fn test_explicit_selector_skips_auto_select_with_many_profiles() {
        let store = store_with(&[creds("a", "ha"), creds("b", "hb"), creds("c", "hc")]);
        assert_eq!(resolve(&store, Some("c"), None).unwrap().credentials.name(), "c");
    }

    #[test]
    fn test_flag_matches_by_handle_after_name_miss() {
        let store = store_with(&[creds("primary", "demo-shop"), creds("other", "other-shop")]);
        let resolved = resolve(&store, Some("demo-shop"), None).unwrap();

        assert_eq!(resolved.credentials.name(), "primary");
        assert_eq!(resolved.matched_by, MatchKind::Handle);
        assert_eq!(resolved.known_names, vec!["other", "primary"]);
        assert_eq!(
            resolved.note().unwrap(),
            "Using profile \"primary\" (matched from \"demo-shop\")"
        );
    }

    #[test]
    fn test_env_matches_by_handle_after_name_miss() {
        let store = store_with(&[creds("primary", "demo-shop"), creds("other", "other-shop")]);
        let resolved = resolve(&store, None, Some("other-shop")).unwrap();
        assert_eq!(resolved.credentials.name(), "other");
        assert_eq!(resolved.source, SelectorSource::Env);
    }

    #[test]
    fn test_name_wins_over_another_profiles_handle() {
        // "x" is a profile name and also the handle of a different profile.
        let store = store_with(&[creds("x", "hx"), creds("y", "x")]);
        let resolved = resolve(&store, Some("x"), None).unwrap();
        assert_eq!(resolved.credentials.name(), "x");
        assert_eq!(resolved.matched_by, MatchKind::ExactName);
    }

    #[test]
    fn test_unknown_selector_is_not_found() {
        let store = store_with(&[creds("a", "ha")]);
        match resolve(&store, Some("ghost"), None) {
            Err(ProfileError::NotFound { selector, candidates }) => {
                assert_eq!(selector, "ghost");
                assert!(candidates.is_empty());
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_env_selector_is_not_found() {
        let store = store_with(&[creds("a", "ha"), creds("b", "hb")]);
        assert!(matches!(
            resolve(&store, None, Some("ghost")),
            Err(ProfileError::NotFound { .. })
        ));
    }

    #[test]
    fn test_lenient_host_selector() {
        let store = store_with(&[creds("primary", "demo"), creds("other", "other")]);
        let resolved = resolve(&store, Some("demo.myshopline.com"), None).unwrap();
        assert_eq!(resolved.credentials.name(), "primary");
        assert_eq!(resolved.matched_by, MatchKind::Lenient);
    }

    #[test]
    fn test_lenient_admin_url_selector() {
        let store = store_with(&[creds("primary", "demo")]);
        let resolved = resolve(&store, Some("https://admin.shoplineapp.com/admin/demo/"), None).unwrap();
        assert_eq!(resolved.credentials.name(), "primary");
    }

    #[test]
    fn test_ambiguous_prefix_reports_candidates() {
        let store = store_with(&[creds("a", "demo-one"), creds("b", "demo-two")]);
        match resolve(&store, Some("demo"), None) {
            Err(ProfileError::NotFound { candidates, .. }) => {
                assert_eq!(candidates, vec!["a", "b"]);
            }
            other => panic!("expected NotFound with candidates, got {:?}", other),
        }
    }

    #[test]
    fn test_alias_expands_before_lookup() {
        let store = store_with(&[creds("demoshop", "h1"), creds("other", "h2")]);
        let resolved = ProfileResolver::new(&store)
            .with_aliases(StoreAliases::parse("ds:demoshop"))
            .resolve(&Selector::new(Some("ds"), None))
            .unwrap();
        assert_eq!(resolved.credentials.name(), "demoshop");
        assert_eq!(resolved.requested.as_deref(), Some("ds"));
        assert!(resolved.note().unwrap().contains("matched from \"ds\""));
    }

    #[test]
    fn test_corrupt_named_record_is_surfaced() {
        let backend = MemoryBackend::with_profiles(&[creds("good", "g")]);
        backend.insert_raw("store:bad", b"garbage");
        let store = SecretStore::with_backend(Box::new(backend));

        let err = resolve(&store, Some("bad"), None).unwrap_err();
        assert!(matches!(err, ProfileError::Store(SecretsError::Corrupt { .. })));
    }

    #[test]
    fn test_handle_scan_skips_corrupt_records() {
        let backend = MemoryBackend::with_profiles(&[creds("good", "demo")]);
        backend.insert_raw("store:bad", b"garbage");
        let store = SecretStore::with_backend(Box::new(backend));

        assert_eq!(resolve(&store, Some("demo"), None).unwrap().credentials.name(), "good");
    }

    #[test]
    fn test_enumeration_fault_is_list_error() {
        let store = SecretStore::with_backend(Box::new(
            MemoryBackend::new().failing_keys(BackendError::Failure("boom".to_string())),
        ));
        let err = resolve(&store, None, None).unwrap_err();
        assert!(matches!(err, ProfileError::Store(SecretsError::List(_))));
    }

    #[test]
    fn test_remove_then_resolve_no_longer_finds_profile() {
        let store = store_with(&[creds("a", "ha"), creds("b", "hb")]);
        store.delete("b").unwrap();

        assert!(matches!(
            resolve(&store, Some("b"), None),
            Err(ProfileError::NotFound { .. })
        ));
        assert_eq!(
            resolve(&store, None, None).unwrap().credentials.name(),
            "a",
            "The remaining profile is auto-selected"
        );
    }

    #[test]
    fn test_selector_active_precedence() {
        assert_eq!(
            Selector::new(Some("f"), Some("e")).active(),
            Some(("f", SelectorSource::Flag))
        );
        assert_eq!(Selector::new(None, Some(" e ")).active(), Some(("e", SelectorSource::Env)));
        assert!(!Selector::none().is_set());
    }
}
