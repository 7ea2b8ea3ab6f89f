// Shopline CLI — Profile resolution error types

use thiserror::Error;

use crate::secrets::SecretsError;

/// Most candidate names shown in a "multiple matches" error.
const MAX_LISTED_MATCHES: usize = 5;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("no store profiles configured; run 'spl auth login' first")]
    NoProfiles,

    #[error(
        "multiple store profiles configured ({}); use --store <name> or set SHOPLINE_STORE to select one",
        .names.join(", ")
    )]
    Ambiguous { names: Vec<String> },

    #[error("{}", not_found_message(.selector, .candidates))]
    NotFound {
        selector: String,
        /// Profiles that matched the selector equally well.
        candidates: Vec<String>,
    },

    #[error(transparent)]
    Store(#[from] SecretsError),
}

fn not_found_message(selector: &str, candidates: &[String]) -> String {
    let base = format!("profile not found: {}", selector);
    if candidates.len() > 1 {
        let shown: Vec<&str> = candidates
            .iter()
            .take(MAX_LISTED_MATCHES)
            .map(String::as_str)
            .collect();
        return format!(
            "{} (multiple matches: {}); use --store with an exact profile name and run 'spl auth list' to list profiles or 'spl auth login' to add one",
            base,
            shown.join(", ")
        );
    }
    format!(
        "{}; run 'spl auth list' to list profiles or 'spl auth login' to add one",
        base
    )
}
