// Shopline CLI — Top-level error types
//
// Aggregates errors from the secrets, profile and auth modules into a single
// error enum for the application boundary.

use thiserror::Error;

use crate::auth::AuthError;
use crate::profile::ProfileError;
use crate::secrets::SecretsError;

/// Top-level error type for all `spl` commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
