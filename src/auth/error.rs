// Shopline CLI — Auth command error types

use thiserror::Error;

use crate::profile::ProfileError;
use crate::secrets::SecretsError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Bad login input, or the token could not be obtained.
    #[error("login failed: {0}")]
    Login(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
