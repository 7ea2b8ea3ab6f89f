// Shopline CLI — Auth Module
//
// The `spl auth` commands: list, status, remove and login. Output goes to
// caller-supplied writers so command text can be asserted in tests.

mod error;
mod facade;
mod login;

pub use error::AuthError;
pub use facade::{preview_remove, Auth};
pub use login::{
    admin_url, preview_login, validate_handle, LoginRequest, TerminalTokenSource, TokenSource,
};

#[cfg(test)]
pub(crate) use login::mock::ScriptedTokenSource;
