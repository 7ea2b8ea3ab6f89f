// Shopline CLI — Library root
//
// Store-profile credentials for `spl`: secure storage, profile resolution,
// rotation policy and the `auth` commands.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod profile;
pub mod rotation;
pub mod runtime;
pub mod secrets;

pub use error::{CliError, Result};
