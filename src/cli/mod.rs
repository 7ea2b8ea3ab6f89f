// Shopline CLI — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: auth login, list, remove, status.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::{execute, execute_with, run};

/// spl — command-line tool for Shopline stores.
#[derive(Parser, Debug)]
#[command(name = "spl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Store profile to use: a profile name or store handle.
    /// Overrides SHOPLINE_STORE.
    #[arg(long, global = true, value_name = "NAME_OR_HANDLE")]
    pub store: Option<String>,

    /// Show what would change without writing to the credential store.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage store profiles and their credentials.
    #[command(subcommand, visible_aliases = ["profile", "profiles"])]
    Auth(AuthCommand),
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum AuthCommand {
    /// Add a store profile (replaces a profile with the same name).
    #[command(visible_alias = "add")]
    Login {
        /// Profile name. Defaults to the store handle.
        #[arg(long)]
        name: Option<String>,

        /// Store handle or admin URL. Prompted for when omitted.
        #[arg(long)]
        handle: Option<String>,

        /// Do not open a browser; just print the admin URL.
        #[arg(long)]
        no_browser: bool,
    },

    /// List store profiles (no secrets are shown).
    #[command(visible_alias = "ls")]
    List,

    /// Remove a store profile by name.
    #[command(visible_aliases = ["rm", "delete"])]
    Remove {
        /// The profile name.
        name: String,
    },

    /// Show the profile this invocation would use.
    Status,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("spl").chain(args.iter().copied())).unwrap()
    }

    fn auth_command(cli: Cli) -> AuthCommand {
        match cli.command {
            Commands::Auth(command) => command,
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_store_flag_after_subcommand() {
        let cli = parse(&["auth", "status", "--store", "demo"]);
        assert_eq!(cli.store.as_deref(), Some("demo"));
        assert_eq!(auth_command(cli), AuthCommand::Status);
    }

    #[test]
    fn test_login_arguments() {
        let cli = parse(&["auth", "login", "--handle", "demo", "--name", "main", "--no-browser"]);
        assert_eq!(
            auth_command(cli),
            AuthCommand::Login {
                name: Some("main".to_string()),
                handle: Some("demo".to_string()),
                no_browser: true,
            }
        );
    }

    #[test]
    fn test_command_aliases() {
        assert_eq!(auth_command(parse(&["profile", "ls"])), AuthCommand::List);
        assert_eq!(auth_command(parse(&["profiles", "list"])), AuthCommand::List);
        assert!(matches!(auth_command(parse(&["auth", "add"])), AuthCommand::Login { .. }));
        for alias in ["remove", "rm", "delete"] {
            assert_eq!(
                auth_command(parse(&["auth", alias, "demo"])),
                AuthCommand::Remove { name: "demo".to_string() }
            );
        }
    }

    #[test]
    fn test_dry_run_flag() {
        let cli = parse(&["--dry-run", "auth", "rm", "demo"]);
        assert!(cli.dry_run);
    }

    #[test]
    fn test_remove_requires_name() {
        assert!(Cli::try_parse_from(["spl", "auth", "remove"]).is_err());
    }
}
