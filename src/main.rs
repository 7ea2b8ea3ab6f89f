// Shopline CLI — Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (tokens are
// never logged), and dispatches to the command handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shopline_cli::cli::{execute, Cli};

fn main() {
    // RUST_LOG=shopline_cli=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shopline_cli=warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
