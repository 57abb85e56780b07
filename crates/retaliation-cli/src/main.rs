//! Retaliation CLI entry point.

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use retaliation_cli::cli::Cli;
use retaliation_cli::{commands, install_signal_handlers};
use retaliation_core::{load_env, CancelToken};

fn main() {
    // .env.local from the working and state directories
    load_env();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    let token = CancelToken::new();
    if let Err(e) = install_signal_handlers(&token) {
        warn!(error = %e, "could not install signal handlers, Ctrl-C will not stop the launcher cleanly");
    }

    if let Err(e) = commands::execute(&cli, &token) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
