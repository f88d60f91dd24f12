//! changewatch CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use changewatch_cli::cli::Cli;
use changewatch_cli::commands;
use changewatch_core::config;

fn main() {
    let cli = Cli::parse();

    // Must happen before anything reads the cached state dir
    if let Some(dir) = &cli.state_dir {
        std::env::set_var(config::STATE_DIR_ENV, dir);
    }
    config::load_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = commands::execute(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
