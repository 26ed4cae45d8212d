//! RetroHub command-line entry point.
//!
//! Thin wrapper around the retrohub-cli library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging on stderr
//! 3. Runs the selected subcommand

use anyhow::Result;
use retrohub_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(cache_dir = %cli.cache_dir.display(), api_base = %cli.api_base, "configuration loaded");

    let mut stdout = std::io::stdout().lock();
    retrohub_cli::run(cli, &mut stdout).await
}
