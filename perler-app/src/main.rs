mod app_dir;
mod cli;
mod preferences;

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use preferences::ExportPreferences;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Cli::parse();
    info!("Starting Perler");

    let prefs = ExportPreferences::load();
    cli::run(args, prefs)
}
