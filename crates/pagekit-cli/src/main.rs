//! PageKit CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use pagekit_core::config::AppConfig;
use pagekit_core::config::logging::LoggingConfig;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging comes up before command dispatch, so an unreadable config
    // falls back to defaults here and is reported by the command itself.
    let logging = AppConfig::load(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_default();
    init_logging(&logging);

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
