//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use pagekit_core::config::AppConfig;
use pagekit_core::config::credentials::CredentialProvider;
use pagekit_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => print_summary(&config),
            }
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", config_path));
                print_summary(&config);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
    }

    Ok(())
}

fn print_summary(config: &AppConfig) {
    output::print_kv("Base URL", &config.client.base_url);
    output::print_kv("Timeout", &format!("{}s", config.client.timeout_seconds));
    output::print_kv(
        "Connect timeout",
        &format!("{}s", config.client.connect_timeout_seconds),
    );
    output::print_kv("User agent", &config.client.user_agent);
    output::print_kv("Credentials", &describe_credentials(config));
    output::print_kv(
        "Logging",
        &format!("{} ({})", config.logging.level, config.logging.format),
    );
}

fn describe_credentials(config: &AppConfig) -> String {
    let credentials = &config.credentials;
    match credentials.provider {
        CredentialProvider::Memory => format!("memory, key '{}'", credentials.key),
        CredentialProvider::File => {
            format!("file {}, key '{}'", credentials.file, credentials.key)
        }
    }
}
