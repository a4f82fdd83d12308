//! CLI command definitions and dispatch.

pub mod config;
pub mod fetch;
pub mod validate;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use pagekit_core::config::AppConfig;
use pagekit_core::error::AppError;

/// PageKit: reactive request state and form validation
#[derive(Debug, Parser)]
#[command(name = "pagekit", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Issue one request and print its settled state
    Fetch(fetch::FetchArgs),
    /// Validate a JSON field list
    Validate(validate::ValidateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Fetch(args) => fetch::execute(args, &self.config, self.format).await,
            Commands::Validate(args) => validate::execute(args, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {}", e.message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fetch_command() {
        let cli = Cli::try_parse_from([
            "pagekit",
            "--format",
            "json",
            "fetch",
            "/users/1",
            "--method",
            "post",
            "--header",
            "X-Trace: abc",
            "--no-auth",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, "config/default.toml");
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch command");
        };
        assert_eq!(args.path, "/users/1");
        assert_eq!(args.method, "post");
        assert_eq!(args.headers, vec!["X-Trace: abc".to_string()]);
        assert!(args.no_auth);
    }

    #[test]
    fn test_parses_config_validate() {
        let cli = Cli::try_parse_from(["pagekit", "-c", "custom.toml", "config", "validate"])
            .unwrap();
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["pagekit"]).is_err());
    }
}
