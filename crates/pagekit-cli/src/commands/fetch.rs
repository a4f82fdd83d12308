//! One-shot request command.

use std::sync::Arc;

use clap::Args;
use serde_json::Value;
use tracing::debug;

use crate::output::{self, OutputFormat};
use pagekit_core::config::AppConfig;
use pagekit_core::error::AppError;
use pagekit_request::{
    MemoryCredentialStore, Method, OutcomeSnapshot, RequestClient, RequestOptions,
    ReqwestTransport,
};

/// Arguments for the fetch command
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Request path, appended to the configured base URL
    pub path: String,

    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Extra header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// JSON request body
    #[arg(short, long)]
    pub body: Option<String>,

    /// Send without the bearer credential
    #[arg(long)]
    pub no_auth: bool,

    /// Bearer token to use instead of the configured credential store
    #[arg(long)]
    pub token: Option<String>,
}

/// Execute the fetch command
pub async fn execute(
    args: &FetchArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let client = build_client(&config, args)?;
    let options = build_options(args)?;

    debug!("Fetching {}{}", client.base_url(), args.path);
    let outcome = client.issue_request::<Value>(&args.path, Some(options), !args.no_auth);
    outcome.settled().await;
    let snapshot = outcome.snapshot();

    match format {
        OutputFormat::Json => output::print_json(&snapshot),
        OutputFormat::Table => print_snapshot(&snapshot),
    }

    if snapshot.is_success() {
        Ok(())
    } else {
        Err(AppError::http(format!("Request failed: {}", snapshot.err)))
    }
}

fn build_client(config: &AppConfig, args: &FetchArgs) -> Result<RequestClient, AppError> {
    let Some(token) = &args.token else {
        return RequestClient::from_config(config);
    };

    if args.no_auth {
        output::print_warning("--token is ignored together with --no-auth");
    }
    if token.trim().is_empty() {
        return Err(AppError::credential("--token must not be empty"));
    }

    let key = config.credentials.key.as_str();
    let transport = ReqwestTransport::new(&config.client)?;
    let credentials = MemoryCredentialStore::new().with(key, token.as_str());
    Ok(RequestClient::new(
        config.client.clone(),
        Arc::new(transport),
        Arc::new(credentials),
    )
    .with_credential_key(key))
}

fn build_options(args: &FetchArgs) -> Result<RequestOptions, AppError> {
    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .map_err(|_| AppError::validation(format!("Invalid HTTP method: {}", args.method)))?;

    let mut options = RequestOptions {
        method,
        ..RequestOptions::default()
    };

    if let Some(raw) = &args.body {
        let body: Value = serde_json::from_str(raw)
            .map_err(|e| AppError::validation(format!("--body is not valid JSON: {e}")))?;
        options = options.json(&body)?;
    }

    for header in &args.headers {
        let (name, value) = parse_header(header)?;
        options = options.try_header(name, value)?;
    }

    Ok(options)
}

/// Split `Name: value` into trimmed parts.
fn parse_header(raw: &str) -> Result<(&str, &str), AppError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(AppError::validation(format!(
            "Header must look like 'Name: value', got '{raw}'"
        ))),
    }
}

fn print_snapshot(snapshot: &OutcomeSnapshot<Value>) {
    if snapshot.is_success() {
        output::print_success("Request succeeded");
    } else {
        output::print_error("Request failed");
    }
    output::print_kv("Loading", &snapshot.is_loading.to_string());
    if let Some(kind) = snapshot.kind {
        output::print_kv("Failure", &kind.to_string());
    }
    output::print_kv("Error", &snapshot.err);
    if let Some(data) = &snapshot.data {
        let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        println!("{}", pretty);
    }
}
