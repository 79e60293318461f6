//! Feishu docs agent binary.
//!
//! Runs one action and prints its envelope as JSON on stdout.
//!
//! Usage:
//!   # Read-only self test against the configured folder
//!   feishu-docs-agent
//!
//!   # Any action, with parameters
//!   feishu-docs-agent list_folder_docs --param page_size=50
//!   feishu-docs-agent write_doc --json '{"document_id":"doxcn1","content":"hi","index":0}'

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::{Map, Value};
use tracing_subscriber::{fmt, EnvFilter};

use feishu_docs_agent::adapters::{FeishuConfig, FeishuDocsClient, RetryingDocsApi};
use feishu_docs_agent::application::{ActionEnvelope, Dispatcher};
use feishu_docs_agent::config::AppConfig;
use feishu_docs_agent::domain::foundation::{DocsError, ValidationError};

/// Agent-facing operations on Feishu cloud docs.
#[derive(Parser, Debug)]
#[command(name = "feishu-docs-agent")]
#[command(about = "List, read, outline and write Feishu docs from the command line")]
struct Args {
    /// Action to run; a read-only self_test when omitted
    action: Option<String>,

    /// Action parameter as key=value (value parsed as JSON when possible)
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// Action parameters as one JSON object
    #[arg(long)]
    json: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries only the envelope
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let action = args
        .action
        .clone()
        .unwrap_or_else(|| "self_test".to_string());

    let envelope = match run(&action, &args).await {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::error!(action = %action, "Startup failed: {}", err);
            ActionEnvelope::failure(action, &err)
        }
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            tracing::error!("Failed to serialize envelope: {}", err);
            return ExitCode::FAILURE;
        }
    }

    if envelope.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn run(action: &str, args: &Args) -> Result<ActionEnvelope, DocsError> {
    let request = build_request(action, args.json.as_deref(), &args.params)?;

    let config = AppConfig::load()?;
    config.validate()?;

    let mut feishu = FeishuConfig::new()
        .with_base_url(config.base_url.clone())
        .with_timeout(config.timeout());
    match config.credentials() {
        Ok(credentials) => {
            tracing::info!(mode = credentials.kind(), "Using configured credentials");
            feishu = feishu.with_credentials(credentials);
        }
        Err(err) => tracing::warn!("{}", err),
    }

    let client = FeishuDocsClient::new(feishu)?;
    let api = RetryingDocsApi::new(client).with_delay(config.retry_delay());
    let dispatcher = Dispatcher::new(Arc::new(api), config.default_folder());

    Ok(dispatcher.dispatch(request).await)
}

/// Merges `--json` and `--param` values into one request object.
///
/// `--param` entries override keys from `--json`; the action name wins over both.
fn build_request(
    action: &str,
    json: Option<&str>,
    params: &[(String, Value)],
) -> Result<Value, DocsError> {
    let mut request = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(invalid_json("expected a JSON object")),
            Err(e) => return Err(invalid_json(&e.to_string())),
        },
        None => Map::new(),
    };

    for (key, value) in params {
        request.insert(key.clone(), value.clone());
    }
    request.insert("action".to_string(), Value::String(action.to_string()));

    Ok(Value::Object(request))
}

fn invalid_json(reason: &str) -> DocsError {
    ValidationError::invalid_format("json", reason).into()
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
