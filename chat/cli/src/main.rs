//! QA Chat - Terminal client for a streaming question-answering endpoint
//!
//! Sends each question together with the conversation so far and prints the
//! answer as it streams in.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (http://localhost:8000/api/v1/qa)
//! qa-chat
//!
//! # Custom endpoint
//! qa-chat --endpoint https://qa.example.com/api/v1/qa
//!
//! # With config file
//! qa-chat --config ~/.config/qa-chat/client.toml
//!
//! # Probe the endpoint and exit
//! qa-chat --check
//!
//! # Verbose logging (stderr)
//! RUST_LOG=debug qa-chat
//! ```

mod clipboard;
mod command;
mod render;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use qa_chat_core::config::{default_config_path, load_config_from_path, ClientConfig, ConfigOverrides};
use qa_chat_core::{ChatSession, ExchangeController, HttpTransport, QaTransport};

/// QA Chat - streaming terminal client for a question-answering endpoint
#[derive(Parser, Debug)]
#[command(name = "qa-chat")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Question-answering endpoint URL
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "QA_CHAT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Connect timeout in milliseconds
    #[arg(long, value_name = "MS")]
    connect_timeout_ms: Option<u64>,

    /// System prompt seeded at the start of the conversation
    #[arg(long, value_name = "TEXT")]
    system_prompt: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "QA_CHAT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Check that the endpoint answers, then exit
    #[arg(long)]
    check: bool,
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so the transcript on stdout stays readable.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("qa_chat={level},qa_chat_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Load the config file, environment and CLI flags in priority order
fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref endpoint) = args.endpoint {
        overrides = overrides.with_endpoint(endpoint.clone());
    }
    if let Some(ms) = args.connect_timeout_ms {
        overrides = overrides.with_connect_timeout_ms(ms);
    }
    if let Some(ref prompt) = args.system_prompt {
        overrides = overrides.with_system_prompt(prompt.clone());
    }
    overrides
        .apply(&mut config)
        .context("Invalid command-line option")?;

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    let config = resolve_config(&args)?;
    info!(
        endpoint = %config.endpoint,
        source = %config.source(),
        config_file = ?config.config_file_path,
        "Configuration loaded"
    );

    let transport = Arc::new(HttpTransport::from_config(&config));

    if args.check {
        if transport.health_check().await {
            println!("{} is reachable", transport.endpoint());
            return Ok(());
        }
        anyhow::bail!("{} is not reachable", transport.endpoint());
    }

    let session = Arc::new(match config.system_prompt {
        Some(prompt) => ChatSession::with_system_prompt(prompt),
        None => ChatSession::new(),
    });

    let mut controller = ExchangeController::new(transport, session);
    let updates = controller.subscribe();

    repl::run(controller, updates).await
}
