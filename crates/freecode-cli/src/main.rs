//! FreeCode CLI
//!
//! Interactive coding practice against a FreeCode execution backend.

mod repl;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use freecode_client::HttpExecutionClient;
use freecode_session::{Config, SessionController};
use tracing_subscriber::EnvFilter;

use crate::repl::Repl;

/// FreeCode - Interactive Coding Practice
///
/// Generates practice problems for a topic, then lets you edit, run and
/// submit solutions against a remote execution backend.
#[derive(Parser, Debug)]
#[command(name = "freecode")]
#[command(version, about, long_about = None)]
struct Args {
    /// Topic to generate questions for on start-up
    #[arg(value_name = "TOPIC")]
    topic: Option<String>,

    /// Path to configuration file (default: freecode.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Base URL of the execution backend
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, api_base = ?args.api_base, "Starting FreeCode");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, connects to the backend and runs the prompt.
async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(ref api_base) = args.api_base {
        config.api_base.clone_from(api_base);
    }

    // Re-validate after overrides
    config.validate()?;

    let client = HttpExecutionClient::new(config.client_options())?;
    check_backend(&client, &config).await;

    let session = SessionController::new(Arc::new(client));
    let mut repl = Repl::new(session);

    if let Some(topic) = args.topic.as_deref() {
        repl.execute_line(&format!("generate {topic}")).await;
    }

    repl.run().await
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Probes the backend and warns if it is unreachable or cannot generate.
async fn check_backend(client: &HttpExecutionClient, config: &Config) {
    match client.health().await {
        Ok(health) if !health.llm_configured => {
            println!(
                "Warning: backend at {} has no question generator configured",
                config.api_base
            );
        }
        Ok(health) => {
            tracing::info!(
                status = %health.status,
                provider = ?health.llm_provider,
                "Backend is healthy"
            );
        }
        Err(e) => {
            println!("Warning: {e}");
            println!("  Is the backend running at {}?", config.api_base);
        }
    }
}
