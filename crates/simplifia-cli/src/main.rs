//! SimplifIA CLI — entry point.
//!
//! # Commands
//!
//! - `simplifia serve [--host H] [--port P]` — run the HTTP relay
//! - `simplifia simplify TEXT [-l LEVEL] [-p PROVIDER]` — one-shot explanation
//! - `simplifia status` — show configuration and provider key status
//! - `simplifia levels` — list explanation levels

mod helpers;
mod levels;
mod server;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use simplifia_core::config::load_config;
use simplifia_core::prompts::DEFAULT_LEVEL;
use simplifia_core::types::SimplifyRequest;
use simplifia_core::PromptTable;
use simplifia_providers::Dispatcher;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 💡 SimplifIA — explains any text at the level you choose
#[derive(Parser)]
#[command(name = "simplifia", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.simplifia/config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (POST /api/simplify)
    Serve {
        /// Listen address (overrides HOST / config)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides PORT / config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Explain a text once and print the result
    Simplify {
        /// Text to explain
        text: String,

        /// Explanation level (enfant, ado, etudiant, genie, bonus)
        #[arg(short, long, default_value = DEFAULT_LEVEL)]
        level: String,

        /// Provider (openai, gemini, deepseek)
        #[arg(short, long, default_value = "openai")]
        provider: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,

    /// List explanation levels
    Levels {
        /// Print full prompts instead of a preview
        #[arg(long, default_value_t = false)]
        full: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    let config_path: Option<PathBuf> = cli.config.as_deref().map(helpers::expand_tilde);

    match cli.command {
        Commands::Serve { host, port, logs } => {
            init_logging(logs, "info");
            if let Ok(path) = dotenv {
                debug!("Loaded environment from {}", path.display());
            }
            helpers::print_banner();

            let mut config = load_config(config_path.as_deref());
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run(config).await
        }
        Commands::Simplify {
            text,
            level,
            provider,
            logs,
        } => {
            init_logging(logs, "warn");
            run_simplify(config_path, text, level, provider).await
        }
        Commands::Status => status::run(config_path.as_deref()),
        Commands::Levels { full } => {
            levels::run(full);
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────
// Simplify command
// ─────────────────────────────────────────────

async fn run_simplify(
    config_path: Option<PathBuf>,
    text: String,
    level: String,
    provider: String,
) -> Result<()> {
    let config = load_config(config_path.as_deref());
    let dispatcher = Dispatcher::from_config(PromptTable::builtin(), &config.providers)
        .context("failed to build provider adapters")?;

    info!(provider = %provider, level = %level, "processing single request");

    let request = SimplifyRequest::new(text, level, provider);
    let response = dispatcher
        .simplify(&request)
        .await
        .context("simplify request failed")?;

    helpers::print_response(&request.provider, &request.level, &response.output);
    Ok(())
}

/// Initialize tracing/logging. `RUST_LOG` wins over the defaults.
fn init_logging(verbose: bool, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("simplifia=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
