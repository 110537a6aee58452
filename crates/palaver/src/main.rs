// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Palaver - a terminal chat client for a remote assistant.
//!
//! This is the binary entry point.

mod doctor;
mod history;
mod shell;
mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use palaver_config::PalaverConfig;

/// Palaver - chat with a remote assistant over WebSocket.
#[derive(Parser, Debug)]
#[command(name = "palaver", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Conversation identifier (overrides `connection.conversation_id`).
    #[arg(long, global = true, value_name = "ID")]
    conversation: Option<String>,

    /// WebSocket endpoint (overrides `connection.endpoint`).
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session (default).
    Chat,
    /// Print the saved conversation log.
    History {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Check configuration, storage, and connectivity.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            palaver_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => shell::run_chat(config).await,
        Commands::History { plain } => history::run_history(&config, plain).await,
        Commands::Doctor { plain } => doctor::run_doctor(&config, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Loads configuration and applies command-line overrides, validating the result.
fn load_config(cli: &Cli) -> Result<PalaverConfig, Vec<palaver_config::ConfigError>> {
    let mut config = match &cli.config {
        Some(path) => palaver_config::load_and_validate_path(path)?,
        None => palaver_config::load_and_validate()?,
    };

    if cli.conversation.is_none() && cli.endpoint.is_none() {
        return Ok(config);
    }
    if let Some(conversation) = &cli.conversation {
        config.connection.conversation_id = conversation.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.connection.endpoint = endpoint.clone();
    }
    palaver_config::validation::validate_config(&config)?;
    Ok(config)
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so they never interleave with the transcript on stdout.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("palaver={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
