// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palaver doctor` command implementation.
//!
//! Runs diagnostic checks against the configured storage and endpoint.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use colored::Colorize;
use palaver_channel::WsChannel;
use palaver_config::PalaverConfig;
use palaver_core::{ChatChannel, HealthStatus, KvStore, PalaverError, PluginAdapter};
use palaver_storage::SqliteKv;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `palaver doctor` command.
pub async fn run_doctor(config: &PalaverConfig, plain: bool) -> Result<(), PalaverError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = vec![
        check_config(config),
        check_storage(config).await,
        check_channel(config).await,
    ];

    println!();
    println!("  palaver doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    let (symbol, message) = match (&result.status, use_color) {
        (CheckStatus::Pass, true) => ("✓".green().to_string(), result.message.clone()),
        (CheckStatus::Warn, true) => ("!".yellow().to_string(), result.message.yellow().to_string()),
        (CheckStatus::Fail, true) => ("✗".red().to_string(), result.message.red().to_string()),
        (CheckStatus::Pass, false) => ("[OK]  ".to_string(), result.message.clone()),
        (CheckStatus::Warn, false) => ("[WARN]".to_string(), result.message.clone()),
        (CheckStatus::Fail, false) => ("[FAIL]".to_string(), result.message.clone()),
    };
    format!("    {symbol} {:<14} {message} ({duration_ms}ms)", result.name)
}

/// Configuration was loaded and validated before the command ran.
fn check_config(config: &PalaverConfig) -> CheckResult {
    let start = Instant::now();
    CheckResult::new(
        "Configuration",
        CheckStatus::Pass,
        format!(
            "valid (endpoint {}, conversation {})",
            config.connection.endpoint, config.connection.conversation_id
        ),
        start,
    )
}

/// Opens the database, runs migrations, and reports the stored log size.
async fn check_storage(config: &PalaverConfig) -> CheckResult {
    let start = Instant::now();
    let kv = SqliteKv::new(config.storage.clone());
    if let Err(e) = kv.initialize().await {
        return CheckResult::new(
            "Storage",
            CheckStatus::Fail,
            format!("cannot open {}: {e}", config.storage.database_path),
            start,
        );
    }

    let result = match kv.health_check().await {
        Ok(HealthStatus::Healthy) => match kv.get(&config.storage.storage_key).await {
            Ok(Some(value)) => CheckResult::new(
                "Storage",
                CheckStatus::Pass,
                format!("{} ({} bytes stored)", config.storage.database_path, value.len()),
                start,
            ),
            Ok(None) => CheckResult::new(
                "Storage",
                CheckStatus::Pass,
                format!("{} (no history yet)", config.storage.database_path),
                start,
            ),
            Err(e) => CheckResult::new("Storage", CheckStatus::Fail, e.to_string(), start),
        },
        Ok(HealthStatus::Degraded(msg)) => {
            CheckResult::new("Storage", CheckStatus::Warn, msg, start)
        }
        Ok(HealthStatus::Unhealthy(msg)) => {
            CheckResult::new("Storage", CheckStatus::Fail, msg, start)
        }
        Err(e) => CheckResult::new("Storage", CheckStatus::Fail, e.to_string(), start),
    };
    let _ = kv.shutdown().await;
    result
}

/// Opens and closes one connection to the conversation endpoint.
async fn check_channel(config: &PalaverConfig) -> CheckResult {
    let start = Instant::now();
    let mut channel = WsChannel::new(&config.connection);
    let conversation_id = config.connection.conversation_id();
    let url = channel.url_for(&conversation_id);
    match channel.open(&conversation_id).await {
        Ok(()) => {
            channel.close().await;
            CheckResult::new("Connection", CheckStatus::Pass, format!("{url} reachable"), start)
        }
        Err(e) => CheckResult::new("Connection", CheckStatus::Fail, e.to_string(), start),
    }
}
