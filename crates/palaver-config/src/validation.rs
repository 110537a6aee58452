// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as the endpoint scheme and a usable conversation identifier.

use crate::diagnostic::ConfigError;
use crate::model::{IndicatorMode, PalaverConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &PalaverConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of: {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let endpoint = config.connection.endpoint.trim();
    if endpoint.is_empty() {
        fail("connection.endpoint must not be empty".to_string());
    } else if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
        fail(format!(
            "connection.endpoint `{endpoint}` must use the ws:// or wss:// scheme"
        ));
    }

    let conversation_id = config.connection.conversation_id.trim();
    if conversation_id.is_empty() {
        fail("connection.conversation_id must not be empty".to_string());
    } else if conversation_id.contains('/') {
        fail(format!(
            "connection.conversation_id `{conversation_id}` must be a single path segment"
        ));
    }

    if config.connection.connect_timeout_secs == 0 {
        fail("connection.connect_timeout_secs must be greater than 0".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.storage_key.trim().is_empty() {
        fail("storage.storage_key must not be empty".to_string());
    }

    if config.conversation.indicator == IndicatorMode::Sentinel {
        let marker = config.conversation.end_of_turn.as_deref().unwrap_or("");
        if marker.is_empty() {
            fail(
                "conversation.end_of_turn is required when conversation.indicator = \"sentinel\""
                    .to_string(),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
