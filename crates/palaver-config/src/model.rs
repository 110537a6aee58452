// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Palaver chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use palaver_core::ConversationId;
use serde::{Deserialize, Serialize};

/// Top-level Palaver configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PalaverConfig {
    /// Logging and display labels.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Remote endpoint and conversation selection.
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Durable message log settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Conversation behavior settings.
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Logging level and author labels.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Author label stamped on records the user sends.
    #[serde(default = "default_user_label")]
    pub user_label: String,

    /// Author label stamped on assistant and system records.
    #[serde(default = "default_assistant_label")]
    pub assistant_label: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            user_label: default_user_label(),
            assistant_label: default_assistant_label(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_label() -> String {
    "You".to_string()
}

fn default_assistant_label() -> String {
    "AI".to_string()
}

/// Remote WebSocket endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Base WebSocket URL; the conversation id is appended as the last path segment.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Conversation (thread) identifier this client binds to.
    #[serde(default = "default_conversation_id")]
    pub conversation_id: String,

    /// Seconds to wait for the WebSocket handshake before giving up.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ConnectionConfig {
    pub fn conversation_id(&self) -> ConversationId {
        ConversationId::new(self.conversation_id.clone())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            conversation_id: default_conversation_id(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "ws://localhost:8000/ws".to_string()
}

fn default_conversation_id() -> String {
    "1".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Key under which the serialized message log is stored.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            storage_key: default_storage_key(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("palaver").join("palaver.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("palaver.db"))
        .to_string_lossy()
        .to_string()
}

fn default_storage_key() -> String {
    "palaver.messages".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// When the "assistant is typing" indicator clears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndicatorMode {
    /// Clear on the first inbound frame after a submit.
    #[default]
    FirstFrame,
    /// Clear only when a frame equal to `end_of_turn` arrives.
    Sentinel,
}

/// Conversation behavior configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Indicator clearing policy.
    #[serde(default)]
    pub indicator: IndicatorMode,

    /// End-of-turn marker frame, required when `indicator = "sentinel"`.
    #[serde(default)]
    pub end_of_turn: Option<String>,
}
