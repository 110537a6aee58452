// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring a controller to a temporary SQLite database and a
//! [`MockChannel`].

use std::sync::Arc;

use palaver_agent::{ControllerOptions, ConversationController};
use palaver_config::model::StorageConfig;
use palaver_core::{ConversationId, KvStore, PalaverError};
use palaver_storage::{MessageStore, SqliteKv};
use tempfile::TempDir;
use tracing::debug;

use crate::mock_channel::MockChannel;

/// A started controller over real persistence and a mock channel.
///
/// The database lives in a temporary directory owned by the harness, so
/// [`restart`](TestHarness::restart) can simulate a new session against the
/// same history.
pub struct TestHarness {
    pub controller: ConversationController,
    pub channel: MockChannel,
    storage: StorageConfig,
    options: ControllerOptions,
    _dir: TempDir,
}

impl TestHarness {
    /// Builds and starts a controller with default options.
    pub async fn new() -> Result<Self, PalaverError> {
        Self::with_options(ControllerOptions::default()).await
    }

    /// Builds and starts a controller with the given options.
    pub async fn with_options(options: ControllerOptions) -> Result<Self, PalaverError> {
        let dir = tempfile::tempdir().map_err(PalaverError::persistence)?;
        let storage = StorageConfig {
            database_path: dir.path().join("harness.db").to_string_lossy().to_string(),
            storage_key: "palaver.messages".to_string(),
            wal_mode: true,
        };
        let channel = MockChannel::new();
        let controller = start(&storage, channel.clone(), options.clone()).await?;
        debug!(path = %storage.database_path, "test harness ready");
        Ok(Self {
            controller,
            channel,
            storage,
            options,
            _dir: dir,
        })
    }

    /// Closes the current controller and starts a new one on the same
    /// database with a fresh mock channel.
    pub async fn restart(&mut self) -> Result<(), PalaverError> {
        self.controller.close().await;
        let channel = MockChannel::new();
        self.controller = start(&self.storage, channel.clone(), self.options.clone()).await?;
        self.channel = channel;
        Ok(())
    }

    /// Path of the harness database.
    pub fn database_path(&self) -> &str {
        &self.storage.database_path
    }
}

async fn start(
    storage: &StorageConfig,
    channel: MockChannel,
    options: ControllerOptions,
) -> Result<ConversationController, PalaverError> {
    let kv = SqliteKv::new(storage.clone());
    kv.initialize().await?;
    let store = MessageStore::new(Arc::new(kv), storage.storage_key.clone());
    let mut controller = ConversationController::new(
        ConversationId::new("1"),
        Box::new(channel),
        store,
        options,
    );
    controller.start().await;
    Ok(controller)
}
