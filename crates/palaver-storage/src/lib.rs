// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for the Palaver conversation log.
//!
//! Provides a WAL-mode SQLite key-value store with embedded migrations, a
//! volatile in-memory fallback, and the append-only [`MessageStore`] that
//! mirrors the log to whichever backend is available.

pub mod database;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod store;

use std::sync::Arc;

use palaver_config::model::StorageConfig;
use palaver_core::KvStore;
use tracing::warn;

pub use database::Database;
pub use kv::SqliteKv;
pub use memory::MemoryKv;
pub use store::MessageStore;

/// Opens the configured SQLite store, falling back to memory when it cannot
/// be initialized. The returned store has not been loaded yet.
pub async fn open_message_store(config: &StorageConfig) -> MessageStore {
    let kv = SqliteKv::new(config.clone());
    match kv.initialize().await {
        Ok(()) => MessageStore::new(Arc::new(kv), config.storage_key.clone()),
        Err(e) => {
            warn!(
                path = %config.database_path,
                error = %e,
                "could not open message database, history will not be saved"
            );
            MessageStore::in_memory(config.storage_key.clone())
        }
    }
}
