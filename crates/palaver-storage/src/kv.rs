// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`KvStore`] trait.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use tokio::sync::OnceCell;
use tracing::debug;

use palaver_config::model::StorageConfig;
use palaver_core::{AdapterType, HealthStatus, KvStore, PalaverError, PluginAdapter};

use crate::database::{Database, map_tr_err};

/// SQLite-backed key-value store.
///
/// The database is lazily opened on the first call to
/// [`KvStore::initialize`].
pub struct SqliteKv {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteKv {
    /// Create a new store for the configured database path.
    ///
    /// Nothing touches the filesystem until [`initialize`](KvStore::initialize).
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, PalaverError> {
        self.db.get().ok_or_else(|| {
            PalaverError::Internal("storage not initialized -- call initialize() first".into())
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteKv {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteKv {
    async fn initialize(&self) -> Result<(), PalaverError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| PalaverError::Internal("storage already initialized".into()))?;
        debug!(path = %self.config.database_path, "SQLite key-value store initialized");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PalaverError> {
        let key = key.to_string();
        self.db()?
            .connection()
            .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), PalaverError> {
        let key = key.to_string();
        let value = value.to_string();
        self.db()?
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO kv (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(key) DO UPDATE SET
                         value = excluded.value,
                         updated_at = excluded.updated_at",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
