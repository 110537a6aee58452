// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use palaver_core::PalaverError;
use tracing::debug;

use crate::migrations;

/// Convert a tokio-rusqlite error into [`PalaverError::Persistence`].
pub(crate) fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> PalaverError
where
    E: std::error::Error + Send + Sync + 'static,
{
    PalaverError::persistence(e)
}

/// An open, migrated SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and applies migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, PalaverError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(PalaverError::persistence)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(PalaverError::persistence)?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                let _mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The single writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flushes the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), PalaverError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
