// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only conversation log mirrored to a [`KvStore`].
//!
//! The whole log is stored as one JSON array under a single key, so every
//! write replaces the previous value atomically and `load` never observes a
//! partially written log.

use std::sync::Arc;

use palaver_core::{KvStore, MessageRecord, PalaverError};
use tracing::{debug, warn};

use crate::memory::MemoryKv;

/// Ordered message records plus their persistence adapter.
pub struct MessageStore {
    kv: Arc<dyn KvStore>,
    key: String,
    records: Vec<MessageRecord>,
    durable: bool,
}

impl MessageStore {
    /// A store backed by `kv`, persisting under `key`.
    pub fn new(kv: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            records: Vec::new(),
            durable: true,
        }
    }

    /// A store that never outlives the process.
    pub fn in_memory(key: impl Into<String>) -> Self {
        let mut store = Self::new(Arc::new(MemoryKv::new()), key);
        store.durable = false;
        store
    }

    /// Restores persisted records, replacing whatever is held in memory.
    ///
    /// Absent or unparsable data yields an empty log. A storage read failure
    /// also yields an empty log and switches the store to in-memory operation.
    pub async fn load(&mut self) -> &[MessageRecord] {
        self.records = match self.kv.get(&self.key).await {
            Ok(Some(raw)) => decode(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                self.degrade(&e);
                Vec::new()
            }
        };
        debug!(key = %self.key, count = self.records.len(), "message log loaded");
        &self.records
    }

    /// Appends `record` and re-persists the whole log.
    ///
    /// The record is always kept in memory. When the write fails the store
    /// degrades to in-memory operation and the error is returned once; later
    /// appends skip storage entirely.
    pub async fn append(&mut self, record: MessageRecord) -> Result<(), PalaverError> {
        self.records.push(record);
        if !self.durable {
            return Ok(());
        }

        let result = match serde_json::to_string(&self.records) {
            Ok(json) => self.kv.put(&self.key, &json).await,
            Err(e) => Err(PalaverError::persistence(e)),
        };
        if let Err(e) = &result {
            self.degrade(e);
        }
        result
    }

    /// Read-only view of the log in insertion order.
    pub fn snapshot(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether appends are still being written to durable storage.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// The backing key-value store.
    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    fn degrade(&mut self, error: &PalaverError) {
        if self.durable {
            warn!(
                key = %self.key,
                error = %error,
                "storage unavailable, keeping conversation in memory only"
            );
        }
        self.durable = false;
    }
}

fn decode(raw: &str) -> Vec<MessageRecord> {
    match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "persisted message log is corrupt, starting empty");
            Vec::new()
        }
    }
}
