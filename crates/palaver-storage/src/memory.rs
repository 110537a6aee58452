// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile in-memory [`KvStore`].
//!
//! Used when the database cannot be opened; contents are lost on exit.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use palaver_core::{AdapterType, HealthStatus, KvStore, PalaverError, PluginAdapter};

#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for MemoryKv {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        Ok(HealthStatus::Degraded(
            "in-memory storage; history is not kept across sessions".into(),
        ))
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn initialize(&self) -> Result<(), PalaverError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PalaverError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), PalaverError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
