// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A key-value store whose operations fail, for degrade-path tests.

use async_trait::async_trait;

use palaver_core::{AdapterType, HealthStatus, KvStore, PalaverError, PluginAdapter};

/// Storage that is unavailable.
///
/// By default both reads and writes fail. [`FailingKv::writes_only`] reads
/// as empty and fails only writes, like a full disk.
#[derive(Debug, Clone, Default)]
pub struct FailingKv {
    reads_succeed: bool,
}

impl FailingKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes_only() -> Self {
        Self {
            reads_succeed: true,
        }
    }

    fn error(op: &str) -> PalaverError {
        PalaverError::persistence(std::io::Error::other(format!("simulated {op} failure")))
    }
}

#[async_trait]
impl PluginAdapter for FailingKv {
    fn name(&self) -> &str {
        "failing-kv"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        Ok(HealthStatus::Unhealthy("simulated outage".into()))
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        Ok(())
    }
}

#[async_trait]
impl KvStore for FailingKv {
    async fn initialize(&self) -> Result<(), PalaverError> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, PalaverError> {
        if self.reads_succeed {
            Ok(None)
        } else {
            Err(Self::error("read"))
        }
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), PalaverError> {
        Err(Self::error("write"))
    }
}
