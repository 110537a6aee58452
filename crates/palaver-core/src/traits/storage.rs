// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value persistence trait backing the message store.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::traits::adapter::PluginAdapter;

/// Durable client-side key-value storage.
///
/// `put` replaces the whole value atomically: a later `get` sees either the
/// previous value or the new one, never a mix.
#[async_trait]
pub trait KvStore: PluginAdapter {
    /// Prepares the backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), PalaverError>;

    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, PalaverError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), PalaverError>;
}
