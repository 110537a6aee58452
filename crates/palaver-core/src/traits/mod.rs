// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod channel;
pub mod storage;

pub use adapter::PluginAdapter;
pub use channel::ChatChannel;
pub use storage::KvStore;
