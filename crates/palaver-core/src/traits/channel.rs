// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection channel trait: one live text channel per conversation.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ConversationId;

/// A bidirectional text-frame channel bound to a single conversation.
///
/// Frames are delivered through [`receive`](ChatChannel::receive), once each
/// and in arrival order. The channel is owned by exactly one controller, so
/// that controller is the only frame consumer.
///
/// There is no reconnection, retry, or buffering of sends while disconnected.
#[async_trait]
pub trait ChatChannel: PluginAdapter {
    /// Establishes the channel for `conversation_id`.
    ///
    /// Fails with [`PalaverError::Connection`] (or `Timeout`) when the
    /// transport cannot be established.
    async fn open(&mut self, conversation_id: &ConversationId) -> Result<(), PalaverError>;

    /// Transmits exactly one frame.
    ///
    /// Fails with [`PalaverError::NotConnected`] before `open` or after `close`.
    async fn send(&self, text: &str) -> Result<(), PalaverError>;

    /// Waits for the next inbound frame.
    ///
    /// Returns [`PalaverError::NotConnected`] once the channel is closed, and
    /// [`PalaverError::Connection`] when the remote side ends the stream.
    async fn receive(&self) -> Result<String, PalaverError>;

    /// Releases the channel. Idempotent; never fails.
    async fn close(&mut self);

    /// Whether `send` would currently be accepted.
    fn is_open(&self) -> bool;
}
