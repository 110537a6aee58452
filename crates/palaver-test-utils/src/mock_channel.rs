// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChatChannel` with injectable inbound frames and
//! captured outbound frames. It is `Clone`: every clone shares the same
//! queues, so a test keeps one clone as a handle after moving another into
//! the controller.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use palaver_core::{
    AdapterType, ChatChannel, ConversationId, HealthStatus, PalaverError, PluginAdapter,
};

/// A mock text channel for testing.
///
/// - **inbound**: frames injected via `inject_frame()` are returned by `receive()`
/// - **sent**: frames passed to `send()` are captured and retrievable via `sent_frames()`
#[derive(Clone, Default)]
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<String>>>,
    sent: Arc<Mutex<Vec<String>>>,
    notify: Arc<Notify>,
    opened: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
    fail_open: bool,
    fail_send: bool,
    opened_with: Arc<Mutex<Option<ConversationId>>>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose `open` always fails with a connection error.
    pub fn refusing() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// A channel that opens but fails every `send`.
    pub fn failing_send() -> Self {
        Self {
            fail_send: true,
            ..Self::default()
        }
    }

    /// Inject an inbound frame into the receive queue.
    pub async fn inject_frame(&self, frame: impl Into<String>) {
        self.inbound.lock().await.push_back(frame.into());
        self.notify.notify_one();
    }

    /// Simulate the remote side ending the stream. Frames already injected
    /// are still delivered first.
    pub fn end_stream(&self) {
        self.ended.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Get all frames that were sent through `send()`.
    pub async fn sent_frames(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }

    /// The conversation id passed to the last successful `open`.
    pub async fn opened_with(&self) -> Option<ConversationId> {
        self.opened_with.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PalaverError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PalaverError> {
        Ok(())
    }
}

#[async_trait]
impl ChatChannel for MockChannel {
    async fn open(&mut self, conversation_id: &ConversationId) -> Result<(), PalaverError> {
        if self.fail_open {
            return Err(PalaverError::Connection {
                message: "mock connection refused".into(),
                source: None,
            });
        }
        *self.opened_with.lock().await = Some(conversation_id.clone());
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, text: &str) -> Result<(), PalaverError> {
        if !self.is_open() {
            return Err(PalaverError::NotConnected);
        }
        if self.fail_send {
            return Err(PalaverError::Connection {
                message: "mock send failure".into(),
                source: None,
            });
        }
        self.sent.lock().await.push(text.to_string());
        Ok(())
    }

    async fn receive(&self) -> Result<String, PalaverError> {
        loop {
            if !self.opened.load(Ordering::SeqCst) {
                return Err(PalaverError::NotConnected);
            }
            {
                let mut queue = self.inbound.lock().await;
                if let Some(frame) = queue.pop_front() {
                    return Ok(frame);
                }
            }
            if self.ended.load(Ordering::SeqCst) {
                return Err(PalaverError::Connection {
                    message: "mock stream ended".into(),
                    source: None,
                });
            }
            self.notify.notified().await;
        }
    }

    async fn close(&mut self) {
        self.opened.store(false, Ordering::SeqCst);
        self.notify.notify_one();
    }

    fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst) && !self.ended.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_returns_injected_frames_in_order() {
        let mut channel = MockChannel::new();
        channel.open(&ConversationId::new("1")).await.unwrap();
        channel.inject_frame("a").await;
        channel.inject_frame("b").await;
        assert_eq!(channel.receive().await.unwrap(), "a");
        assert_eq!(channel.receive().await.unwrap(), "b");
    }

    #[tokio::test]
    async fn send_captures_outbound_frames() {
        let mut channel = MockChannel::new();
        channel.open(&ConversationId::new("1")).await.unwrap();
        channel.send("hello").await.unwrap();
        assert_eq!(channel.sent_frames().await, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn clones_share_queues() {
        let mut channel = MockChannel::new();
        let handle = channel.clone();
        channel.open(&ConversationId::new("9")).await.unwrap();
        handle.inject_frame("x").await;
        assert_eq!(channel.receive().await.unwrap(), "x");
        assert_eq!(handle.opened_with().await, Some(ConversationId::new("9")));
    }

    #[tokio::test]
    async fn send_before_open_is_refused() {
        let channel = MockChannel::new();
        assert!(matches!(
            channel.send("x").await,
            Err(PalaverError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn refusing_channel_fails_open() {
        let mut channel = MockChannel::refusing();
        assert!(channel.open(&ConversationId::new("1")).await.is_err());
        assert!(!channel.is_open());
    }

    #[tokio::test]
    async fn ended_stream_drains_then_errors() {
        let mut channel = MockChannel::new();
        channel.open(&ConversationId::new("1")).await.unwrap();
        channel.inject_frame("last").await;
        channel.end_stream();
        assert!(!channel.is_open());
        assert_eq!(channel.receive().await.unwrap(), "last");
        assert!(matches!(
            channel.receive().await,
            Err(PalaverError::Connection { .. })
        ));
    }

    #[tokio::test]
    async fn close_stops_delivery() {
        let mut channel = MockChannel::new();
        channel.open(&ConversationId::new("1")).await.unwrap();
        channel.inject_frame("never").await;
        channel.close().await;
        channel.close().await;
        assert!(matches!(
            channel.receive().await,
            Err(PalaverError::NotConnected)
        ));
    }
}
