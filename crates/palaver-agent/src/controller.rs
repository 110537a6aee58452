// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation state machine.
//!
//! States: Idle -> AwaitingReply (on submit) -> Idle (on inbound frame).
//! Inbound frames are accepted in any state. Every transition either
//! completes fully or leaves the state untouched.

use palaver_config::PalaverConfig;
use palaver_config::model::IndicatorMode;
use palaver_core::{ChatChannel, ConversationId, MessageRecord, PalaverError};
use palaver_render::SanitizingRenderer;
use palaver_storage::MessageStore;
use tracing::{debug, info, warn};

use crate::intent::ConversationSnapshot;

/// Notice appended when the channel cannot be opened.
pub const CONNECTION_ERROR_NOTICE: &str = "connection error";

/// Notice appended when the remote side ends the channel.
pub const CONNECTION_CLOSED_NOTICE: &str = "connection closed";

/// States in the conversation FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// Nothing outstanding.
    Idle,
    /// A submit went out and the reply has not arrived yet.
    AwaitingReply,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationState::Idle => write!(f, "idle"),
            ConversationState::AwaitingReply => write!(f, "awaiting_reply"),
        }
    }
}

/// Labels and indicator policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    pub user_label: String,
    pub assistant_label: String,
    pub indicator: IndicatorMode,
    pub end_of_turn: Option<String>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from(&PalaverConfig::default())
    }
}

impl From<&PalaverConfig> for ControllerOptions {
    fn from(config: &PalaverConfig) -> Self {
        Self {
            user_label: config.agent.user_label.clone(),
            assistant_label: config.agent.assistant_label.clone(),
            indicator: config.conversation.indicator,
            end_of_turn: config.conversation.end_of_turn.clone(),
        }
    }
}

/// Owns the channel and the message store for one conversation.
pub struct ConversationController {
    conversation_id: ConversationId,
    channel: Box<dyn ChatChannel>,
    store: MessageStore,
    renderer: SanitizingRenderer,
    options: ControllerOptions,
    state: ConversationState,
    draft: String,
    started: bool,
}

impl ConversationController {
    pub fn new(
        conversation_id: ConversationId,
        channel: Box<dyn ChatChannel>,
        store: MessageStore,
        options: ControllerOptions,
    ) -> Self {
        Self {
            conversation_id,
            channel,
            store,
            renderer: SanitizingRenderer::new(),
            options,
            state: ConversationState::Idle,
            draft: String::new(),
            started: false,
        }
    }

    /// Restores history and opens the channel. Runs once; later calls are no-ops.
    ///
    /// An open failure is not returned: it becomes a
    /// [`CONNECTION_ERROR_NOTICE`] record and the controller stays idle.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let restored = self.store.load().await.len();
        info!(
            conversation_id = %self.conversation_id,
            count = restored,
            durable = self.store.is_durable(),
            "conversation history restored"
        );

        if let Err(e) = self.channel.open(&self.conversation_id).await {
            warn!(conversation_id = %self.conversation_id, error = %e, "failed to open channel");
            let notice =
                MessageRecord::notice(CONNECTION_ERROR_NOTICE, &self.options.assistant_label);
            self.append(notice).await;
        }
    }

    /// Sends `text` as a user turn.
    ///
    /// Whitespace-only input is ignored. Without a live channel the submit is
    /// refused with [`PalaverError::NotConnected`] and nothing changes; a
    /// failed send likewise leaves the conversation untouched.
    pub async fn submit(&mut self, text: &str) -> Result<(), PalaverError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        if !self.channel.is_open() {
            return Err(PalaverError::NotConnected);
        }

        self.channel.send(text).await?;

        let record = MessageRecord::outgoing(text, &self.options.user_label);
        self.append(record).await;
        self.draft.clear();
        self.transition(ConversationState::AwaitingReply);
        Ok(())
    }

    /// Handles one inbound frame.
    pub async fn on_frame(&mut self, payload: &str) {
        if self.is_end_of_turn(payload) {
            debug!("end-of-turn marker received");
            self.transition(ConversationState::Idle);
            return;
        }

        let rendered = self.renderer.render(payload);
        let record = MessageRecord::incoming(rendered, &self.options.assistant_label);
        self.append(record).await;

        if self.options.indicator == IndicatorMode::FirstFrame {
            self.transition(ConversationState::Idle);
        }
    }

    /// Records that the remote side ended the channel.
    pub async fn on_channel_ended(&mut self, error: &PalaverError) {
        warn!(conversation_id = %self.conversation_id, error = %error, "channel ended");
        let notice = MessageRecord::notice(CONNECTION_CLOSED_NOTICE, &self.options.assistant_label);
        self.append(notice).await;
        self.transition(ConversationState::Idle);
    }

    /// Waits for the next inbound frame.
    pub async fn next_frame(&self) -> Result<String, PalaverError> {
        self.channel.receive().await
    }

    /// Replaces the pending input.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether [`submit`](Self::submit) would currently be accepted.
    pub fn can_submit(&self) -> bool {
        self.channel.is_open()
    }

    pub fn awaiting_reply(&self) -> bool {
        self.state == ConversationState::AwaitingReply
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Records in conversation order.
    pub fn messages(&self) -> &[MessageRecord] {
        self.store.snapshot()
    }

    pub fn is_durable(&self) -> bool {
        self.store.is_durable()
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages().to_vec(),
            awaiting_reply: self.awaiting_reply(),
            draft: self.draft.clone(),
            connected: self.can_submit(),
            durable: self.is_durable(),
            last_error: None,
            refusals: 0,
        }
    }

    /// Closes the channel and flushes storage. Idempotent.
    pub async fn close(&mut self) {
        self.channel.close().await;
        if let Err(e) = self.store.kv().shutdown().await {
            warn!(error = %e, "storage shutdown failed");
        }
        debug!(conversation_id = %self.conversation_id, "conversation closed");
    }

    fn is_end_of_turn(&self, payload: &str) -> bool {
        self.options.indicator == IndicatorMode::Sentinel
            && self.options.end_of_turn.as_deref() == Some(payload)
    }

    async fn append(&mut self, record: MessageRecord) {
        if let Err(e) = self.store.append(record).await {
            debug!(error = %e, "record kept in memory only");
        }
    }

    fn transition(&mut self, next: ConversationState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "state transition");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::{ContentKind, Position};
    use palaver_test_utils::{FailingKv, MockChannel};
    use std::sync::Arc;

    const KEY: &str = "palaver.messages";

    async fn started(channel: MockChannel) -> ConversationController {
        let mut controller = ConversationController::new(
            ConversationId::new("1"),
            Box::new(channel),
            MessageStore::in_memory(KEY),
            ControllerOptions::default(),
        );
        controller.start().await;
        controller
    }

    fn sentinel_options() -> ControllerOptions {
        ControllerOptions {
            indicator: IndicatorMode::Sentinel,
            end_of_turn: Some("[[END]]".into()),
            ..ControllerOptions::default()
        }
    }

    #[tokio::test]
    async fn starts_idle_with_channel_open() {
        let channel = MockChannel::new();
        let controller = started(channel.clone()).await;
        assert_eq!(controller.state(), ConversationState::Idle);
        assert!(controller.can_submit());
        assert_eq!(channel.opened_with().await, Some(ConversationId::new("1")));
    }

    #[tokio::test]
    async fn submit_hello_appends_sends_and_awaits() {
        let channel = MockChannel::new();
        let mut controller = started(channel.clone()).await;
        controller.set_draft("Hello");

        controller.submit("Hello").await.unwrap();

        let messages = controller.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].position, Position::Outgoing);
        assert_eq!(messages[0].content_kind, ContentKind::PlainText);
        assert_eq!(messages[0].text, "Hello");
        assert_eq!(messages[0].author, "You");
        assert!(controller.awaiting_reply());
        assert_eq!(controller.draft(), "");
        assert_eq!(channel.sent_frames().await, vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn whitespace_submit_changes_nothing() {
        let channel = MockChannel::new();
        let mut controller = started(channel.clone()).await;
        controller.set_draft("   ");

        for text in ["", "   ", "\n\t "] {
            controller.submit(text).await.unwrap();
        }

        assert!(controller.messages().is_empty());
        assert!(!controller.awaiting_reply());
        assert_eq!(controller.draft(), "   ");
        assert!(channel.sent_frames().await.is_empty());
    }

    #[tokio::test]
    async fn markdown_frame_becomes_safe_html_and_clears_indicator() {
        let mut controller = started(MockChannel::new()).await;
        controller.submit("Hello").await.unwrap();

        controller.on_frame("**Hi!**").await;

        let last = controller.messages().last().unwrap();
        assert_eq!(last.position, Position::Incoming);
        assert_eq!(last.content_kind, ContentKind::SafeHtml);
        assert!(last.text.contains("<strong>Hi!</strong>"));
        assert_eq!(last.author, "AI");
        assert!(!controller.awaiting_reply());
    }

    #[tokio::test]
    async fn markup_frame_is_sanitized() {
        let mut controller = started(MockChannel::new()).await;
        controller.on_frame("<div onclick='x()'>hi</div>").await;

        let last = controller.messages().last().unwrap();
        assert!(last.text.contains("<div>hi</div>"));
        assert!(!last.text.contains("onclick"));
    }

    #[tokio::test]
    async fn each_frame_appends_one_record_in_any_state() {
        let mut controller = started(MockChannel::new()).await;
        controller.on_frame("unsolicited").await;
        assert_eq!(controller.messages().len(), 1);
        assert!(!controller.awaiting_reply());

        controller.submit("q").await.unwrap();
        controller.on_frame("part one").await;
        controller.on_frame("part two").await;
        assert_eq!(controller.messages().len(), 4);
        assert!(!controller.awaiting_reply());
    }

    #[tokio::test]
    async fn open_failure_appends_notice_and_stays_idle() {
        let mut controller = started(MockChannel::refusing()).await;

        let messages = controller.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].position, Position::Incoming);
        assert_eq!(messages[0].content_kind, ContentKind::PlainText);
        assert_eq!(messages[0].text, CONNECTION_ERROR_NOTICE);
        assert_eq!(controller.state(), ConversationState::Idle);
        assert!(!controller.can_submit());

        let err = controller.submit("Hello").await.unwrap_err();
        assert!(matches!(err, PalaverError::NotConnected));
        assert_eq!(controller.messages().len(), 1);
        assert!(!controller.awaiting_reply());
    }

    #[tokio::test]
    async fn failed_send_leaves_state_untouched() {
        let mut controller = started(MockChannel::failing_send()).await;
        controller.set_draft("Hello");

        assert!(controller.submit("Hello").await.is_err());
        assert!(controller.messages().is_empty());
        assert!(!controller.awaiting_reply());
        assert_eq!(controller.draft(), "Hello");
    }

    #[tokio::test]
    async fn submit_after_close_is_refused() {
        let mut controller = started(MockChannel::new()).await;
        controller.close().await;
        controller.close().await;
        assert!(matches!(
            controller.submit("late").await,
            Err(PalaverError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn sentinel_policy_waits_for_marker() {
        let mut controller = ConversationController::new(
            ConversationId::new("1"),
            Box::new(MockChannel::new()),
            MessageStore::in_memory(KEY),
            sentinel_options(),
        );
        controller.start().await;
        controller.submit("q").await.unwrap();

        controller.on_frame("chunk one").await;
        controller.on_frame("chunk two").await;
        assert!(controller.awaiting_reply());

        controller.on_frame("[[END]]").await;
        assert!(!controller.awaiting_reply());
        assert_eq!(controller.messages().len(), 3);
        assert!(controller.messages().iter().all(|m| m.text != "[[END]]"));
    }

    #[tokio::test]
    async fn storage_failure_keeps_conversation_in_memory() {
        let store = MessageStore::new(Arc::new(FailingKv::writes_only()), KEY);
        let mut controller = ConversationController::new(
            ConversationId::new("1"),
            Box::new(MockChannel::new()),
            store,
            ControllerOptions::default(),
        );
        controller.start().await;
        assert!(controller.is_durable());

        controller.submit("Hello").await.unwrap();
        controller.on_frame("hi").await;

        assert_eq!(controller.messages().len(), 2);
        assert!(!controller.is_durable());
        assert!(!controller.awaiting_reply());
    }

    #[tokio::test]
    async fn channel_end_appends_closed_notice() {
        let channel = MockChannel::new();
        let mut controller = started(channel.clone()).await;
        controller.submit("q").await.unwrap();
        channel.end_stream();

        let err = controller.next_frame().await.unwrap_err();
        controller.on_channel_ended(&err).await;

        assert_eq!(
            controller.messages().last().map(|m| m.text.as_str()),
            Some(CONNECTION_CLOSED_NOTICE)
        );
        assert!(!controller.awaiting_reply());
        assert!(!controller.can_submit());
    }

    #[tokio::test]
    async fn labels_come_from_options() {
        let options = ControllerOptions {
            user_label: "Me".into(),
            assistant_label: "Bot".into(),
            ..ControllerOptions::default()
        };
        let mut controller = ConversationController::new(
            ConversationId::new("1"),
            Box::new(MockChannel::new()),
            MessageStore::in_memory(KEY),
            options,
        );
        controller.start().await;
        controller.submit("x").await.unwrap();
        controller.on_frame("y").await;
        assert_eq!(controller.messages()[0].author, "Me");
        assert_eq!(controller.messages()[1].author, "Bot");
    }
}
