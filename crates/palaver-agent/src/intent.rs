// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messages exchanged between a view and the controller's event loop.

use palaver_core::MessageRecord;

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Send the text as a new user turn.
    Submit(String),
    /// Replace the pending (unsent) input.
    Draft(String),
    /// Close the channel and stop the loop.
    Shutdown,
}

/// Everything a view needs to draw the conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationSnapshot {
    pub messages: Vec<MessageRecord>,
    pub awaiting_reply: bool,
    pub draft: String,
    /// Whether a submit would currently be accepted.
    pub connected: bool,
    /// Whether appends still reach durable storage.
    pub durable: bool,
    /// Why the most recent intent was refused, if it was.
    pub last_error: Option<String>,
    /// Count of refused submits this session; grows by one per refusal.
    pub refusals: u64,
}
