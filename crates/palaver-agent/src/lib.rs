// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation controller and event loop for the Palaver chat client.
//!
//! The [`ConversationController`] is the central coordinator that:
//! - Restores history and opens the channel on start
//! - Sends user turns and appends them to the log
//! - Renders inbound frames and appends them to the log
//! - Drives the "assistant is typing" indicator
//!
//! A view talks to a running controller through [`Intent`]s and reads
//! [`ConversationSnapshot`]s back.

pub mod controller;
pub mod event_loop;
pub mod intent;
pub mod shutdown;

pub use controller::{
    CONNECTION_CLOSED_NOTICE, CONNECTION_ERROR_NOTICE, ControllerOptions, ConversationController,
    ConversationState,
};
pub use intent::{ConversationSnapshot, Intent};
pub use shutdown::install_signal_handler;
