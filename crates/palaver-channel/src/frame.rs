// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from raw WebSocket messages to conversation frames.

use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// What the reader task hands to `receive`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One UTF-8 text frame.
    Frame(String),
    /// The stream is over; carries the reason.
    Ended(String),
}

/// Classifies a socket message. `None` means "nothing to deliver".
///
/// Ping/pong replies are produced by tungstenite itself.
pub fn classify(message: Message) -> Option<Inbound> {
    match message {
        Message::Text(text) => Some(Inbound::Frame(text.as_str().to_owned())),
        Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Some(Inbound::Frame(text)),
            Err(_) => {
                warn!(bytes = bytes.len(), "dropping non-UTF-8 binary frame");
                None
            }
        },
        Message::Close(close) => {
            let reason = close
                .map(|c| format!("closed by server ({}): {}", c.code, c.reason.as_str()))
                .unwrap_or_else(|| "closed by server".to_string());
            Some(Inbound::Ended(reason))
        }
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {
            debug!("ignoring control frame");
            None
        }
    }
}
