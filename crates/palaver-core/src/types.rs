// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the renderer, store, channel, and controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Key selecting which channel and session a controller binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Storage,
}

/// Which side of the conversation authored a record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Position {
    /// Written by the local user.
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    Outgoing,
    /// Written by the assistant, or a system notice shown on its side.
    #[serde(rename = "peer")]
    #[strum(serialize = "peer")]
    Incoming,
}

/// How a record's `text` must be treated when displayed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentKind {
    /// Literal text; must be escaped before it reaches markup.
    PlainText,
    /// Markup already stripped of executable content.
    SafeHtml,
}

/// One immutable unit of conversation history.
///
/// Records are created once, appended to the message store, and never
/// modified afterwards. Insertion order is conversation order; timestamps are
/// informational and may collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub position: Position,
    pub content_kind: ContentKind,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageRecord {
    /// A record for text the user submitted.
    pub fn outgoing(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            position: Position::Outgoing,
            content_kind: ContentKind::PlainText,
            text: text.into(),
            author: author.into(),
            timestamp: Utc::now(),
        }
    }

    /// A record for a rendered assistant frame.
    pub fn incoming(rendered: Rendered, author: impl Into<String>) -> Self {
        Self {
            position: Position::Incoming,
            content_kind: rendered.content_kind,
            text: rendered.text,
            author: author.into(),
            timestamp: Utc::now(),
        }
    }

    /// A plain-text notice shown on the assistant side (connection errors, etc.).
    pub fn notice(text: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            position: Position::Incoming,
            content_kind: ContentKind::PlainText,
            text: text.into(),
            author: author.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Output of the sanitizing renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content_kind: ContentKind,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serializes_as_self_and_peer() {
        assert_eq!(serde_json::to_string(&Position::Outgoing).unwrap(), "\"self\"");
        assert_eq!(serde_json::to_string(&Position::Incoming).unwrap(), "\"peer\"");
        assert_eq!(Position::Outgoing.to_string(), "self");
    }

    #[test]
    fn content_kind_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&ContentKind::SafeHtml).unwrap(),
            "\"safe_html\""
        );
        let parsed: ContentKind = "plain_text".parse().unwrap();
        assert_eq!(parsed, ContentKind::PlainText);
    }

    #[test]
    fn outgoing_record_is_plain_text() {
        let record = MessageRecord::outgoing("Hello", "You");
        assert_eq!(record.position, Position::Outgoing);
        assert_eq!(record.content_kind, ContentKind::PlainText);
        assert_eq!(record.text, "Hello");
        assert_eq!(record.author, "You");
    }

    #[test]
    fn incoming_record_takes_rendered_kind() {
        let rendered = Rendered {
            content_kind: ContentKind::SafeHtml,
            text: "<p>hi</p>".into(),
        };
        let record = MessageRecord::incoming(rendered, "AI");
        assert_eq!(record.position, Position::Incoming);
        assert_eq!(record.content_kind, ContentKind::SafeHtml);
    }

    #[test]
    fn timestamp_survives_json_round_trip() {
        let record = MessageRecord::outgoing("x", "You");
        let json = serde_json::to_string(&record).unwrap();
        let back: MessageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn conversation_id_displays_raw_value() {
        let id = ConversationId::new("thread-7");
        assert_eq!(id.to_string(), "thread-7");
        assert_eq!(id.as_str(), "thread-7");
    }
}
