// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal presentation of message records.

use chrono::Local;
use colored::Colorize;
use palaver_core::{ContentKind, MessageRecord, Position};
use palaver_render::Sanitizer;
use palaver_render::display::record_html;
use tracing::debug;

/// Column width used when converting HTML to terminal text.
pub const WIDTH: usize = 100;

/// Terminal text for a record's body.
///
/// SAFE_HTML goes through the display-time sanitizer and is then laid out
/// as text; PLAIN_TEXT is shown verbatim.
pub fn body_text(sanitizer: &Sanitizer, record: &MessageRecord, width: usize) -> String {
    match record.content_kind {
        ContentKind::PlainText => record.text.clone(),
        ContentKind::SafeHtml => {
            let html = record_html(sanitizer, record);
            match html2text::from_read(html.as_bytes(), width) {
                Ok(text) => text.trim_end().to_string(),
                Err(e) => {
                    debug!(error = %e, "html layout failed, showing markup");
                    html
                }
            }
        }
    }
}

/// A record with its author line, ready to print.
pub fn format_record(sanitizer: &Sanitizer, record: &MessageRecord) -> String {
    let time = record.timestamp.with_timezone(&Local).format("%H:%M");
    let author = match (record.position, record.content_kind) {
        (Position::Outgoing, _) => record.author.green().bold(),
        (Position::Incoming, ContentKind::SafeHtml) => record.author.cyan().bold(),
        (Position::Incoming, ContentKind::PlainText) => record.author.yellow().bold(),
    };
    let body = body_text(sanitizer, record, WIDTH);
    format!("{author} {}\n{body}\n", time.to_string().dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::Rendered;

    fn peer_html(html: &str) -> MessageRecord {
        MessageRecord::incoming(
            Rendered {
                content_kind: ContentKind::SafeHtml,
                text: html.into(),
            },
            "AI",
        )
    }

    #[test]
    fn plain_text_is_verbatim() {
        let record = MessageRecord::outgoing("<b>literal</b>", "You");
        assert_eq!(body_text(&Sanitizer::new(), &record, WIDTH), "<b>literal</b>");
    }

    #[test]
    fn safe_html_is_laid_out_as_text() {
        let record = peer_html("<p><strong>Hi!</strong></p>");
        let text = body_text(&Sanitizer::new(), &record, WIDTH);
        assert!(text.contains("Hi!"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn tampered_script_never_reaches_the_terminal() {
        let record = peer_html("<p>ok</p><script>alert(1)</script>");
        let text = body_text(&Sanitizer::new(), &record, WIDTH);
        assert!(text.contains("ok"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn formatted_record_has_author_and_body() {
        colored::control::set_override(false);
        let line = format_record(&Sanitizer::new(), &MessageRecord::outgoing("Hello", "You"));
        assert!(line.starts_with("You "));
        assert!(line.contains("\nHello\n"));
    }
}
