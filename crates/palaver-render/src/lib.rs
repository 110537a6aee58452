// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns untrusted inbound frames into content that is safe to display.
//!
//! Ingestion ([`SanitizingRenderer::render`]) happens once per frame:
//!
//! - a payload whose trimmed form starts with `<` is taken as pre-built
//!   markup and only sanitized;
//! - anything else is markdown, converted to HTML and then sanitized.
//!
//! Both paths produce [`ContentKind::SafeHtml`]. The assistant server sends
//! markdown in practice, so the markdown path is the common one.
//!
//! Display ([`display`]) is the separate, declarative step that turns a stored
//! record into markup according to its `content_kind`.

pub mod display;
pub mod markdown;
pub mod sanitize;

use palaver_core::{ContentKind, PalaverError, Rendered};
use tracing::{debug, warn};

pub use sanitize::Sanitizer;

/// Payloads above this size are not parsed and are shown as escaped text.
pub const MAX_PAYLOAD_BYTES: usize = 512 * 1024;

/// Converts inbound payloads into sanitized HTML.
#[derive(Default)]
pub struct SanitizingRenderer {
    sanitizer: Sanitizer,
}

impl SanitizingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `payload` to [`ContentKind::SafeHtml`].
    ///
    /// Never fails: on a [`PalaverError::Render`] the payload is escaped and
    /// returned as literal text wrapped in a paragraph.
    pub fn render(&self, payload: &str) -> Rendered {
        let text = match self.try_render(payload) {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "falling back to escaped text");
                format!("<p>{}</p>", sanitize::escape_text(payload))
            }
        };
        Rendered {
            content_kind: ContentKind::SafeHtml,
            text,
        }
    }

    /// Renders `payload`, reporting payloads that cannot be parsed.
    pub fn try_render(&self, payload: &str) -> Result<String, PalaverError> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(PalaverError::Render {
                message: format!(
                    "payload of {} bytes exceeds the {MAX_PAYLOAD_BYTES} byte limit",
                    payload.len()
                ),
            });
        }

        let html = if looks_like_markup(payload) {
            debug!(bytes = payload.len(), "rendering payload as markup");
            self.sanitizer.clean(payload)
        } else {
            debug!(bytes = payload.len(), "rendering payload as markdown");
            self.sanitizer.clean(&markdown::to_html(payload))
        };
        Ok(html)
    }

    /// The sanitizer used for ingestion, shared with display-time cleaning.
    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }
}

/// Heuristic: payload (ignoring surrounding whitespace) starts with `<`.
pub fn looks_like_markup(payload: &str) -> bool {
    payload.trim_start().starts_with('<')
}
