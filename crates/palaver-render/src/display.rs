// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display-time contract between stored records and a view.
//!
//! The view never sniffs payloads: `content_kind` was fixed at ingestion and
//! decides how a record becomes markup. SAFE_HTML is cleaned once more on the
//! way out so the link policy holds even for records restored from storage.

use palaver_core::{ContentKind, MessageRecord};

use crate::sanitize::{Sanitizer, escape_text};

/// Markup for one record, ready to inject into a page.
pub fn record_html(sanitizer: &Sanitizer, record: &MessageRecord) -> String {
    match record.content_kind {
        ContentKind::SafeHtml => sanitizer.clean(&record.text),
        ContentKind::PlainText => format!("<p>{}</p>", escape_text(&record.text)),
    }
}
