// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Markdown to HTML conversion via comrak.
//!
//! Raw HTML embedded in the markdown is passed through untouched so the
//! sanitizer can decide what survives; the output of this module is never
//! displayed without going through [`crate::sanitize`].

use comrak::{Options, markdown_to_html};

/// GFM-flavored options: tables, strikethrough, autolinks, task lists.
fn options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.r#unsafe = true;
    options
}

/// Converts markdown source to (unsanitized) HTML.
pub fn to_html(markdown: &str) -> String {
    markdown_to_html(markdown, &options())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_becomes_strong() {
        assert_eq!(to_html("**Hi!**"), "<p><strong>Hi!</strong></p>\n");
    }

    #[test]
    fn lists_and_code_spans() {
        let html = to_html("- one\n- `two`\n");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<code>two</code>"));
    }

    #[test]
    fn bare_urls_are_autolinked() {
        let html = to_html("see https://example.com");
        assert!(html.contains("<a href=\"https://example.com\">"));
    }

    #[test]
    fn inline_html_is_left_for_the_sanitizer() {
        let html = to_html("hi <b>there</b>");
        assert!(html.contains("<b>there</b>"));
    }
}
