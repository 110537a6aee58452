// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML sanitization policy.
//!
//! Built on ammonia's allowlist: `<script>`/`<style>` are removed with their
//! content, `on*` handlers and unknown attributes are dropped, and URLs with
//! non-allowlisted schemes (`javascript:`, `data:`, ...) are stripped. Every
//! surviving link is forced to open in a new tab without an opener. The only
//! form control kept is the read-only checkbox of a task list.

use ammonia::Builder;

/// `rel` value applied to every `<a>`.
pub const LINK_REL: &str = "noopener noreferrer";

/// `target` value applied to every `<a>`.
pub const LINK_TARGET: &str = "_blank";

/// A reusable sanitizer with the link policy baked in.
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();
        builder
            .link_rel(Some(LINK_REL))
            .set_tag_attribute_value("a", "target", LINK_TARGET)
            .add_tags(["del", "input"])
            .add_tag_attributes("input", ["checked"])
            .set_tag_attribute_value("input", "type", "checkbox")
            .set_tag_attribute_value("input", "disabled", "");
        Self { builder }
    }

    /// Removes executable content from `html`, keeping inline formatting.
    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes arbitrary text so it displays literally inside HTML.
pub fn escape_text(text: &str) -> String {
    ammonia::clean_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_event_handlers() {
        let clean = Sanitizer::new().clean("<div onclick='x()'>hi</div>");
        assert_eq!(clean, "<div>hi</div>");
    }

    #[test]
    fn removes_script_with_content() {
        let clean = Sanitizer::new().clean("<p>a</p><script>alert(1)</script><p>b</p>");
        assert!(!clean.contains("<script"));
        assert!(!clean.contains("alert(1)"));
        assert!(clean.contains("<p>a</p>"));
        assert!(clean.contains("<p>b</p>"));
    }

    #[test]
    fn drops_javascript_urls() {
        let clean = Sanitizer::new().clean("<a href=\"javascript:alert(1)\">x</a>");
        assert!(!clean.contains("javascript:"));
    }

    #[test]
    fn forces_safe_link_attributes() {
        let clean = Sanitizer::new().clean("<a href=\"https://example.com\">x</a>");
        assert!(clean.contains("href=\"https://example.com\""));
        assert!(clean.contains("rel=\"noopener noreferrer\""));
        assert!(clean.contains("target=\"_blank\""));
    }

    #[test]
    fn keeps_inline_formatting() {
        let html = "<p><em>a</em> <strong>b</strong> <code>c</code> <del>d</del></p>";
        assert_eq!(Sanitizer::new().clean(html), html);
    }

    #[test]
    fn inputs_only_survive_as_disabled_checkboxes() {
        let sanitizer = Sanitizer::new();
        for html in [
            "<input type=\"password\" name=\"pw\">",
            "<input type=\"text\" value=\"x\">",
            "<input>",
        ] {
            let clean = sanitizer.clean(html);
            assert!(clean.contains("type=\"checkbox\""), "{clean}");
            assert!(clean.contains("disabled"), "{clean}");
            assert!(!clean.contains("password"), "{clean}");
            assert!(!clean.contains("name="), "{clean}");
            assert!(!clean.contains("value="), "{clean}");
        }
    }

    #[test]
    fn task_list_checkbox_keeps_checked_state() {
        let clean = Sanitizer::new().clean("<input type=\"checkbox\" checked=\"\">");
        assert!(clean.contains("type=\"checkbox\""));
        assert!(clean.contains("checked"));
    }

    #[test]
    fn escape_text_neutralizes_markup() {
        let escaped = escape_text("<b>x</b>");
        assert!(!escaped.contains('<'));
        assert!(escaped.contains("&lt;"));
    }
}
