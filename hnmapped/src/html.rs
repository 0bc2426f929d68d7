//! Markup helpers: tag stripping, search-term highlighting and escaping.
//!
//! These are regular-expression heuristics, not an html parser. Nested or
//! malformed markup (a `>` inside an attribute value, an unterminated tag)
//! can be mis-handled. That is accepted: post bodies come from a forum that
//! produces simple, well-formed markup.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

use crate::config::HIGHLIGHT_CLASS;

/// A run of one or more consecutive tags. Each tag is matched lazily and
/// never spans a newline.
static TAG_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:<.*?>)+").expect("tag regex"));

/// A single tag: `<`, anything but angle brackets, `>`.
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("tag regex"));

/// Replaces every run of consecutive tags with a single space.
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    TAG_RUN.replace_all(html, " ")
}

/// Wraps every non-empty match of `pattern` that lies outside a tag in
/// `<span class="highlight">`. Text inside tags (names, attributes) is copied
/// unchanged, so the markup stays valid.
pub fn highlight(html: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for tag in TAG.find_iter(html) {
        highlight_text(&html[last..tag.start()], pattern, &mut out);
        out.push_str(tag.as_str());
        last = tag.end();
    }
    highlight_text(&html[last..], pattern, &mut out);
    out
}

fn highlight_text(text: &str, pattern: &Regex, out: &mut String) {
    let mut last = 0;
    for found in pattern.find_iter(text) {
        if found.is_empty() {
            continue;
        }
        out.push_str(&text[last..found.start()]);
        out.push_str("<span class=\"");
        out.push_str(HIGHLIGHT_CLASS);
        out.push_str("\">");
        out.push_str(found.as_str());
        out.push_str("</span>");
        last = found.end();
    }
    out.push_str(&text[last..]);
}

/// Escapes a value for inclusion in html text or a quoted attribute.
/// Same character set as mustache: `& < > " ' / ` =`.
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'', '/', '`', '=']) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 16);
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&#x2F;"),
            '`' => out.push_str("&#x60;"),
            '=' => out.push_str("&#x3D;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
