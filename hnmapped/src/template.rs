//! Placeholder templates
//!
//! A small subset of mustache: `{{ key }}` inserts the html-escaped value and
//! `{{{ key }}}` inserts the value unchanged. Whitespace inside the braces is
//! ignored and a key missing from the view renders as nothing. There are no
//! sections, partials, or comments.
//!

use std::collections::HashMap;

use snafu::prelude::*;

use crate::{Result, html::escape, prelude::*};

/// Fragment rendered for each visible post, in list items and map popups.
pub const POST_TEMPLATE: &str = r#"<div class="post">
<h3>{{location}}</h3>
<h4>{{type_of_post}}</h4>
<a href="{{link}}">link</a>
// Posted by <a href="https://news.ycombinator.com/user?id={{user}}">{{user}}</a>
<p>{{{ post_html }}}</p>
</div>"#;

/// Status line shown after every render
pub const STATUS_TEMPLATE: &str = "<p>Displaying {{ count }} posts</p>";

/// Values substituted into a template, by key
pub type View<'a> = HashMap<&'a str, String>;

/// Renders `template` with values from `view`.
///
/// Returns a `Template` error if a tag is opened but never closed.
pub fn render(template: &str, view: &View<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let tag = &rest[open..];
        let (raw, body, close) = match tag.strip_prefix("{{{") {
            Some(body) => (true, body, "}}}"),
            None => (false, &tag[2..], "}}"),
        };
        let end = body.find(close).context(TemplateSnafu {
            message: format!(
                "unclosed tag at offset {}",
                template.len() - tag.len()
            ),
        })?;

        let value = view.get(body[..end].trim()).map_or("", String::as_str);
        if raw {
            out.push_str(value);
        } else {
            out.push_str(&escape(value));
        }
        rest = &body[end + close.len()..];
    }
    out.push_str(rest);
    Ok(out)
}
