//! Markdown Rendering
//!
//! Answers arrive as Markdown. Every message, and every frame of an answer
//! that is still being revealed, goes through [`render`]: CommonMark to HTML,
//! then an allow-list sanitizer. The result is safe to inject into a DOM.
//!
//! Script-bearing constructs never survive: `<script>`/`<style>` elements and
//! their content, inline event handlers (`onerror`, `onclick`, ...) and any URL
//! scheme other than `http`, `https` and `mailto`.

use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_cmark::{html, Options, Parser};

use crate::conversation::Message;
use crate::messages::MessageRole;

/// Render Markdown text to sanitized HTML
#[must_use]
pub fn render(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(text, options);
    let mut raw = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut raw, parser);

    sanitize(&raw)
}

/// Sanitize an HTML fragment against the message allow-list
///
/// Idempotent: `sanitize(&sanitize(h)) == sanitize(h)`.
#[must_use]
pub fn sanitize(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

/// Built once; every revealed character re-renders its frame
static SANITIZER: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::default();
    builder
        .url_schemes(HashSet::from(["http", "https", "mailto"]))
        .link_rel(Some("noopener noreferrer"))
        .strip_comments(true);
    builder
});

/// Build a standalone HTML document of a conversation
#[must_use]
pub fn export_transcript(title: &str, messages: &[Message]) -> String {
    let mut body = String::new();

    for message in messages {
        let class = match message.role {
            MessageRole::User => "message user-message",
            MessageRole::Assistant => "message ai-message",
        };
        body.push_str(&format!("<div class=\"{class}\">\n"));
        body.push_str("<div class=\"message-content\">");
        body.push_str(&render(&message.text));
        body.push_str("</div>\n");

        for attachment in &message.attachments {
            body.push_str(&format!(
                "<span class=\"attachment\">{} ({})</span>\n",
                ammonia::clean_text(attachment.name()),
                attachment.size_label()
            ));
        }
        body.push_str("</div>\n");
    }

    let title = ammonia::clean_text(title);
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n"
    )
}
