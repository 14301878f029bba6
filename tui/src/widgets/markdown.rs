//! Markdown to Terminal Lines
//!
//! Answers arrive as Markdown. The web rendering goes through the Conductor's
//! HTML sanitizer; the terminal equivalent is this converter, which turns the
//! same text into styled ratatui [`Line`]s.
//!
//! Terminal escape sequences are the terminal's script injection, so every
//! control character except tab is dropped before text reaches a span. Raw
//! HTML in an answer is never interpreted, only shown dimmed as text.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::{ASSISTANT_TEXT, CODE_YELLOW, DIM_GRAY, INEXAI_TEAL, LINK_BLUE};

/// Drop control characters (escape sequences, carriage returns, bells)
pub fn strip_control(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\t')
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect()
}

/// A list being rendered: `None` for bullets, the next number otherwise
struct ListState {
    next_number: Option<u64>,
}

struct Renderer {
    base: Style,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<ListState>,
    quote_depth: usize,
    in_code_block: bool,
    link_urls: Vec<String>,
}

impl Renderer {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![base],
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            link_urls: Vec::new(),
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn prefix(&self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        for _ in 0..self.quote_depth {
            prefix.push(Span::styled("│ ", Style::default().fg(DIM_GRAY)));
        }
        if self.lists.len() > 1 {
            prefix.push(Span::raw("  ".repeat(self.lists.len() - 1)));
        }
        prefix
    }

    fn text(&mut self, text: &str) {
        let clean = strip_control(text);
        if clean.is_empty() {
            return;
        }
        if self.current.is_empty() {
            self.current = self.prefix();
        }
        self.current.push(Span::styled(clean, self.style()));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            let spans = std::mem::take(&mut self.current);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.blank();
                let marker = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    _ => "### ",
                };
                self.push_style(
                    Style::default()
                        .fg(INEXAI_TEAL)
                        .add_modifier(Modifier::BOLD),
                );
                self.text(marker);
            }
            Tag::BlockQuote { .. } => {
                self.blank();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.blank();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.current = self.prefix();
                        self.current
                            .push(Span::styled(format!("[{lang}]"), Style::default().fg(DIM_GRAY)));
                        self.flush();
                    }
                }
                self.push_style(Style::default().fg(CODE_YELLOW));
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
                self.lists.push(ListState { next_number: start });
            }
            Tag::Item => {
                self.flush();
                let bullet = match self.lists.last_mut() {
                    Some(ListState {
                        next_number: Some(n),
                    }) => {
                        let bullet = format!("{n}. ");
                        *n += 1;
                        bullet
                    }
                    _ => "• ".to_string(),
                };
                self.current = self.prefix();
                self.current
                    .push(Span::styled(bullet, Style::default().fg(INEXAI_TEAL)));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
            }
            Tag::Link { dest_url, .. } => {
                self.link_urls.push(strip_control(&dest_url));
                self.push_style(
                    Style::default()
                        .fg(LINK_BLUE)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Tag::Image { dest_url, .. } => {
                self.link_urls.push(strip_control(&dest_url));
                self.push_style(Style::default().fg(DIM_GRAY));
                self.text("[imagem: ");
            }
            Tag::Table(_) => self.blank(),
            Tag::TableHead => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::TableRow => self.flush(),
            Tag::TableCell => {
                if !self.current.is_empty() {
                    self.text(" │ ");
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
            }
            TagEnd::Heading(_) => {
                self.pop_style();
                self.blank();
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                self.pop_style();
                self.in_code_block = false;
                self.blank();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                } else {
                    self.flush();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_urls.pop() {
                    self.current
                        .push(Span::styled(format!(" ({url})"), Style::default().fg(DIM_GRAY)));
                }
            }
            TagEnd::Image => {
                self.text("]");
                self.pop_style();
                self.link_urls.pop();
            }
            TagEnd::TableHead => {
                self.pop_style();
                self.flush();
            }
            TagEnd::TableRow => self.flush(),
            TagEnd::Table => self.blank(),
            _ => {}
        }
    }

    fn code_block_text(&mut self, text: &str) {
        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            if lines.peek().is_none() && line.is_empty() {
                break;
            }
            self.current = self.prefix();
            self.current.push(Span::raw("  "));
            self.current
                .push(Span::styled(strip_control(line), self.style()));
            self.flush();
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code_block => self.code_block_text(&text),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.push_style(Style::default().fg(CODE_YELLOW));
                self.text(&code);
                self.pop_style();
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_style(Style::default().fg(DIM_GRAY));
                for (i, line) in html.lines().enumerate() {
                    if i > 0 {
                        self.flush();
                    }
                    self.text(line);
                }
                self.pop_style();
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.blank();
                self.lines.push(Line::styled(
                    "────────────────",
                    Style::default().fg(DIM_GRAY),
                ));
                self.blank();
            }
            Event::TaskListMarker(done) => self.text(if done { "[x] " } else { "[ ] " }),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Convert Markdown to styled terminal lines (not yet wrapped)
pub fn to_lines(markdown: &str) -> Vec<Line<'static>> {
    to_lines_with_style(markdown, Style::default().fg(ASSISTANT_TEXT))
}

/// Convert Markdown to styled terminal lines with a base style
pub fn to_lines_with_style(markdown: &str, base: Style) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut renderer = Renderer::new(base);
    for event in Parser::new_ext(markdown, options) {
        renderer.event(event);
    }
    renderer.finish()
}

/// Plain text, one line per input line, control characters dropped
pub fn plain_lines(text: &str, style: Style) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::styled(strip_control(line), style))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn flat(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_paragraphs() {
        let lines = to_lines("Primeiro parágrafo.\n\nSegundo.");
        assert_eq!(flat(&lines), vec!["Primeiro parágrafo.", "", "Segundo."]);
    }

    #[test]
    fn test_emphasis_styles() {
        let lines = to_lines("Os **ODS** são _globais_.");
        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "ODS")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let italic = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "globais")
            .unwrap();
        assert!(italic.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_lists() {
        let lines = to_lines("- um\n- dois\n\n1. primeiro\n2. segundo");
        assert_eq!(
            flat(&lines),
            vec!["• um", "• dois", "", "1. primeiro", "2. segundo"]
        );
    }

    #[test]
    fn test_heading_and_code_block() {
        let lines = to_lines("# Título\n\n```rust\nfn main() {}\n```");
        assert_eq!(flat(&lines), vec!["# Título", "", "[rust]", "  fn main() {}"]);
    }

    #[test]
    fn test_link_shows_url() {
        let lines = to_lines("[ONU](https://sdgs.un.org)");
        assert_eq!(flat(&lines), vec!["ONU (https://sdgs.un.org)"]);
    }

    #[test]
    fn test_html_is_shown_not_interpreted() {
        let lines = to_lines("antes <b>negrito</b> depois");
        assert_eq!(flat(&lines), vec!["antes <b>negrito</b> depois"]);
    }

    #[test]
    fn test_escape_sequences_dropped() {
        let lines = to_lines("perigo\u{1b}[2J limpo\u{7}");
        assert_eq!(flat(&lines), vec!["perigo[2J limpo"]);
        assert_eq!(strip_control("a\tb\r"), "a b");
    }

    #[test]
    fn test_interruption_marker_renders() {
        let lines = to_lines("Os ODS  \n\n_Resposta interrompida._");
        assert_eq!(flat(&lines).last().unwrap(), "Resposta interrompida.");
    }

    #[test]
    fn test_partial_markdown() {
        // Frames reveal prefixes that may cut a construct in half
        for prefix in ["**neg", "[link](http", "```\ncod", "- item\n-"] {
            let _ = to_lines(prefix);
        }
    }
}
