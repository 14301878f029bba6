//! TextBlock Widget
//!
//! A borderless, scrollable region of styled lines, wrapped at word
//! boundaries and anchored to the bottom: offset 0 shows the latest line.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::StatefulWidget;
use unicode_width::UnicodeWidthStr;

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total wrapped lines at the last render
    pub total_lines: usize,
}

impl TextBlockState {
    /// Scroll towards older lines
    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max);
    }

    /// Scroll towards newer lines
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Show the latest line
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

/// Wrap one styled line to `width` columns, keeping span styles
pub fn wrap_line(line: &Line<'_>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return Vec::new();
    }

    let mut rows: Vec<Vec<Span<'static>>> = vec![Vec::new()];
    let mut row_width = 0;

    for span in &line.spans {
        for word in split_keep_spaces(&span.content) {
            let word_width = word.width();
            if row_width + word_width > width && row_width > 0 {
                if word.trim().is_empty() {
                    continue;
                }
                rows.push(Vec::new());
                row_width = 0;
            }

            if word_width > width {
                // A word longer than the row is broken by characters
                let mut chunk = String::new();
                for c in word.chars() {
                    let cw = c.to_string().width();
                    if row_width + cw > width {
                        if let Some(row) = rows.last_mut() {
                            row.push(Span::styled(std::mem::take(&mut chunk), span.style));
                        }
                        rows.push(Vec::new());
                        row_width = 0;
                    }
                    chunk.push(c);
                    row_width += cw;
                }
                if let Some(row) = rows.last_mut() {
                    row.push(Span::styled(chunk, span.style));
                }
                continue;
            }

            if let Some(row) = rows.last_mut() {
                row.push(Span::styled(word.to_string(), span.style));
            }
            row_width += word_width;
        }
    }

    rows.into_iter().map(Line::from).collect()
}

/// Split into words, each keeping its trailing whitespace
fn split_keep_spaces(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_space = true;
        } else if in_space {
            parts.push(&text[start..i]);
            start = i;
            in_space = false;
        }
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    lines: &'a [Line<'a>],
    fade: bool,
}

impl<'a> TextBlock<'a> {
    /// Create a block over pre-styled lines
    pub fn new(lines: &'a [Line<'a>]) -> Self {
        Self { lines, fade: true }
    }

    /// Dim the edge rows when there is more content beyond them
    #[must_use]
    pub fn fade(mut self, fade: bool) -> Self {
        self.fade = fade;
        self
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let width = area.width as usize;
        let height = area.height as usize;

        let wrapped: Vec<Line<'static>> = self
            .lines
            .iter()
            .flat_map(|line| {
                if line.spans.is_empty() {
                    vec![Line::default()]
                } else {
                    wrap_line(line, width)
                }
            })
            .collect();

        state.total_lines = wrapped.len();

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let visible_end = state.total_lines - state.scroll_offset;
        let visible_start = visible_end.saturating_sub(height);
        let has_content_above = visible_start > 0;
        let has_content_below = state.scroll_offset > 0;

        for (i, line) in wrapped[visible_start..visible_end].iter().enumerate() {
            let y = area.y + i as u16;
            let faded = self.fade
                && ((has_content_above && i == 0)
                    || (has_content_below && i + 1 == visible_end - visible_start));
            if faded {
                let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
                buf.set_string(area.x, y, text, Style::default().fg(Color::Rgb(90, 90, 90)));
            } else {
                buf.set_line(area.x, y, line, area.width);
            }
        }
    }
}
