//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for the conversation
//! - DisplayState for rendering
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ InExAI  Seu assistente de inteligência ...   │ header
//! │                                              │
//! │ conversation / welcome panel                 │
//! │                                              │
//! │ [relatorio.pdf (0.12 MB)]                    │ attachment chip
//! │ ──────────────────────────────────── 12/2000 │
//! │ > input                                      │
//! │ Pronto | Modo: Generativo | Esc sair ...     │ status
//! └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use inexai_conductor::config::MAX_QUESTION_CHARS;
use inexai_conductor::{
    AnswerBackend, ChatConfig, HttpAnswerBackend, MessageRole, NotifyLevel, SUGGESTED_QUESTIONS,
};

use crate::conductor_client::ConductorClient;
use crate::display::{DisplayNotification, DisplayState};
use crate::theme::{
    assistant_label, user_label, CHIP_BG, DIM_GRAY, ERROR_RED, INEXAI_SAND, INEXAI_TEAL,
    USER_GREEN, WARNING_AMBER,
};
use crate::widgets::markdown;
use crate::widgets::{TextBlock, TextBlockState};

/// Time between frames (~60 FPS); typing advances on wall-clock deadlines
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Input box height (lines) including the separator
const INPUT_HEIGHT: u16 = 4;

/// Lines scrolled per mouse wheel step
const WHEEL_LINES: usize = 3;

/// Shown instead of the conversation when it is empty
const PLACEHOLDER: &str = "Faça uma pergunta para começar...";

/// Input placeholder
const INPUT_PLACEHOLDER: &str = "Envie uma mensagem...";

/// Main application state
pub struct App<B: AnswerBackend + 'static = HttpAnswerBackend> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient<B>,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === Input State ===
    /// User input buffer
    input: String,
    /// Conversation scroll state (lines from bottom)
    scroll: TextBlockState,
    /// Visible conversation height at the last render
    page_height: u16,
}

impl App<HttpAnswerBackend> {
    /// Create an App talking to the configured answering service
    pub fn new(config: ChatConfig) -> Self {
        Self::with_client(ConductorClient::new(config))
    }
}

impl<B: AnswerBackend + 'static> App<B> {
    /// Create an App over an existing client
    pub fn with_client(conductor: ConductorClient<B>) -> Self {
        Self {
            running: true,
            conductor,
            display: DisplayState::new(),
            input: String::new(),
            scroll: TextBlockState::default(),
            page_height: 10,
        }
    }

    /// Whether the loop should keep going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Display state (for rendering and tests)
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Current input buffer
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The embedded client
    pub fn conductor(&self) -> &ConductorClient<B> {
        &self.conductor
    }

    /// Main event loop
    pub async fn run<T: Backend>(&mut self, terminal: &mut Terminal<T>) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        self.connect().await?;
        terminal.draw(|frame| self.render(frame))?;

        while self.running {
            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event).await,
                        Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                        None => self.running = false,
                    }
                }

                // Frame tick
                () = tokio::time::sleep(FRAME_INTERVAL) => {}
            }

            self.tick().await;

            terminal.draw(|frame| self.render(frame))?;

            if self.display.quit {
                self.running = false;
            }
        }

        Ok(())
    }

    /// Connect to the Conductor and apply the initial state
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.conductor.connect().await?;
        self.process_conductor_messages();
        Ok(())
    }

    /// Pick up answers, advance typing, and apply what the Conductor sent
    pub async fn tick(&mut self) {
        self.conductor.poll().await;
        self.process_conductor_messages();
    }

    /// Process all pending messages from the Conductor
    pub fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            self.display.apply_message(msg);
        }
    }

    /// Handle one terminal event
    pub async fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key).await,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Paste(text) => self.insert_text(&text),
            _ => {}
        }
    }

    /// Handle keyboard input and apply the Conductor's response
    pub async fn handle_key(&mut self, key: KeyEvent) {
        // The alert popup blocks everything until dismissed
        if self.display.alert.is_some() {
            self.display.dismiss_alert();
            return;
        }

        self.dispatch_key(key).await;
        self.process_conductor_messages();
    }

    async fn dispatch_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit().await;
            }

            // Cancel typing, or quit when there is nothing to cancel
            KeyCode::Esc => {
                if self.display.is_typing() {
                    log_error(self.conductor.cancel_typing().await);
                } else if !self.display.is_loading() {
                    self.quit().await;
                }
            }

            // Mentor mode
            KeyCode::Tab => {
                let mode = self.display.mentor_mode.toggled();
                log_error(self.conductor.set_mentor_mode(mode).await);
            }

            // Newline
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.insert_text("\n");
            }

            // Submit
            KeyCode::Enter => self.submit().await,

            // Suggested questions
            KeyCode::Char(c @ '1'..='4')
                if self.input.is_empty()
                    && self.display.welcome_visible
                    && !self.display.is_loading() =>
            {
                let index = (c as usize) - ('1' as usize);
                self.scroll.scroll_to_bottom();
                log_error(self.conductor.select_suggestion(index).await);
            }

            // Typing
            KeyCode::Char(c) => {
                self.insert_text(&c.to_string());
            }
            KeyCode::Backspace => {
                if !self.display.is_loading() {
                    self.input.pop();
                }
            }

            // Conversation scrolling
            KeyCode::PageUp => {
                self.scroll.scroll_up(self.page_size());
            }
            KeyCode::PageDown => {
                self.scroll.scroll_down(self.page_size());
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll.scroll_to_bottom();
            }

            _ => {}
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll.scroll_up(WHEEL_LINES),
            MouseEventKind::ScrollDown => self.scroll.scroll_down(WHEEL_LINES),
            _ => {}
        }
    }

    /// Append to the input, respecting the length cap (disabled while busy)
    fn insert_text(&mut self, text: &str) {
        if self.display.is_loading() {
            return;
        }
        let room = MAX_QUESTION_CHARS.saturating_sub(self.input.chars().count());
        self.input.extend(text.chars().take(room));
    }

    fn page_size(&self) -> usize {
        usize::from(self.page_height / 2).max(1)
    }

    /// Submit the input as a question or run it as a command
    async fn submit(&mut self) {
        if self.display.is_loading() || self.input.trim().is_empty() {
            return;
        }

        let input = std::mem::take(&mut self.input);
        if let Some(command) = input.trim_start().strip_prefix('/') {
            self.run_command(command).await;
            return;
        }

        self.scroll.scroll_to_bottom();
        log_error(self.conductor.send_question(input).await);
    }

    /// Slash commands: `/attach <path>`, `/detach`, `/clear`
    async fn run_command(&mut self, command: &str) {
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command.trim(), ""), |(n, a)| (n, a.trim()));

        match name {
            "attach" | "anexar" => {
                if arg.is_empty() {
                    self.notify_local(NotifyLevel::Warning, "Uso: /attach <caminho>");
                    return;
                }
                let path = expand_home(arg);
                if let Err(e) = self.conductor.attach_path(&path).await {
                    tracing::warn!(path = %path.display(), error = %e, "Could not read attachment");
                    self.display
                        .show_alert(format!("Não foi possível abrir o arquivo: {e}"));
                }
            }
            "detach" | "remover" => {
                log_error(self.conductor.remove_attachment().await);
            }
            "clear" | "limpar" => {
                self.scroll.scroll_to_bottom();
                log_error(self.conductor.clear_conversation().await);
            }
            other => {
                self.notify_local(
                    NotifyLevel::Warning,
                    &format!("Comando desconhecido: /{other}"),
                );
            }
        }
    }

    async fn quit(&mut self) {
        log_error(self.conductor.request_quit().await);
        self.running = false;
    }

    fn notify_local(&mut self, level: NotifyLevel, message: &str) {
        self.display.notification = Some(DisplayNotification {
            level,
            message: message.to_string(),
        });
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the whole UI into a frame
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let chip_height = u16::from(self.display.attachment.is_some());

        let [header, body, chip, input, status] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(chip_height),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.render_body(frame, body);
        self.render_chip(frame, chip);
        self.render_input(frame, input);
        self.render_status(frame, status);

        if let Some(alert) = &self.display.alert {
            render_alert(frame, area, alert);
        }
    }

    fn render_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                " InExAI ",
                Style::default()
                    .fg(INEXAI_TEAL)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                " Seu assistente de inteligência artificial",
                Style::default().fg(INEXAI_SAND),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), area);
    }

    fn render_body(&mut self, frame: &mut Frame<'_>, area: Rect) {
        self.page_height = area.height;
        let area = area.inner(ratatui::layout::Margin::new(1, 0));

        let mut lines: Vec<Line<'static>> = Vec::new();

        if self.display.welcome_visible {
            lines.extend(welcome_lines());
        } else if self.display.show_placeholder() {
            lines.push(Line::styled(PLACEHOLDER, Style::default().fg(DIM_GRAY)));
        }

        for message in self.display.visible_messages() {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            let label_style = match message.role {
                MessageRole::User => user_label(),
                MessageRole::Assistant => assistant_label(),
            };
            lines.push(Line::styled(message.label(), label_style));

            for attachment in &message.attachments {
                lines.push(Line::styled(
                    format!("[{} ({})]", attachment.name, attachment.size_label()),
                    Style::default().fg(DIM_GRAY),
                ));
            }

            match message.role {
                MessageRole::User => lines.extend(markdown::plain_lines(
                    &message.content,
                    Style::default().fg(USER_GREEN),
                )),
                MessageRole::Assistant => lines.extend(markdown::to_lines(&message.content)),
            }
            if message.typing {
                lines.push(Line::styled("▍", Style::default().fg(INEXAI_TEAL)));
            }
        }

        if matches!(
            self.display.conductor_state,
            inexai_conductor::ConductorState::Thinking
        ) {
            lines.push(Line::default());
            lines.push(Line::styled(
                "InExAI está pensando...",
                Style::default()
                    .fg(DIM_GRAY)
                    .add_modifier(Modifier::ITALIC),
            ));
        }

        frame.render_stateful_widget(TextBlock::new(&lines), area, &mut self.scroll);
    }

    fn render_chip(&self, frame: &mut Frame<'_>, area: Rect) {
        if let Some(attachment) = &self.display.attachment {
            let chip = Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    format!(" {} ({}) ", attachment.name, attachment.size_label()),
                    Style::default().bg(CHIP_BG),
                ),
                Span::styled("  /detach para remover", Style::default().fg(DIM_GRAY)),
            ]);
            frame.render_widget(Paragraph::new(chip), area);
        }
    }

    fn render_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let count = self.input.chars().count();
        let counter_style = if count >= MAX_QUESTION_CHARS {
            Style::default().fg(ERROR_RED)
        } else if count * 10 >= MAX_QUESTION_CHARS * 9 {
            Style::default().fg(WARNING_AMBER)
        } else {
            Style::default().fg(DIM_GRAY)
        };

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(DIM_GRAY))
            .title_top(
                Line::styled(format!(" {count}/{MAX_QUESTION_CHARS} "), counter_style)
                    .alignment(Alignment::Right),
            );

        let lines: Vec<Line<'_>> = if self.display.is_loading() {
            vec![Line::styled(
                self.display.conductor_state.description(),
                Style::default().fg(DIM_GRAY),
            )]
        } else if self.input.is_empty() {
            vec![Line::styled(INPUT_PLACEHOLDER, Style::default().fg(DIM_GRAY))]
        } else {
            let text_width = usize::from(area.width.saturating_sub(2)).max(1);
            let with_cursor = format!("{}▏", self.input);
            with_cursor
                .split('\n')
                .flat_map(|paragraph| textwrap::wrap(paragraph, text_width))
                .map(|row| Line::styled(format!(" {row}"), Style::default().fg(USER_GREEN)))
                .collect()
        };

        // Keep the end of long input visible
        let inner_height = usize::from(area.height.saturating_sub(1));
        let skip = lines.len().saturating_sub(inner_height);
        let visible: Vec<Line<'_>> = lines.into_iter().skip(skip).collect();

        frame.render_widget(Paragraph::new(visible).block(block), area);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let (text, style) = match &self.display.notification {
            Some(note) => {
                let color = match note.level {
                    NotifyLevel::Info => INEXAI_TEAL,
                    NotifyLevel::Warning => WARNING_AMBER,
                    NotifyLevel::Error => ERROR_RED,
                };
                (format!(" {}", note.message), Style::default().fg(color))
            }
            None => {
                let esc = if self.display.is_typing() {
                    "Esc parar resposta"
                } else {
                    "Esc sair"
                };
                let scroll = if self.scroll.scroll_offset > 0 {
                    format!(" | [^{} linhas]", self.scroll.scroll_offset)
                } else {
                    String::new()
                };
                (
                    format!(
                        " {} | Modo: {} (Tab) | {} | PgUp/PgDn rolar{}",
                        self.display.conductor_state.description(),
                        self.display.mentor_mode.label(),
                        esc,
                        scroll
                    ),
                    Style::default().fg(DIM_GRAY),
                )
            }
        };
        frame.render_widget(Paragraph::new(Line::styled(text, style)), area);
    }
}

/// Welcome panel with the numbered suggested questions
fn welcome_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled(
            "Como posso ajudar você hoje?",
            Style::default()
                .fg(INEXAI_TEAL)
                .add_modifier(Modifier::BOLD),
        ),
        Line::default(),
    ];
    for (i, question) in SUGGESTED_QUESTIONS.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", i + 1), Style::default().fg(INEXAI_TEAL)),
            Span::styled(
                (*question).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    lines.push(Line::default());
    lines.push(Line::styled(
        "Pressione 1-4 ou digite sua pergunta. /attach <arquivo> anexa um arquivo.",
        Style::default().fg(DIM_GRAY),
    ));
    lines
}

/// Centered blocking popup
fn render_alert(frame: &mut Frame<'_>, area: Rect, text: &str) {
    let width = area.width.min(60);
    let height = 5.min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ERROR_RED))
        .title(" Aviso ");
    let body = Paragraph::new(vec![
        Line::raw(text.to_string()),
        Line::styled(
            "Pressione qualquer tecla",
            Style::default().fg(DIM_GRAY),
        ),
    ])
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup);
    frame.render_widget(body, popup);
}

fn log_error(result: anyhow::Result<()>) {
    if let Err(e) = result {
        tracing::error!("Conductor event failed: {}", e);
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(path), |home| home.join(rest)),
        None => PathBuf::from(path),
    }
}
