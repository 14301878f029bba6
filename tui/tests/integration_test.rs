//! Integration Tests for TUI + Conductor
//!
//! These tests drive the App the way a user does (key presses) against an
//! embedded Conductor with a scripted answering backend.
//!
//! # Test Coverage
//!
//! 1. **Startup**: welcome panel, suggestions, empty input
//! 2. **Question flow**: typing, Enter, typed answer
//! 3. **Cancel**: Esc while the answer is being typed
//! 4. **Attachments**: `/attach`, refusals raising the alert popup
//! 5. **Rendering**: TestBackend snapshots of the main elements

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use ratatui::backend::TestBackend;
use ratatui::Terminal;

use inexai_conductor::{
    Answer, AnswerBackend, AskRequest, ChatConfig, MentorMode, MessageRole, NotifyLevel,
    TransportError, BACKEND_UNAVAILABLE, INTERRUPTION_MARKER, SUGGESTED_QUESTIONS,
};
use inexai_tui::{App, ConductorClient};

// ============================================================================
// Scripted Backend
// ============================================================================

#[derive(Clone)]
struct ScriptedBackend {
    answer: String,
    healthy: bool,
    requests: Arc<Mutex<Vec<AskRequest>>>,
}

impl ScriptedBackend {
    fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            healthy: true,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn unreachable() -> Self {
        Self {
            healthy: false,
            ..Self::new("ok")
        }
    }

    fn requests(&self) -> Vec<AskRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    async fn ask(&self, request: &AskRequest) -> Result<Answer, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(Answer::new(self.answer.clone()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// One character revealed per tick, no waiting between ticks
fn test_config() -> ChatConfig {
    ChatConfig {
        typing_interval: Duration::ZERO,
        max_ticks_per_poll: 1,
        ..ChatConfig::default()
    }
}

async fn connected_app(backend: ScriptedBackend) -> App<ScriptedBackend> {
    let client = ConductorClient::with_backend(backend, test_config());
    let mut app = App::with_client(client);
    app.connect().await.unwrap();
    app
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

async fn type_text(app: &mut App<ScriptedBackend>, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c))).await;
    }
}

async fn tick_until(app: &mut App<ScriptedBackend>, what: &str, done: impl Fn(&App<ScriptedBackend>) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        app.tick().await;
        if done(app) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

async fn run_until_ready(app: &mut App<ScriptedBackend>) {
    tick_until(app, "answer", |app| app.conductor().is_ready()).await;
}

fn screen(app: &mut App<ScriptedBackend>, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_startup_shows_welcome() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    assert!(app.display().welcome_visible);
    assert!(app.display().messages.is_empty());

    let text = screen(&mut app, 100, 24);
    assert!(text.contains("InExAI"));
    assert!(text.contains("Como posso ajudar você hoje?"));
    assert!(text.contains(SUGGESTED_QUESTIONS[0]));
    assert!(text.contains("Envie uma mensagem..."));
    assert!(text.contains("0/2000"));
}

#[tokio::test]
async fn test_unreachable_service_warns_in_status_bar() {
    let mut app = connected_app(ScriptedBackend::unreachable()).await;

    tick_until(&mut app, "health warning", |app| {
        app.display().notification.is_some()
    })
    .await;

    let note = app.display().notification.clone().unwrap();
    assert_eq!(note.level, NotifyLevel::Warning);
    assert_eq!(note.message, BACKEND_UNAVAILABLE);
    assert!(screen(&mut app, 100, 24).contains("Serviço de respostas indisponível"));
}

#[tokio::test]
async fn test_typed_question_gets_answer() {
    let backend = ScriptedBackend::new("Os **ODS** são 17 objetivos.");
    let mut app = connected_app(backend.clone()).await;

    type_text(&mut app, "O que são os ODS?").await;
    assert_eq!(app.input(), "O que são os ODS?");

    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.input(), "");

    run_until_ready(&mut app).await;

    let messages = &app.display().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "O que são os ODS?");
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].content, "Os **ODS** são 17 objetivos.");
    assert!(!app.display().welcome_visible);

    assert_eq!(backend.requests()[0].question, "O que são os ODS?");

    let text = screen(&mut app, 100, 24);
    assert!(text.contains("Os ODS são 17 objetivos."));
    assert!(!text.contains("**"));
}

#[tokio::test]
async fn test_number_key_picks_suggestion() {
    let backend = ScriptedBackend::new("Resposta.");
    let mut app = connected_app(backend.clone()).await;

    app.handle_key(key(KeyCode::Char('2'))).await;
    run_until_ready(&mut app).await;

    assert_eq!(backend.requests()[0].question, SUGGESTED_QUESTIONS[1]);
    assert_eq!(app.display().messages[0].content, SUGGESTED_QUESTIONS[1]);
    assert_eq!(app.input(), "");
}

#[tokio::test]
async fn test_digits_are_text_after_welcome() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    type_text(&mut app, "oi").await;
    app.handle_key(key(KeyCode::Enter)).await;
    run_until_ready(&mut app).await;

    type_text(&mut app, "17").await;
    assert_eq!(app.input(), "17");
}

#[tokio::test]
async fn test_enter_ignored_while_loading() {
    let backend = ScriptedBackend::new("uma resposta um pouco longa");
    let mut app = connected_app(backend.clone()).await;

    type_text(&mut app, "primeira").await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(app.display().is_loading());

    // Input is disabled while busy
    type_text(&mut app, "segunda").await;
    assert_eq!(app.input(), "");
    app.handle_key(key(KeyCode::Enter)).await;

    run_until_ready(&mut app).await;
    assert_eq!(backend.requests().len(), 1);
}

#[tokio::test]
async fn test_shift_enter_inserts_newline() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    type_text(&mut app, "linha 1").await;
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT))
        .await;
    type_text(&mut app, "linha 2").await;

    assert_eq!(app.input(), "linha 1\nlinha 2");
    assert!(app.display().messages.is_empty());
}

#[tokio::test]
async fn test_input_is_capped() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    let long = "a".repeat(2010);
    type_text(&mut app, &long).await;
    assert_eq!(app.input().chars().count(), 2000);

    let text = screen(&mut app, 100, 24);
    assert!(text.contains("2000/2000"));
}

#[tokio::test]
async fn test_escape_cancels_typing() {
    let answer = "Uma resposta longa o bastante para ser interrompida no meio.";
    let mut app = connected_app(ScriptedBackend::new(answer)).await;

    type_text(&mut app, "pergunta").await;
    app.handle_key(key(KeyCode::Enter)).await;
    tick_until(&mut app, "typing", |app| app.display().is_typing()).await;
    for _ in 0..3 {
        app.tick().await;
    }

    app.handle_key(key(KeyCode::Esc)).await;
    assert!(app.is_running());
    run_until_ready(&mut app).await;

    let last = app.display().messages.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert!(last.content.ends_with(INTERRUPTION_MARKER));
    assert!(answer.starts_with(last.content.trim_end_matches(INTERRUPTION_MARKER)));
    assert!(!app.display().is_typing());
}

#[tokio::test]
async fn test_escape_quits_when_idle() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    app.handle_key(key(KeyCode::Esc)).await;
    assert!(!app.is_running());
}

#[tokio::test]
async fn test_tab_toggles_mentor_mode() {
    let backend = ScriptedBackend::new("ok");
    let mut app = connected_app(backend.clone()).await;
    assert_eq!(app.display().mentor_mode, MentorMode::Generative);

    app.handle_key(key(KeyCode::Tab)).await;
    app.process_conductor_messages();
    assert_eq!(app.display().mentor_mode, MentorMode::Reflective);

    type_text(&mut app, "pergunta").await;
    app.handle_key(key(KeyCode::Enter)).await;
    run_until_ready(&mut app).await;

    assert_eq!(backend.requests()[0].mentor_mode, MentorMode::Reflective);
    assert!(screen(&mut app, 100, 24).contains("Modo: Reflexivo"));
}

#[tokio::test]
async fn test_attach_and_send() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relatorio.pdf");
    std::fs::write(&path, vec![0u8; 2048]).unwrap();

    let backend = ScriptedBackend::new("Recebi o arquivo.");
    let mut app = connected_app(backend.clone()).await;

    type_text(&mut app, &format!("/attach {}", path.display())).await;
    app.handle_key(key(KeyCode::Enter)).await;
    app.process_conductor_messages();

    let chip = app.display().attachment.clone().unwrap();
    assert_eq!(chip.name, "relatorio.pdf");
    assert!(screen(&mut app, 100, 24).contains("relatorio.pdf (0.00 MB)"));

    type_text(&mut app, "Resuma o arquivo").await;
    app.handle_key(key(KeyCode::Enter)).await;
    run_until_ready(&mut app).await;

    let request = &backend.requests()[0];
    assert_eq!(request.question, "Resuma o arquivo");
    assert_eq!(request.attachment.as_ref().unwrap().name(), "relatorio.pdf");
    assert!(app.display().attachment.is_none());
    assert_eq!(app.display().messages[0].attachments.len(), 1);
}

#[tokio::test]
async fn test_unsupported_attachment_raises_alert() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dados.zip");
    std::fs::write(&path, b"PK").unwrap();

    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    type_text(&mut app, &format!("/attach {}", path.display())).await;
    app.handle_key(key(KeyCode::Enter)).await;
    app.process_conductor_messages();

    assert_eq!(
        app.display().alert.as_deref(),
        Some("Tipo de arquivo não suportado.")
    );
    assert!(app.display().attachment.is_none());
    assert!(screen(&mut app, 100, 24).contains("Tipo de arquivo não suportado."));

    // Any key dismisses the popup and is otherwise swallowed
    app.handle_key(key(KeyCode::Char('x'))).await;
    assert!(app.display().alert.is_none());
    assert_eq!(app.input(), "");
}

#[tokio::test]
async fn test_missing_file_raises_alert() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    type_text(&mut app, "/attach /nao/existe.pdf").await;
    app.handle_key(key(KeyCode::Enter)).await;

    let alert = app.display().alert.clone().unwrap();
    assert!(alert.starts_with("Não foi possível abrir o arquivo"));
}

#[tokio::test]
async fn test_detach_removes_chip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notas.txt");
    std::fs::write(&path, "# ODS").unwrap();

    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    type_text(&mut app, &format!("/attach {}", path.display())).await;
    app.handle_key(key(KeyCode::Enter)).await;
    app.process_conductor_messages();
    assert!(app.display().attachment.is_some());

    type_text(&mut app, "/detach").await;
    app.handle_key(key(KeyCode::Enter)).await;
    app.process_conductor_messages();
    assert!(app.display().attachment.is_none());
}

#[tokio::test]
async fn test_clear_shows_placeholder() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    type_text(&mut app, "pergunta").await;
    app.handle_key(key(KeyCode::Enter)).await;
    run_until_ready(&mut app).await;
    assert_eq!(app.display().messages.len(), 2);

    type_text(&mut app, "/clear").await;
    app.handle_key(key(KeyCode::Enter)).await;
    app.process_conductor_messages();

    assert!(app.display().messages.is_empty());
    assert!(app.display().show_placeholder());
    assert!(screen(&mut app, 100, 24).contains("Faça uma pergunta para começar..."));
}

#[tokio::test]
async fn test_unknown_command_notifies() {
    let backend = ScriptedBackend::new("ok");
    let mut app = connected_app(backend.clone()).await;

    type_text(&mut app, "/voar").await;
    app.handle_key(key(KeyCode::Enter)).await;

    let note = app.display().notification.clone().unwrap();
    assert_eq!(note.message, "Comando desconhecido: /voar");
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_ctrl_c_quits() {
    let mut app = connected_app(ScriptedBackend::new("ok")).await;

    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
        .await;
    app.process_conductor_messages();

    assert!(!app.is_running());
    assert!(app.display().quit);
}
