//! Conductor - The Conversation Controller
//!
//! The Conductor owns the whole conversation: the message log, the attachment
//! slot, the mentor mode, the answering client and the typing animator. A
//! surface drives it through two calls:
//!
//! - [`Conductor::handle_event`] with a [`SurfaceEvent`] for every user action
//! - [`Conductor::poll`] on every frame, to pick up answers and advance typing
//!
//! and renders the [`ConductorMessage`]s it receives on its channel.
//!
//! # Ordering
//!
//! A question's user message is appended and emitted before the request is
//! spawned, so it always precedes its answer. While a request or a typing
//! session is active the Conductor is not `Ready` and refuses new questions,
//! which keeps a second typing session from ever starting.

use std::time::Instant;

use tokio::sync::{mpsc, oneshot};

use crate::attachment::AttachmentSlot;
use crate::backend::{Answer, AnswerBackend, AnsweringClient, MentorMode};
use crate::config::ChatConfig;
use crate::conversation::{ConversationStore, Message};
use crate::events::{SurfaceEvent, SUGGESTED_QUESTIONS};
use crate::markdown;
use crate::messages::{
    AttachmentSummary, ConductorMessage, ConductorState, MessageId, MessageRole, NotifyLevel,
};
use crate::typing::{CancelHandle, FinishedTyping, Tick, TypingAnimator};

/// Title used for exported transcripts
pub const TRANSCRIPT_TITLE: &str = "InExAI";

/// Warning shown when the answering service does not respond on connect
pub const BACKEND_UNAVAILABLE: &str =
    "Serviço de respostas indisponível. As perguntas podem falhar.";

/// The Conductor - headless conversation core
pub struct Conductor<B: AnswerBackend + 'static> {
    /// Configuration
    config: ChatConfig,
    /// Answering client (fallback on failure)
    client: AnsweringClient<B>,
    /// Finalized messages
    store: ConversationStore,
    /// Pending file
    attachments: AttachmentSlot,
    /// Reveals answers character by character
    animator: TypingAnimator,
    /// Mode sent with every question
    mentor_mode: MentorMode,
    /// Current operational state
    state: ConductorState,
    /// Whether the welcome panel is shown
    welcome_visible: bool,
    /// Answer of the in-flight request
    pending_answer: Option<oneshot::Receiver<Answer>>,
    /// ID the typed answer will be stored under
    typing_message_id: Option<MessageId>,
    /// Channel to the UI surface
    tx: mpsc::Sender<ConductorMessage>,
}

impl<B: AnswerBackend + 'static> Conductor<B> {
    /// Create a new Conductor
    pub fn new(backend: B, config: ChatConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        let client = AnsweringClient::new(backend, config.top_k);
        let animator = TypingAnimator::new(config.typing_interval);
        let mentor_mode = config.mentor_mode;

        Self {
            config,
            client,
            store: ConversationStore::new(),
            attachments: AttachmentSlot::new(),
            animator,
            mentor_mode,
            state: ConductorState::Ready,
            welcome_visible: true,
            pending_answer: None,
            typing_message_id: None,
            tx,
        }
    }

    /// Current state
    pub fn state(&self) -> ConductorState {
        self.state
    }

    /// Whether a question can be submitted
    pub fn is_ready(&self) -> bool {
        self.state == ConductorState::Ready
    }

    /// Current mentor mode
    pub fn mentor_mode(&self) -> MentorMode {
        self.mentor_mode
    }

    /// Whether the welcome panel is shown
    pub fn welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    /// The message log
    pub fn conversation(&self) -> &ConversationStore {
        &self.store
    }

    /// The attachment slot
    pub fn attachments(&self) -> &AttachmentSlot {
        &self.attachments
    }

    /// Handle for cancelling the active typing session from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        self.animator.cancel_handle()
    }

    /// The conversation as a standalone sanitized HTML document
    pub fn export_html(&self) -> String {
        markdown::export_transcript(TRANSCRIPT_TITLE, &self.store.snapshot())
    }

    /// Handle an event from the UI surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::Connected => {
                self.check_backend();
                self.send(ConductorMessage::State { state: self.state })
                    .await;
                self.send(ConductorMessage::Welcome {
                    visible: self.welcome_visible,
                })
                .await;
                self.send(ConductorMessage::MentorMode {
                    mode: self.mentor_mode,
                })
                .await;
                for message in self.store.snapshot() {
                    self.send(message_event(&message)).await;
                }
                if let Some(attachment) = self.attachments.pending() {
                    let attachment = AttachmentSummary::from(attachment);
                    self.send(ConductorMessage::AttachmentPending { attachment })
                        .await;
                }
            }

            SurfaceEvent::SubmitQuestion { content } => {
                self.submit_question(content).await;
            }

            SurfaceEvent::SuggestionSelected { index } => match SUGGESTED_QUESTIONS.get(index) {
                Some(question) => self.submit_question((*question).to_string()).await,
                None => tracing::warn!(index, "Unknown suggested question"),
            },

            SurfaceEvent::CancelTyping => {
                if self.animator.request_cancel() {
                    tracing::info!("Typing cancellation requested");
                } else {
                    tracing::debug!(state = ?self.state, "Cancel ignored, nothing is being typed");
                }
            }

            SurfaceEvent::AttachFiles { files } => {
                let outcome = self
                    .attachments
                    .offer(&files)
                    .map(|accepted| accepted.map(AttachmentSummary::from));
                match outcome {
                    Ok(Some(attachment)) => {
                        tracing::info!(name = %attachment.name, size = attachment.size_bytes, "File attached");
                        self.send(ConductorMessage::AttachmentPending { attachment })
                            .await;
                    }
                    Ok(None) => {}
                    Err(reason) => {
                        tracing::warn!(reason = %reason, files = files.len(), "Rejected file selection");
                        self.send(ConductorMessage::AttachmentRejected { reason })
                            .await;
                    }
                }
            }

            SurfaceEvent::RemoveAttachment => {
                if self.attachments.is_occupied() {
                    self.attachments.clear();
                    self.send(ConductorMessage::AttachmentCleared).await;
                }
            }

            SurfaceEvent::SetMentorMode { mode } => {
                self.mentor_mode = mode;
                self.send(ConductorMessage::MentorMode { mode }).await;
            }

            SurfaceEvent::ClearConversation => {
                if self.state.is_loading() {
                    self.notify(
                        NotifyLevel::Warning,
                        "Aguarde a resposta terminar antes de limpar a conversa.",
                    )
                    .await;
                } else {
                    self.store.clear();
                    self.send(ConductorMessage::Cleared).await;
                }
            }

            SurfaceEvent::QuitRequested => {
                self.shutdown().await;
            }
        }

        Ok(())
    }

    /// Send a question to the answering service
    async fn submit_question(&mut self, content: String) {
        if self.state != ConductorState::Ready {
            tracing::warn!(state = ?self.state, "Question submitted while busy");
            self.notify(NotifyLevel::Warning, "Aguarde a resposta atual terminar.")
                .await;
            return;
        }
        if content.trim().is_empty() {
            return;
        }
        let length = content.chars().count();
        if length > self.config.max_question_chars {
            tracing::warn!(length, max = self.config.max_question_chars, "Question too long");
            self.notify(
                NotifyLevel::Warning,
                &format!(
                    "A pergunta excede {} caracteres.",
                    self.config.max_question_chars
                ),
            )
            .await;
            return;
        }

        let attachment = self.attachments.take();
        if attachment.is_some() {
            self.send(ConductorMessage::AttachmentCleared).await;
        }

        let message = Message::user(content.clone(), attachment.iter().cloned().collect());
        let event = message_event(&message);
        self.store.append(message);
        self.send(event).await;

        if self.welcome_visible {
            self.welcome_visible = false;
            self.send(ConductorMessage::Welcome { visible: false })
                .await;
        }

        self.set_state(ConductorState::Thinking).await;

        let client = self.client.clone();
        let mentor_mode = self.mentor_mode;
        let (answer_tx, answer_rx) = oneshot::channel();
        tokio::spawn(async move {
            let answer = client.ask(&content, mentor_mode, attachment).await;
            let _ = answer_tx.send(answer);
        });
        self.pending_answer = Some(answer_rx);
    }

    /// Pick up a finished request and advance the typing animation
    ///
    /// Call this regularly (every frame). Returns true if there was activity.
    /// An answer that just arrived starts revealing on the next poll.
    pub async fn poll(&mut self) -> bool {
        if self.poll_answer().await {
            return true;
        }
        self.poll_typing().await
    }

    async fn poll_answer(&mut self) -> bool {
        let Some(rx) = self.pending_answer.as_mut() else {
            return false;
        };

        let answer = match rx.try_recv() {
            Ok(answer) => answer,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => {
                tracing::error!("Answer task ended without a result");
                Answer::fallback()
            }
        };
        self.pending_answer = None;

        let message_id = MessageId::new();
        if !self.animator.start(answer.text) {
            tracing::error!("Animator busy when an answer arrived, dropping answer");
            self.set_state(ConductorState::Ready).await;
            return true;
        }
        self.typing_message_id = Some(message_id.clone());
        self.set_state(ConductorState::Typing).await;
        self.send(ConductorMessage::TypingStarted { message_id })
            .await;
        true
    }

    async fn poll_typing(&mut self) -> bool {
        let due = self
            .animator
            .due_ticks(Instant::now(), self.config.max_ticks_per_poll);

        let mut activity = false;
        for _ in 0..due {
            match self.animator.tick() {
                Tick::Idle => break,
                Tick::Revealed => {
                    activity = true;
                    let revealed = self
                        .animator
                        .session()
                        .map(|s| s.revealed().to_string())
                        .unwrap_or_default();
                    if let Some(message_id) = self.typing_message_id.clone() {
                        let html = markdown::render(&revealed);
                        self.send(ConductorMessage::TypingFrame {
                            message_id,
                            revealed,
                            html,
                        })
                        .await;
                    }
                }
                Tick::Finished(finished) => {
                    self.finish_typing(finished).await;
                    return true;
                }
            }
        }
        activity
    }

    /// Store the typed (or interrupted) answer and return to Ready
    async fn finish_typing(&mut self, finished: FinishedTyping) {
        let message_id = self.typing_message_id.take().unwrap_or_default();
        tracing::info!(
            interrupted = finished.interrupted,
            revealed_chars = finished.revealed_chars,
            "Answer typed"
        );

        let message = Message::with_id(
            message_id.clone(),
            MessageRole::Assistant,
            finished.text,
            Vec::new(),
        );
        let event = message_event(&message);
        self.store.append(message);
        self.send(event).await;
        self.send(ConductorMessage::TypingFinished {
            message_id,
            interrupted: finished.interrupted,
        })
        .await;
        self.set_state(ConductorState::Ready).await;
    }

    /// Stop typing, drop any pending answer and say goodbye
    pub async fn shutdown(&mut self) {
        self.animator.request_cancel();
        self.pending_answer = None;
        self.set_state(ConductorState::ShuttingDown).await;
        self.send(ConductorMessage::Quit).await;
    }

    /// Probe the answering service in the background; warn the surface if it
    /// is unreachable
    fn check_backend(&self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if client.backend().health_check().await {
                return;
            }
            tracing::warn!(backend = client.backend().name(), "Answering service unreachable");
            let msg = ConductorMessage::Notify {
                level: NotifyLevel::Warning,
                message: BACKEND_UNAVAILABLE.to_string(),
            };
            if let Err(e) = tx.send(msg).await {
                tracing::warn!("Failed to send message to surface: {}", e);
            }
        });
    }

    /// Set state and notify UI
    async fn set_state(&mut self, state: ConductorState) {
        self.state = state;
        self.send(ConductorMessage::State { state }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(ConductorMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

/// The surface message announcing a finalized conversation message
fn message_event(message: &Message) -> ConductorMessage {
    ConductorMessage::Message {
        id: message.id.clone(),
        role: message.role,
        text: message.text.clone(),
        html: markdown::render(&message.text),
        attachments: message
            .attachments
            .iter()
            .map(AttachmentSummary::from)
            .collect(),
    }
}
