//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly (no network besides the
//! answering service) and provides a convenient interface for sending events
//! and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All conversation handling happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use std::path::Path;

use tokio::sync::mpsc;

use inexai_conductor::{
    AnswerBackend, ChatConfig, Conductor, ConductorMessage, FileCandidate, HttpAnswerBackend,
    MentorMode, SurfaceEvent,
};

/// Channel capacity; a poll can emit one frame per reveal tick
const CHANNEL_CAPACITY: usize = 1024;

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<B: AnswerBackend + 'static = HttpAnswerBackend> {
    /// The embedded Conductor instance
    conductor: Conductor<B>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient<HttpAnswerBackend> {
    /// Create a client talking to the configured HTTP endpoint
    pub fn new(config: ChatConfig) -> Self {
        let backend = HttpAnswerBackend::new(config.endpoint.clone());
        Self::with_backend(backend, config)
    }
}

impl<B: AnswerBackend + 'static> ConductorClient<B> {
    /// Create a client over any answering backend
    pub fn with_backend(backend: B, config: ChatConfig) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let conductor = Conductor::new(backend, config, tx);
        Self { conductor, rx }
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.send(SurfaceEvent::Connected).await
    }

    /// Submit a typed question
    pub async fn send_question(&mut self, content: String) -> anyhow::Result<()> {
        self.send(SurfaceEvent::SubmitQuestion { content }).await
    }

    /// Submit one of the suggested questions
    pub async fn select_suggestion(&mut self, index: usize) -> anyhow::Result<()> {
        self.send(SurfaceEvent::SuggestionSelected { index }).await
    }

    /// Stop the answer being typed
    pub async fn cancel_typing(&mut self) -> anyhow::Result<()> {
        self.send(SurfaceEvent::CancelTyping).await
    }

    /// Load a file from disk and offer it as the attachment
    pub async fn attach_path(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = FileCandidate::from_path(path).await?;
        self.send(SurfaceEvent::AttachFiles { files: vec![file] }).await
    }

    /// Remove the pending attachment
    pub async fn remove_attachment(&mut self) -> anyhow::Result<()> {
        self.send(SurfaceEvent::RemoveAttachment).await
    }

    /// Switch mentor mode
    pub async fn set_mentor_mode(&mut self, mode: MentorMode) -> anyhow::Result<()> {
        self.send(SurfaceEvent::SetMentorMode { mode }).await
    }

    /// Clear the conversation
    pub async fn clear_conversation(&mut self) -> anyhow::Result<()> {
        self.send(SurfaceEvent::ClearConversation).await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        self.send(SurfaceEvent::QuitRequested).await
    }

    /// Pick up answers and advance typing (must be called regularly)
    pub async fn poll(&mut self) -> bool {
        self.conductor.poll().await
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Check if the Conductor is ready
    pub fn is_ready(&self) -> bool {
        self.conductor.is_ready()
    }

    /// The conversation as a standalone HTML document
    pub fn export_html(&self) -> String {
        self.conductor.export_html()
    }

    async fn send(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        self.conductor.handle_event(event).await
    }
}
