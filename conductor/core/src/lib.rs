//! Conductor Core - Headless Chat Core for InExAI
//!
//! This crate holds everything the InExAI chat assistant does, completely
//! independent of any UI framework: the conversation log, attachment
//! validation, the answering-service client, the typing animation and
//! Markdown rendering with HTML sanitization. The terminal client is just one
//! surface driving it; tests drive it headless.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         UI Surfaces                           │
//! │        ┌───────────┐                 ┌──────────────────┐     │
//! │        │    TUI    │                 │ Headless / tests │     │
//! │        │ (ratatui) │                 │                  │     │
//! │        └─────┬─────┘                 └────────┬─────────┘     │
//! │              └───────────────┬────────────────┘               │
//! │                    SurfaceEvent (up)                          │
//! │                  ConductorMessage (down)                      │
//! └──────────────────────────────┼───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                       CONDUCTOR CORE                          │
//! │  ┌───────────────────────────┴─────────────────────────────┐  │
//! │  │                       Conductor                          │  │
//! │  │  ┌──────────────┐ ┌────────────┐ ┌────────┐ ┌─────────┐ │  │
//! │  │  │ Conversation │ │ Attachment │ │ Typing │ │ Backend │ │  │
//! │  │  │    Store     │ │    Slot    │ │Animator│ │ (HTTP)  │ │  │
//! │  │  └──────────────┘ └────────────┘ └────────┘ └─────────┘ │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: Owns the conversation and reacts to surface events
//! - [`ConductorMessage`]: Messages sent from Conductor to UI surfaces
//! - [`SurfaceEvent`]: Events sent from UI surfaces to Conductor
//! - [`TypingAnimator`]: Character-by-character reveal with cancellation
//! - [`AttachmentSlot`]: The single pending file
//!
//! # Quick Start
//!
//! ```ignore
//! use inexai_conductor::{ChatConfig, Conductor, HttpAnswerBackend, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let config = ChatConfig::load()?;
//!     let backend = HttpAnswerBackend::new(config.endpoint.clone());
//!     let mut conductor = Conductor::new(backend, config, tx);
//!
//!     conductor.handle_event(SurfaceEvent::Connected).await?;
//!     conductor
//!         .handle_event(SurfaceEvent::SubmitQuestion {
//!             content: "O que são os ODS?".into(),
//!         })
//!         .await?;
//!
//!     loop {
//!         // Pick up the answer and advance typing
//!         conductor.poll().await;
//!
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message to UI
//!         }
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`attachment`]: File validation and the pending attachment slot
//! - [`backend`]: Answering service abstraction and HTTP client
//! - [`conductor`]: Main Conductor struct
//! - [`config`]: Defaults, config file and environment overrides
//! - [`conversation`]: Ordered message log
//! - [`events`]: Events from UI surfaces to Conductor
//! - [`markdown`]: Markdown to sanitized HTML, transcript export
//! - [`messages`]: Messages from Conductor to UI surfaces
//! - [`typing`]: Typing animation state machine
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attachment;
pub mod backend;
pub mod conductor;
pub mod config;
pub mod conversation;
pub mod events;
pub mod markdown;
pub mod messages;
pub mod typing;

// Re-exports for convenience
pub use attachment::{
    AttachmentError, AttachmentRef, AttachmentSlot, FileCandidate, ALLOWED_MIME_TYPES,
    MAX_ATTACHMENT_BYTES,
};
pub use backend::{
    Answer, AnswerBackend, AnsweringClient, AskRequest, HttpAnswerBackend, MentorMode,
    TransportError, FALLBACK_ANSWER,
};
pub use conductor::{Conductor, BACKEND_UNAVAILABLE};
pub use config::{default_config_path, load_config_file, ChatConfig, ChatToml, ConfigError};
pub use conversation::{ConversationStore, Message};
pub use events::{SurfaceEvent, SUGGESTED_QUESTIONS};
pub use messages::{
    AttachmentSummary, ConductorMessage, ConductorState, MessageId, MessageRole, NotifyLevel,
};
pub use typing::{
    AnimatorState, CancelHandle, FinishedTyping, Tick, TypingAnimator, TypingSession,
    INTERRUPTION_MARKER,
};
