//! Answering Backend Traits
//!
//! Trait definitions for reaching the question-answering service, plus the
//! client wrapper that turns every failure into the fixed fallback answer.
//!
//! # Design Philosophy
//!
//! Backends report failures as [`TransportError`]. [`AnsweringClient`] is the
//! boundary: it logs the failure and hands the caller a normal [`Answer`], so
//! nothing past it ever sees a transport error.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attachment::AttachmentRef;

/// Answer shown when the service cannot be reached or replies with an error
pub const FALLBACK_ANSWER: &str = "Desculpe, ocorreu um erro ao processar sua pergunta.";

/// How the service should mentor the user
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MentorMode {
    /// Direct, generative answers
    #[default]
    #[serde(rename = "generativo")]
    Generative,
    /// Reflective answers that prompt the user to think
    #[serde(rename = "reflexivo")]
    Reflective,
}

impl MentorMode {
    /// Value sent on the wire
    #[must_use]
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Generative => "generativo",
            Self::Reflective => "reflexivo",
        }
    }

    /// Label shown in the UI
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Generative => "Generativo",
            Self::Reflective => "Reflexivo",
        }
    }

    /// The other mode
    #[must_use]
    pub fn toggled(&self) -> Self {
        match self {
            Self::Generative => Self::Reflective,
            Self::Reflective => Self::Generative,
        }
    }
}

impl fmt::Display for MentorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for MentorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generativo" | "generative" => Ok(Self::Generative),
            "reflexivo" | "reflective" => Ok(Self::Reflective),
            other => Err(format!(
                "unknown mentor mode '{other}' (expected generativo or reflexivo)"
            )),
        }
    }
}

/// A question for the answering service
#[derive(Clone, Debug)]
pub struct AskRequest {
    /// The question text
    pub question: String,
    /// Mentor mode to answer in
    pub mentor_mode: MentorMode,
    /// Optional file sent alongside (never merged into `question`)
    pub attachment: Option<AttachmentRef>,
    /// Number of passages the service should retrieve
    pub top_k: u32,
}

impl AskRequest {
    /// Create a request with default mode and `top_k = 3`
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            mentor_mode: MentorMode::default(),
            attachment: None,
            top_k: 3,
        }
    }

    /// Set the mentor mode
    #[must_use]
    pub fn with_mentor_mode(mut self, mode: MentorMode) -> Self {
        self.mentor_mode = mode;
        self
    }

    /// Attach a file
    #[must_use]
    pub fn with_attachment(mut self, attachment: Option<AttachmentRef>) -> Self {
        self.attachment = attachment;
        self
    }

    /// Set `top_k`
    #[must_use]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }
}

/// The service's reply
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text (Markdown)
    #[serde(rename = "answer")]
    pub text: String,
}

impl Answer {
    /// Create an answer
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The fixed fallback answer
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ANSWER)
    }
}

/// Failure reaching the answering service
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The service replied with a non-2xx status
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },
    /// The response body was not `{ "answer": string }`
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Answering backend trait
///
/// Implement this to reach a different service (or a test double).
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Check if the service is reachable
    async fn health_check(&self) -> bool;

    /// Send a question and wait for the complete answer
    async fn ask(&self, request: &AskRequest) -> Result<Answer, TransportError>;
}

/// Client that never fails: transport errors become [`Answer::fallback`]
pub struct AnsweringClient<B: AnswerBackend> {
    backend: Arc<B>,
    top_k: u32,
}

impl<B: AnswerBackend> Clone for AnsweringClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            top_k: self.top_k,
        }
    }
}

impl<B: AnswerBackend> AnsweringClient<B> {
    /// Wrap a backend
    pub fn new(backend: B, top_k: u32) -> Self {
        Self::from_arc(Arc::new(backend), top_k)
    }

    /// Wrap a shared backend
    pub fn from_arc(backend: Arc<B>, top_k: u32) -> Self {
        Self { backend, top_k }
    }

    /// The wrapped backend
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Ask a question; failures are logged and answered with the fallback
    pub async fn ask(
        &self,
        question: &str,
        mentor_mode: MentorMode,
        attachment: Option<AttachmentRef>,
    ) -> Answer {
        let request = AskRequest::new(question)
            .with_mentor_mode(mentor_mode)
            .with_attachment(attachment)
            .with_top_k(self.top_k);

        match self.backend.ask(&request).await {
            Ok(answer) => {
                tracing::debug!(
                    backend = self.backend.name(),
                    chars = answer.text.chars().count(),
                    "Answer received"
                );
                answer
            }
            Err(e) => {
                tracing::error!(backend = self.backend.name(), error = %e, "Erro ao fazer a pergunta");
                Answer::fallback()
            }
        }
    }
}
