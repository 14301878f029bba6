//! Answering Service Integration
//!
//! Access to the remote question-answering service through a common trait,
//! so the Conductor can run against the real HTTP endpoint or a test double.
//!
//! # Usage
//!
//! ```ignore
//! use inexai_conductor::backend::{AnsweringClient, HttpAnswerBackend, MentorMode};
//!
//! let client = AnsweringClient::new(HttpAnswerBackend::new("http://localhost:8000"), 3);
//! let answer = client.ask("O que são os ODS?", MentorMode::Generative, None).await;
//! println!("{}", answer.text);
//! ```

mod http;
mod traits;

pub use http::HttpAnswerBackend;
pub use traits::{
    Answer, AnswerBackend, AnsweringClient, AskRequest, MentorMode, TransportError,
    FALLBACK_ANSWER,
};
