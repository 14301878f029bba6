//! HTTP Answering Backend
//!
//! Talks to the question-answering service over plain JSON HTTP.
//!
//! # Service API
//!
//! - `POST /ask` with `{ "question", "mentorType", "file"?, "top_k" }`,
//!   answered by `{ "answer": string }`
//! - `GET /` is used as a reachability probe
//!
//! Any non-2xx status is a failure. No retries, and no timeout beyond the
//! HTTP client's default.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Serialize;

use super::traits::{Answer, AnswerBackend, AskRequest, MentorMode, TransportError};
use crate::attachment::AttachmentRef;

/// JSON body of `POST /ask`
#[derive(Debug, Serialize)]
struct AskPayload<'a> {
    question: &'a str,
    #[serde(rename = "mentorType")]
    mentor_type: MentorMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<FilePayload<'a>>,
    top_k: u32,
}

/// The attached file as sent on the wire
#[derive(Debug, Serialize)]
struct FilePayload<'a> {
    name: &'a str,
    size: u64,
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    /// Base64 (standard alphabet, padded) file content
    content: String,
}

impl<'a> From<&'a AttachmentRef> for FilePayload<'a> {
    fn from(attachment: &'a AttachmentRef) -> Self {
        Self {
            name: attachment.name(),
            size: attachment.size_bytes(),
            mime_type: attachment.mime_type(),
            content: BASE64_STANDARD.encode(attachment.content()),
        }
    }
}

impl<'a> From<&'a AskRequest> for AskPayload<'a> {
    fn from(request: &'a AskRequest) -> Self {
        Self {
            question: &request.question,
            mentor_type: request.mentor_mode,
            file: request.attachment.as_ref().map(FilePayload::from),
            top_k: request.top_k,
        }
    }
}

/// HTTP answering backend
#[derive(Clone, Debug)]
pub struct HttpAnswerBackend {
    /// Service base URL, without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpAnswerBackend {
    /// Create a backend for the service at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a backend with a preconfigured HTTP client
    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
        }
    }

    /// Service base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST` endpoint for questions
    fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url)
    }
}

impl Default for HttpAnswerBackend {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl AnswerBackend for HttpAnswerBackend {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(&self.base_url)
            .send()
            .await
            .is_ok()
    }

    async fn ask(&self, request: &AskRequest) -> Result<Answer, TransportError> {
        let payload = AskPayload::from(request);
        tracing::debug!(
            url = %self.ask_url(),
            mentor = %request.mentor_mode,
            has_file = payload.file.is_some(),
            "Sending question"
        );

        let response = self
            .http_client
            .post(self.ask_url())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
