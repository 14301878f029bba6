//! Conversation Store
//!
//! The ordered log of exchanged messages. Messages are immutable once
//! appended; the only other mutation is [`ConversationStore::clear`].
//!
//! # Ownership
//!
//! The store exclusively owns finalized messages. The typing animator hands
//! its finished text over by value when a reveal completes or is cancelled.

use chrono::{DateTime, Utc};

use crate::attachment::AttachmentRef;
use crate::messages::{MessageId, MessageRole};

/// A finalized conversation message
#[derive(Clone, Debug)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message text
    pub text: String,
    /// Files sent along with the message
    pub attachments: Vec<AttachmentRef>,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>, attachments: Vec<AttachmentRef>) -> Self {
        Self::with_id(MessageId::new(), MessageRole::User, text, attachments)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_id(MessageId::new(), MessageRole::Assistant, text, Vec::new())
    }

    /// Create a message with a specific ID
    pub fn with_id(
        id: MessageId,
        role: MessageRole,
        text: impl Into<String>,
        attachments: Vec<AttachmentRef>,
    ) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            attachments,
            created_at: Utc::now(),
        }
    }

    /// Whether the user sent this message
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// Ordered, append-only message log
#[derive(Clone, Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end of the log
    pub fn append(&mut self, message: Message) -> &Message {
        tracing::trace!(id = %message.id.0, role = ?message.role, "Appending message");
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Remove every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Ordered copy of the log
    #[must_use]
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Iterate messages in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The most recent message
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
