//! Conductor Messages
//!
//! Messages sent from the Conductor to UI surfaces. These are the only way the
//! conversation core tells a surface what to draw: finished messages, typing
//! frames, the pending attachment, the mentor mode and the busy state.
//!
//! # Design Philosophy
//!
//! Surfaces are renderers. They hold no conversation logic of their own and
//! never decide whether a question may be sent; they reflect what the
//! Conductor reports here.

use serde::{Deserialize, Serialize};

use crate::attachment::{AttachmentError, AttachmentRef};
use crate::backend::MentorMode;

/// Messages from Conductor to UI Surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Conversation Messages
    // ============================================
    /// A finalized message appended to the conversation
    Message {
        /// Unique message ID
        id: MessageId,
        /// Who sent this message
        role: MessageRole,
        /// Raw message text (Markdown for assistant answers)
        text: String,
        /// Sanitized HTML rendering of `text`
        html: String,
        /// Attachments sent along with the message
        attachments: Vec<AttachmentSummary>,
    },

    /// A typing session started revealing an answer
    TypingStarted {
        /// ID the finished message will carry
        message_id: MessageId,
    },

    /// One reveal tick of the active typing session
    TypingFrame {
        /// Typing session this frame belongs to
        message_id: MessageId,
        /// Revealed prefix of the answer
        revealed: String,
        /// Sanitized HTML rendering of the revealed prefix
        html: String,
    },

    /// The typing session ended (the finished `Message` precedes this)
    TypingFinished {
        /// Typing session that ended
        message_id: MessageId,
        /// Whether the reveal was cancelled before the end
        interrupted: bool,
    },

    /// The conversation log was cleared
    Cleared,

    // ============================================
    // Input Area
    // ============================================
    /// A file now occupies the attachment slot
    AttachmentPending {
        /// The pending file
        attachment: AttachmentSummary,
    },

    /// The attachment slot was emptied (removed or sent)
    AttachmentCleared,

    /// A file selection was refused; nothing changed
    AttachmentRejected {
        /// Why the selection was refused
        reason: AttachmentError,
    },

    /// Mentor mode changed
    MentorMode {
        /// The active mode
        mode: MentorMode,
    },

    /// Welcome panel visibility changed
    Welcome {
        /// Whether the welcome panel with suggested questions is shown
        visible: bool,
    },

    // ============================================
    // State & Notifications
    // ============================================
    /// Conductor state changed
    State {
        /// The new state
        state: ConductorState,
    },

    /// A transient notification for the user
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Notification text
        message: String,
    },

    /// The Conductor is shutting down
    Quit,
}

/// Display summary of an attachment (no file content)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// MIME type
    pub mime_type: String,
}

impl AttachmentSummary {
    /// Size in MiB with two decimals, as shown on attachment chips
    #[must_use]
    pub fn size_label(&self) -> String {
        crate::attachment::size_label(self.size_bytes)
    }
}

impl From<&AttachmentRef> for AttachmentSummary {
    fn from(attachment: &AttachmentRef) -> Self {
        Self {
            name: attachment.name().to_string(),
            size_bytes: attachment.size_bytes(),
            mime_type: attachment.mime_type().to_string(),
        }
    }
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    #[must_use]
    pub fn new() -> Self {
        Self(format!("msg_{}", uuid::Uuid::new_v4().simple()))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

/// Message role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// The person asking questions
    User,
    /// The answering service
    Assistant,
}

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Something was refused
    Warning,
    /// Something failed
    Error,
}

/// Conductor operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductorState {
    /// Idle and accepting questions
    Ready,
    /// Waiting for the answering service
    Thinking,
    /// Revealing an answer
    Typing,
    /// Shutting down
    ShuttingDown,
}

impl ConductorState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ready => "Pronto",
            Self::Thinking => "Pensando...",
            Self::Typing => "Respondendo...",
            Self::ShuttingDown => "Encerrando...",
        }
    }

    /// Whether the loading indicator is shown (submit disabled)
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Thinking | Self::Typing)
    }
}
