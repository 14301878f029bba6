//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Conductor tells it to.
//! Display state is the bridge between ConductorMessages and rendering.
//!
//! - DisplayMessage: A conversation message, or the answer being typed
//! - DisplayNotification: A transient status-bar notice
//! - alert: A blocking popup for refused attachments

use inexai_conductor::{
    AttachmentError, AttachmentSummary, ConductorMessage, ConductorState, MentorMode, MessageId,
    MessageRole, NotifyLevel,
};

/// A rendered conversation message
#[derive(Clone, Debug)]
pub struct DisplayMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// The message content (Markdown for assistant answers)
    pub content: String,
    /// Files sent along with the message
    pub attachments: Vec<AttachmentSummary>,
    /// Whether this answer is still being typed
    pub typing: bool,
}

impl DisplayMessage {
    /// Create a finalized display message
    pub fn new(
        id: MessageId,
        role: MessageRole,
        content: String,
        attachments: Vec<AttachmentSummary>,
    ) -> Self {
        Self {
            id,
            role,
            content,
            attachments,
            typing: false,
        }
    }

    /// Create the placeholder for an answer about to be typed
    pub fn typing(id: MessageId) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: String::new(),
            attachments: Vec::new(),
            typing: true,
        }
    }

    /// Label shown before the message
    pub fn label(&self) -> &'static str {
        match self.role {
            MessageRole::User => "Você",
            MessageRole::Assistant => "InExAI",
        }
    }
}

/// A notification to display
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Notification level
    pub level: NotifyLevel,
    /// Message content
    pub message: String,
}

/// Popup text for a refused attachment
pub fn alert_text(reason: AttachmentError) -> &'static str {
    match reason {
        AttachmentError::AlreadyAttached => {
            "Já existe um arquivo anexado. Remova-o antes de escolher outro."
        }
        AttachmentError::TooMany => "Apenas um arquivo pode ser enviado por vez.",
        AttachmentError::TooLarge => "O arquivo excede o limite de 1 MB.",
        AttachmentError::UnsupportedType => "Tipo de arquivo não suportado.",
    }
}

/// Complete display state
#[derive(Clone, Debug)]
pub struct DisplayState {
    /// Finalized conversation messages
    pub messages: Vec<DisplayMessage>,
    /// The answer being typed, if any
    pub typing: Option<DisplayMessage>,
    /// Current conductor state
    pub conductor_state: ConductorState,
    /// Active mentor mode
    pub mentor_mode: MentorMode,
    /// Whether the welcome panel is shown
    pub welcome_visible: bool,
    /// Pending attachment chip
    pub attachment: Option<AttachmentSummary>,
    /// Blocking alert popup (dismissed by any key)
    pub alert: Option<String>,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// The Conductor said goodbye
    pub quit: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            typing: None,
            conductor_state: ConductorState::Ready,
            mentor_mode: MentorMode::default(),
            welcome_visible: true,
            attachment: None,
            alert: None,
            notification: None,
            quit: false,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a ConductorMessage to update display state
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            // Conversation messages
            ConductorMessage::Message {
                id,
                role,
                text,
                attachments,
                ..
            } => {
                if self.typing.as_ref().is_some_and(|t| t.id == id) {
                    self.typing = None;
                }
                self.messages
                    .push(DisplayMessage::new(id, role, text, attachments));
            }
            ConductorMessage::TypingStarted { message_id } => {
                self.typing = Some(DisplayMessage::typing(message_id));
            }
            ConductorMessage::TypingFrame {
                message_id,
                revealed,
                ..
            } => {
                if let Some(typing) = self.typing.as_mut() {
                    if typing.id == message_id {
                        typing.content = revealed;
                    }
                }
            }
            ConductorMessage::TypingFinished { message_id, .. } => {
                if self.typing.as_ref().is_some_and(|t| t.id == message_id) {
                    self.typing = None;
                }
            }
            ConductorMessage::Cleared => {
                self.messages.clear();
            }

            // Input area
            ConductorMessage::AttachmentPending { attachment } => {
                self.attachment = Some(attachment);
            }
            ConductorMessage::AttachmentCleared => {
                self.attachment = None;
            }
            ConductorMessage::AttachmentRejected { reason } => {
                self.alert = Some(alert_text(reason).to_string());
            }
            ConductorMessage::MentorMode { mode } => {
                self.mentor_mode = mode;
            }
            ConductorMessage::Welcome { visible } => {
                self.welcome_visible = visible;
            }

            // System messages
            ConductorMessage::State { state } => {
                self.conductor_state = state;
            }
            ConductorMessage::Notify { level, message } => {
                self.notification = Some(DisplayNotification { level, message });
            }
            ConductorMessage::Quit => {
                self.quit = true;
            }
        }
    }

    /// Whether a request or typing session is active
    pub fn is_loading(&self) -> bool {
        self.conductor_state.is_loading()
    }

    /// Whether the answer is being typed (cancel is available)
    pub fn is_typing(&self) -> bool {
        self.typing.is_some()
    }

    /// Whether to show the "ask something" placeholder
    pub fn show_placeholder(&self) -> bool {
        self.messages.is_empty() && self.typing.is_none() && !self.welcome_visible
    }

    /// Messages to draw, the typing one last
    pub fn visible_messages(&self) -> impl Iterator<Item = &DisplayMessage> {
        self.messages.iter().chain(self.typing.iter())
    }

    /// Show a local alert popup
    pub fn show_alert(&mut self, text: impl Into<String>) {
        self.alert = Some(text.into());
    }

    /// Dismiss the alert popup
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Clear the notification
    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user_message(text: &str) -> ConductorMessage {
        ConductorMessage::Message {
            id: MessageId::new(),
            role: MessageRole::User,
            text: text.to_string(),
            html: String::new(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_display_state_default() {
        let state = DisplayState::new();
        assert!(state.messages.is_empty());
        assert!(state.welcome_visible);
        assert!(!state.is_loading());
        assert!(!state.show_placeholder());
        assert_eq!(state.mentor_mode, MentorMode::Generative);
    }

    #[test]
    fn test_display_message_labels() {
        let user = DisplayMessage::new(MessageId::new(), MessageRole::User, "Oi".into(), Vec::new());
        let typing = DisplayMessage::typing(MessageId::new());
        assert_eq!(user.label(), "Você");
        assert_eq!(typing.label(), "InExAI");
        assert!(typing.typing);
    }

    #[test]
    fn test_typing_lifecycle() {
        let mut state = DisplayState::new();
        let id = MessageId::new();

        state.apply_message(ConductorMessage::TypingStarted {
            message_id: id.clone(),
        });
        assert!(state.is_typing());

        state.apply_message(ConductorMessage::TypingFrame {
            message_id: id.clone(),
            revealed: "Os O".to_string(),
            html: "<p>Os O</p>".to_string(),
        });
        assert_eq!(state.typing.as_ref().unwrap().content, "Os O");

        state.apply_message(ConductorMessage::Message {
            id: id.clone(),
            role: MessageRole::Assistant,
            text: "Os ODS".to_string(),
            html: "<p>Os ODS</p>".to_string(),
            attachments: Vec::new(),
        });
        state.apply_message(ConductorMessage::TypingFinished {
            message_id: id,
            interrupted: false,
        });

        assert!(!state.is_typing());
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, "Os ODS");
        assert!(!state.messages[0].typing);
    }

    #[test]
    fn test_frame_for_other_session_ignored() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::TypingStarted {
            message_id: MessageId::new(),
        });
        state.apply_message(ConductorMessage::TypingFrame {
            message_id: MessageId::new(),
            revealed: "x".to_string(),
            html: String::new(),
        });
        assert_eq!(state.typing.as_ref().unwrap().content, "");
    }

    #[test]
    fn test_visible_messages_puts_typing_last() {
        let mut state = DisplayState::new();
        state.apply_message(user_message("pergunta"));
        state.apply_message(ConductorMessage::TypingStarted {
            message_id: MessageId::new(),
        });

        let roles: Vec<MessageRole> = state.visible_messages().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
    }

    #[test]
    fn test_attachment_chip() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::AttachmentPending {
            attachment: AttachmentSummary {
                name: "a.pdf".to_string(),
                size_bytes: 524_288,
                mime_type: "application/pdf".to_string(),
            },
        });
        assert_eq!(state.attachment.as_ref().unwrap().size_label(), "0.50 MB");

        state.apply_message(ConductorMessage::AttachmentCleared);
        assert!(state.attachment.is_none());
    }

    #[test]
    fn test_rejection_raises_alert() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::AttachmentRejected {
            reason: AttachmentError::TooLarge,
        });
        assert_eq!(state.alert.as_deref(), Some("O arquivo excede o limite de 1 MB."));

        state.dismiss_alert();
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_placeholder_after_clear() {
        let mut state = DisplayState::new();
        state.apply_message(user_message("pergunta"));
        state.apply_message(ConductorMessage::Welcome { visible: false });
        assert!(!state.show_placeholder());

        state.apply_message(ConductorMessage::Cleared);
        assert!(state.show_placeholder());
    }

    #[test]
    fn test_state_and_quit() {
        let mut state = DisplayState::new();
        state.apply_message(ConductorMessage::State {
            state: ConductorState::Thinking,
        });
        assert!(state.is_loading());

        state.apply_message(ConductorMessage::MentorMode {
            mode: MentorMode::Reflective,
        });
        assert_eq!(state.mentor_mode, MentorMode::Reflective);

        state.apply_message(ConductorMessage::Quit);
        assert!(state.quit);
    }
}
