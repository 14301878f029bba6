//! Surface Events
//!
//! Events sent from UI surfaces to the Conductor: everything the user can do
//! in the chat window. Surfaces report what happened; the Conductor decides
//! whether it is allowed and what changes.

use crate::attachment::FileCandidate;
use crate::backend::MentorMode;

/// Events from UI Surface to Conductor
#[derive(Clone, Debug)]
pub enum SurfaceEvent {
    /// Surface connected; the Conductor replies with its current state
    Connected,

    /// The user submitted a typed question
    SubmitQuestion {
        /// Question text as typed
        content: String,
    },

    /// The user picked one of the suggested questions on the welcome panel
    ///
    /// Behaves exactly like submitting the question text.
    SuggestionSelected {
        /// Index into [`SUGGESTED_QUESTIONS`]
        index: usize,
    },

    /// The user asked to stop the answer being typed
    CancelTyping,

    /// The user selected files to attach
    AttachFiles {
        /// The selection, unvalidated
        files: Vec<FileCandidate>,
    },

    /// The user removed the pending attachment
    RemoveAttachment,

    /// The user switched mentor mode
    SetMentorMode {
        /// The new mode
        mode: MentorMode,
    },

    /// The user cleared the conversation
    ClearConversation,

    /// The user wants to quit
    QuitRequested,
}

/// Questions offered on the welcome panel
pub const SUGGESTED_QUESTIONS: [&str; 4] = [
    "O que são os Objetivos de Desenvolvimento Sustentável (ODS)?",
    "Como a IDG pode contribuir para os ODS?",
    "Quais são os principais desafios para implementar os ODS?",
    "Explique a relação entre IDG e sustentabilidade.",
];
