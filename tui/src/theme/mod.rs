//! Theme and Colors
//!
//! The InExAI palette: a deep teal accent for the assistant, green for the
//! user, and muted grays for chrome.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Brand
// ============================================================================

/// InExAI accent (title, assistant label, headings)
pub const INEXAI_TEAL: Color = Color::Rgb(0, 168, 150);

/// Subtitle and secondary brand text
pub const INEXAI_SAND: Color = Color::Rgb(230, 210, 170);

// ============================================================================
// Conversation
// ============================================================================

/// User messages and input
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Assistant body text
pub const ASSISTANT_TEXT: Color = Color::Rgb(225, 225, 225);

/// Inline code and code blocks
pub const CODE_YELLOW: Color = Color::Rgb(240, 200, 110);

/// Links
pub const LINK_BLUE: Color = Color::Rgb(110, 170, 255);

/// Interruption marker and other quiet text
pub const DIM_GRAY: Color = Color::Rgb(110, 110, 110);

// ============================================================================
// UI
// ============================================================================

/// Errors and alerts
pub const ERROR_RED: Color = Color::Rgb(255, 90, 90);

/// Warnings and the token counter near its limit
pub const WARNING_AMBER: Color = Color::Rgb(255, 190, 80);

/// Attachment chip
pub const CHIP_BG: Color = Color::Rgb(45, 60, 70);

/// Style for the user role label
#[must_use]
pub fn user_label() -> Style {
    Style::default().fg(USER_GREEN).add_modifier(Modifier::BOLD)
}

/// Style for the assistant role label
#[must_use]
pub fn assistant_label() -> Style {
    Style::default()
        .fg(INEXAI_TEAL)
        .add_modifier(Modifier::BOLD)
}
