//! InExAI TUI - Terminal chat client for InExAI
//!
//! This crate provides a full-screen terminal UI for asking the InExAI
//! answering service about the Sustainable Development Goals.
//!
//! # Architecture
//!
//! - **App**: Event loop, key handling and layout
//! - **ConductorClient**: Embedded Conductor (all conversation logic)
//! - **Display**: State derived from ConductorMessages
//! - **Widgets**: Markdown rendering and borderless scrollable text blocks

pub mod app;
pub mod conductor_client;
pub mod display;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use conductor_client::ConductorClient;
