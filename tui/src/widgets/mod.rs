//! Widgets
//!
//! - [`text_block`]: Borderless scrollable region of wrapped styled lines
//! - [`markdown`]: Markdown answers as styled terminal lines

pub mod markdown;
pub mod text_block;

pub use text_block::{TextBlock, TextBlockState};
