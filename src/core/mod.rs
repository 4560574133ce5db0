//! Core domain types for FlexWord
//!
//! Words, tile scoring and the keyboard merge. Everything here is pure and
//! free of I/O.

mod feedback;
mod keyboard;
mod word;

pub use feedback::{Feedback, TileStatus};
pub use keyboard::KeyboardState;
pub use word::{WORD_LENGTH, Word, WordError};
