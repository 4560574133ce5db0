//! Interactive TUI interface

mod app;
mod rendering;

pub use app::{App, InputMode, KeyOutcome, Message, MessageStyle, Statistics, run_tui};
