//! Command implementations

pub mod score;
pub mod simple;
pub mod standings;

pub use score::{ScoreResult, score_words};
pub use simple::run_simple;
pub use standings::{PlayerSummary, player_summary};
