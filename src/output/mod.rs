//! Terminal output formatting
//!
//! Display utilities for CLI results and pretty-printing.

pub mod display;
pub mod formatters;

pub use display::{
    print_contracts, print_leaderboard, print_player_summary, print_pot, print_score_result,
    print_win_report,
};
