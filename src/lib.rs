//! FlexWord
//!
//! A five-letter word game with contract bidding: before each round the
//! player picks how many guesses they commit to, and solving within that
//! budget multiplies the pot. Wins are settled into a persistent bank that
//! feeds a global leaderboard.
//!
//! # Quick Start
//!
//! ```rust
//! use flexword::contract::ContractId;
//! use flexword::core::{Feedback, Word};
//! use flexword::session::{GameSession, SubmitOutcome};
//! use flexword::wordlists::WordList;
//!
//! let lexicon = WordList::embedded().unwrap();
//! let mut session = GameSession::new();
//! session
//!     .begin(ContractId::Risky.tier(), Word::new("saber").unwrap())
//!     .unwrap();
//!
//! for ch in "sable".chars() {
//!     session.input_letter(ch).unwrap();
//! }
//! let SubmitOutcome::Miss(report) = session.submit(&lexicon).unwrap() else {
//!     unreachable!()
//! };
//! assert_eq!(report.feedback, "CCC-P".parse::<Feedback>().unwrap());
//! ```

// Core domain types
pub mod core;

// Contract tiers and the round economy
pub mod contract;
pub mod settlement;

// Round state machine
pub mod session;

// Player ledger and the per-player orchestrator
pub mod driver;
pub mod ledger;

// Word lists
pub mod wordlists;

// User configuration
pub mod config;

// Command implementations
pub mod commands;

// Terminal output formatting
pub mod output;

// Interactive TUI interface
pub mod interactive;
