//! Round state machine
//!
//! One [`GameSession`] drives a single contract from selection to
//! settlement:
//!
//! ```text
//! Setup ──start──▶ Playing ──winning submit──▶ Settling ──finish──▶ Won
//!                     │
//!                     └──abandon──▶ Lost
//! ```
//!
//! Won and Lost are terminal; `start` from either begins a fresh round.
//! While `Settling`, every player input is rejected so a winning guess can
//! never be submitted twice.

mod game;

pub use game::{GameSession, GuessRecord, MissReport, PLACEHOLDER, SubmitOutcome};

use std::fmt;
use thiserror::Error;

/// Lifecycle phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    Playing,
    /// Winning guess detected; waiting for the ledger
    Settling,
    Won,
    Lost,
}

impl Phase {
    /// Whether a new contract may be started from this phase
    #[must_use]
    pub const fn can_start(self) -> bool {
        matches!(self, Self::Setup | Self::Won | Self::Lost)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "SETUP",
            Self::Playing => "PLAYING",
            Self::Settling => "SETTLING",
            Self::Won => "WON",
            Self::Lost => "LOST",
        })
    }
}

/// Recoverable rejection of a submitted guess
///
/// Display strings are the messages shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("INCOMPLETE WORD!")]
    IncompleteWord,
    #[error("TOO SHORT!")]
    TooShort,
    #[error("NOT ON WORD LIST")]
    NotOnWordList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("input is only accepted while playing (phase: {0})")]
    NotPlaying(Phase),
    #[error("cannot start a new contract during {0}")]
    RoundInProgress(Phase),
    #[error("no settlement is pending (phase: {0})")]
    NothingToSettle(Phase),
    #[error(transparent)]
    InvalidGuess(#[from] GuessError),
}

impl SessionError {
    /// The guess rejection, if this error is one
    #[must_use]
    pub const fn guess_error(&self) -> Option<GuessError> {
        match self {
            Self::InvalidGuess(err) => Some(*err),
            _ => None,
        }
    }
}
