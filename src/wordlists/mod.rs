//! Word lists and the lexicon contract
//!
//! The session engine only needs two things from a lexicon: a random target
//! and a validity check for guesses. Embedded lists are compiled into the
//! binary; custom lists can be loaded from disk.

mod embedded;
pub mod loader;

use crate::core::Word;
use rand::RngCore;
use rustc_hash::FxHashSet;
use thiserror::Error;

pub use embedded::{ALLOWED, ANSWERS};
pub use loader::WordList;

/// Draws before an already-solved target is accepted anyway
pub const MAX_DRAW_ATTEMPTS: usize = 50;

/// Source of targets and judge of guesses
pub trait Lexicon {
    /// Pick a random target word
    fn random_word(&self, rng: &mut dyn RngCore) -> Word;

    /// Whether `word` is an accepted guess
    fn is_valid(&self, word: &Word) -> bool;
}

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("word list contains no usable words")]
    Empty,
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),
}

/// Draw a target the player has not solved yet
///
/// Gives up after [`MAX_DRAW_ATTEMPTS`] redraws and returns the last draw,
/// solved or not, so a round can always start even when the lexicon is
/// nearly exhausted.
pub fn draw_unsolved<L: Lexicon + ?Sized>(
    lexicon: &L,
    solved: &FxHashSet<Word>,
    rng: &mut dyn RngCore,
) -> Word {
    let mut word = lexicon.random_word(rng);
    let mut attempts = 0;

    while solved.contains(&word) && attempts < MAX_DRAW_ATTEMPTS {
        word = lexicon.random_word(rng);
        attempts += 1;
    }

    if solved.contains(&word) {
        tracing::debug!(%word, attempts, "No unsolved word found, reusing a solved target");
    }

    word
}
