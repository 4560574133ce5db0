//! Best-known status per keyboard letter

use super::{Feedback, TileStatus, Word};
use rustc_hash::FxHashMap;

/// Running "best evidence seen so far" for each letter
///
/// A letter with no entry has not been guessed yet. Merging never downgrades:
/// `Correct` is final and `Present` never regresses to `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    letters: FxHashMap<u8, TileStatus>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one scored guess into the running state
    pub fn merge(&mut self, guess: &Word, feedback: &Feedback) {
        for (&letter, &status) in guess.chars().iter().zip(feedback.tiles()) {
            self.letters
                .entry(letter)
                .and_modify(|best| *best = (*best).max(status))
                .or_insert(status);
        }
    }

    /// Status for a letter, or `None` if it has not been guessed
    #[must_use]
    pub fn status(&self, letter: u8) -> Option<TileStatus> {
        self.letters.get(&letter.to_ascii_uppercase()).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn clear(&mut self) {
        self.letters.clear();
    }
}
