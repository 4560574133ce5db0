//! Word list loading
//!
//! Builds [`WordList`] lexicons from the embedded lists or from a file.

use super::{ALLOWED, ANSWERS, Lexicon, LexiconError};
use crate::core::Word;
use rand::{Rng, RngCore};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;

/// A lexicon backed by in-memory word lists
///
/// Targets are drawn from `answers`; guesses are accepted if they appear in
/// `allowed` (which always includes every answer).
#[derive(Debug, Clone)]
pub struct WordList {
    answers: Vec<Word>,
    allowed: FxHashSet<Word>,
}

impl WordList {
    /// Build a lexicon from answer and allowed-guess lists
    ///
    /// # Errors
    ///
    /// Returns `LexiconError::Empty` if there are no answers to draw from.
    pub fn new(answers: Vec<Word>, allowed: impl IntoIterator<Item = Word>) -> Result<Self, LexiconError> {
        if answers.is_empty() {
            return Err(LexiconError::Empty);
        }

        let mut allowed: FxHashSet<Word> = allowed.into_iter().collect();
        allowed.extend(answers.iter().copied());

        Ok(Self { answers, allowed })
    }

    /// The lexicon compiled into the binary
    ///
    /// # Errors
    ///
    /// Only fails if the embedded answer list is empty.
    pub fn embedded() -> Result<Self, LexiconError> {
        Self::new(words_from_slice(ANSWERS), words_from_slice(ALLOWED))
    }

    /// Load a lexicon from a file with one word per line
    ///
    /// Every valid line is both a possible target and an accepted guess.
    /// Blank lines, `#` comments and malformed entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// `LexiconError::Empty` if it holds no valid words.
    ///
    /// # Examples
    /// ```no_run
    /// use flexword::wordlists::WordList;
    ///
    /// let lexicon = WordList::from_file("data/answers.txt").unwrap();
    /// println!("Loaded {} answers", lexicon.answer_count());
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let content = fs::read_to_string(path)?;

        let words: Vec<Word> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| Word::new(line).ok())
            .collect();

        Self::new(words.clone(), words)
    }

    #[must_use]
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn allowed_count(&self) -> usize {
        self.allowed.len()
    }
}

impl Lexicon for WordList {
    fn random_word(&self, rng: &mut dyn RngCore) -> Word {
        self.answers[rng.random_range(0..self.answers.len())]
    }

    fn is_valid(&self, word: &Word) -> bool {
        self.allowed.contains(word)
    }
}

/// Convert an embedded string slice to words, skipping invalid entries
///
/// # Examples
/// ```
/// use flexword::wordlists::{ANSWERS, loader::words_from_slice};
///
/// let words = words_from_slice(ANSWERS);
/// assert_eq!(words.len(), ANSWERS.len());
/// ```
#[must_use]
pub fn words_from_slice(slice: &[&str]) -> Vec<Word> {
    slice.iter().filter_map(|&s| Word::new(s).ok()).collect()
}
