//! Score command
//!
//! Scores a guess against a target outside of a game.

use crate::core::{Feedback, Word};
use crate::wordlists::Lexicon;

/// Result of scoring a guess
pub struct ScoreResult {
    pub guess: Word,
    pub target: Word,
    pub feedback: Feedback,
    /// Whether the guess would be accepted in a round
    pub guess_allowed: bool,
}

/// Score `guess` against `target`
///
/// # Errors
///
/// Returns an error if either word is not five ASCII letters.
pub fn score_words<L: Lexicon + ?Sized>(
    guess: &str,
    target: &str,
    lexicon: &L,
) -> Result<ScoreResult, String> {
    let guess = Word::new(guess).map_err(|e| format!("Invalid guess '{guess}': {e}"))?;
    let target = Word::new(target).map_err(|e| format!("Invalid target '{target}': {e}"))?;

    Ok(ScoreResult {
        guess,
        target,
        feedback: Feedback::calculate(&guess, &target),
        guess_allowed: lexicon.is_valid(&guess),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TileStatus;
    use crate::wordlists::WordList;

    #[test]
    fn score_valid_words() {
        let lexicon = WordList::embedded().unwrap();
        let result = score_words("sable", "SABER", &lexicon).unwrap();

        assert_eq!(result.guess.text(), "SABLE");
        assert_eq!(result.feedback.count_correct(), 3);
        assert_eq!(result.feedback.tiles()[4], TileStatus::Present);
        assert!(result.guess_allowed);
    }

    #[test]
    fn score_reports_unlisted_guess() {
        let lexicon = WordList::embedded().unwrap();
        let result = score_words("qqqqq", "saber", &lexicon).unwrap();
        assert!(!result.guess_allowed);
        assert_eq!(result.feedback.count_correct(), 0);
    }

    #[test]
    fn score_rejects_malformed_input() {
        let lexicon = WordList::embedded().unwrap();
        assert!(score_words("abc", "saber", &lexicon).is_err());
        assert!(score_words("saber", "sab3r", &lexicon).is_err());
    }
}
