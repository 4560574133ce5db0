//! Tile outcomes for a guess
//!
//! Scoring compares a guess against the target letter by letter and yields
//! one [`TileStatus`] per position:
//! - `Correct`: right letter, right position
//! - `Present`: letter occurs elsewhere in the target (and has not already
//!   been credited)
//! - `Absent`: no unconsumed occurrence of the letter remains

use super::Word;
use super::word::WORD_LENGTH;
use std::fmt;
use std::str::FromStr;

/// Verdict for a single tile
///
/// Variants are ordered by strength of evidence, so `max` picks the better of
/// two observations for the same letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileStatus {
    Absent,
    Present,
    Correct,
}

impl TileStatus {
    /// Single-character code used in compact pattern strings
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Correct => 'C',
            Self::Present => 'P',
            Self::Absent => '-',
        }
    }

    /// Emoji tile
    #[must_use]
    pub const fn emoji(self) -> char {
        match self {
            Self::Correct => '🟦',
            Self::Present => '🟨',
            Self::Absent => '⬛',
        }
    }
}

/// Outcome of one scored guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Feedback([TileStatus; WORD_LENGTH]);

impl Feedback {
    /// All tiles correct
    pub const SOLVED: Self = Self([TileStatus::Correct; WORD_LENGTH]);

    /// Score `guess` against `target`
    ///
    /// # Algorithm
    /// 1. First pass: mark exact-position matches correct and consume those
    ///    letters from the target pool
    /// 2. Second pass: for each unresolved position, mark it present if an
    ///    unconsumed instance of the letter remains (consuming it), otherwise
    ///    absent
    ///
    /// Exact matches are always resolved before any present credit, so a
    /// target letter is credited at most as many times as it occurs.
    ///
    /// # Examples
    /// ```
    /// use flexword::core::{Feedback, TileStatus::{Absent, Correct, Present}, Word};
    ///
    /// let guess = Word::new("sable").unwrap();
    /// let target = Word::new("saber").unwrap();
    ///
    /// let feedback = Feedback::calculate(&guess, &target);
    /// assert_eq!(feedback.tiles(), &[Correct, Correct, Correct, Absent, Present]);
    /// ```
    #[must_use]
    pub fn calculate(guess: &Word, target: &Word) -> Self {
        let mut result = [TileStatus::Absent; WORD_LENGTH];
        let mut resolved = [false; WORD_LENGTH];
        let mut available = target.char_counts();

        // First pass: exact position matches
        // Allow: index needed to read both words and set result[i]/resolved[i]
        #[allow(clippy::needless_range_loop)]
        for i in 0..WORD_LENGTH {
            let letter = guess.char_at(i);
            if letter == target.char_at(i) {
                result[i] = TileStatus::Correct;
                resolved[i] = true;
                if let Some(count) = available.get_mut(&letter) {
                    *count = count.saturating_sub(1);
                }
            }
        }

        // Second pass: present elsewhere, from what is left of the pool
        for i in (0..WORD_LENGTH).filter(|&i| !resolved[i]) {
            if let Some(count) = available.get_mut(&guess.char_at(i))
                && *count > 0
            {
                result[i] = TileStatus::Present;
                *count -= 1;
            }
        }

        Self(result)
    }

    /// Per-position outcomes
    #[inline]
    #[must_use]
    pub const fn tiles(&self) -> &[TileStatus; WORD_LENGTH] {
        &self.0
    }

    /// True when every tile is correct
    #[inline]
    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    #[must_use]
    pub fn count_correct(&self) -> usize {
        self.count(TileStatus::Correct)
    }

    #[must_use]
    pub fn count_present(&self) -> usize {
        self.count(TileStatus::Present)
    }

    fn count(&self, status: TileStatus) -> usize {
        self.0.iter().filter(|&&tile| tile == status).count()
    }

    /// Render as an emoji row such as "🟦🟦🟦⬛🟨"
    #[must_use]
    pub fn to_emoji(&self) -> String {
        self.0.iter().map(|tile| tile.emoji()).collect()
    }
}

impl FromStr for Feedback {
    type Err = String;

    /// Parse a compact pattern such as "CCC-P"
    ///
    /// Accepts 'C'/'c'/🟦 for correct, 'P'/'p'/🟨 for present and
    /// '-'/'_'/⬛ for absent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tiles = [TileStatus::Absent; WORD_LENGTH];
        let mut len = 0;

        for ch in s.chars() {
            let tile = match ch {
                'C' | 'c' | '🟦' => TileStatus::Correct,
                'P' | 'p' | '🟨' => TileStatus::Present,
                '-' | '_' | '⬛' => TileStatus::Absent,
                _ => return Err(format!("Invalid tile '{ch}' in pattern: {s}")),
            };
            if len == WORD_LENGTH {
                return Err(format!("Pattern must be 5 tiles: {s}"));
            }
            tiles[len] = tile;
            len += 1;
        }

        if len == WORD_LENGTH {
            Ok(Self(tiles))
        } else {
            Err(format!("Pattern must be 5 tiles: {s}"))
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tile in &self.0 {
            write!(f, "{}", tile.code())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TileStatus::{Absent, Correct, Present};
    use super::*;

    fn score(guess: &str, target: &str) -> Feedback {
        Feedback::calculate(&Word::new(guess).unwrap(), &Word::new(target).unwrap())
    }

    #[test]
    fn sable_against_saber() {
        // L is absent (SABER has no L); E is present at a different position
        assert_eq!(
            score("SABLE", "SABER").tiles(),
            &[Correct, Correct, Correct, Absent, Present]
        );
    }

    #[test]
    fn reversed_word_only_center_is_exact() {
        assert_eq!(
            score("ABCDE", "EDCBA").tiles(),
            &[Present, Present, Correct, Present, Present]
        );
    }

    #[test]
    fn duplicate_guess_letter_credited_once() {
        // One A in the target, two in the guess: exactly one is credited
        let feedback = score("AAXYZ", "ABCDE");
        assert_eq!(feedback.tiles(), &[Correct, Absent, Absent, Absent, Absent]);

        let feedback = score("XAAYZ", "ABCDE");
        assert_eq!(feedback.tiles(), &[Absent, Present, Absent, Absent, Absent]);
    }

    #[test]
    fn exact_match_takes_priority_over_earlier_present() {
        // ROBOT vs FLOOR: second O is exact, first O takes the remaining O
        let feedback = score("ROBOT", "FLOOR");
        assert_eq!(feedback.tiles(), &[Present, Present, Absent, Correct, Absent]);

        // The exact E at position 4 is settled before the leading E's claim
        // the single E left in the pool
        let feedback = score("EERIE", "THREE");
        assert_eq!(feedback.tiles(), &[Present, Absent, Correct, Absent, Correct]);
    }

    #[test]
    fn identical_words_are_solved() {
        for word in ["CRANE", "SPEED", "AAAAA"] {
            let feedback = score(word, word);
            assert!(feedback.is_solved());
            assert_eq!(feedback.count_correct(), 5);
        }
    }

    #[test]
    fn credited_letters_never_exceed_target_occurrences() {
        let words = [
            "SPEED", "ERASE", "ROBOT", "FLOOR", "EERIE", "THREE", "SABLE", "SABER", "ABBEY",
            "BABES", "LLAMA", "ALLAY", "GEESE", "EMCEE", "AAAAA", "CRANE",
        ];

        for guess in words {
            for target in words {
                let g = Word::new(guess).unwrap();
                let t = Word::new(target).unwrap();
                let feedback = Feedback::calculate(&g, &t);

                for letter in b'A'..=b'Z' {
                    let credited = (0..WORD_LENGTH)
                        .filter(|&i| g.char_at(i) == letter && feedback.tiles()[i] != Absent)
                        .count();
                    let occurrences = t.chars().iter().filter(|&&c| c == letter).count();
                    assert!(
                        credited <= occurrences,
                        "{guess} vs {target}: {} credited {credited} times",
                        letter as char
                    );
                }
            }
        }
    }

    #[test]
    fn tile_status_ordering_matches_precedence() {
        assert!(Correct > Present);
        assert!(Present > Absent);
    }

    #[test]
    fn parse_and_display_pattern() {
        let feedback: Feedback = "CCC-P".parse().unwrap();
        assert_eq!(feedback, score("SABLE", "SABER"));
        assert_eq!(feedback.to_string(), "CCC-P");
        assert_eq!(feedback.to_emoji(), "🟦🟦🟦⬛🟨");
        assert_eq!("🟦🟦🟦⬛🟨".parse::<Feedback>().unwrap(), feedback);
    }

    #[test]
    fn parse_rejects_bad_patterns() {
        assert!("CCC".parse::<Feedback>().is_err());
        assert!("CCCPPP".parse::<Feedback>().is_err());
        assert!("CCXPP".parse::<Feedback>().is_err());
        assert!("".parse::<Feedback>().is_err());
    }
}
