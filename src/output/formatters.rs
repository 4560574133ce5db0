//! Formatting utilities for terminal output

use crate::core::{Feedback, TileStatus, Word};
use colored::{ColoredString, Colorize};

/// Format points with thousands separators
#[must_use]
pub fn format_points(points: u64) -> String {
    let digits = points.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }

    result
}

/// Create a progress bar string
#[must_use]
pub fn create_progress_bar(value: u64, max: u64, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        // Fits: the ratio is clamped to width
        ((u128::from(value.min(max)) * width as u128) / u128::from(max)) as usize
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// One letter on a colored tile
#[must_use]
pub fn colored_tile(letter: char, status: TileStatus) -> ColoredString {
    let tile = format!(" {letter} ");
    match status {
        TileStatus::Correct => tile.white().on_blue().bold(),
        TileStatus::Present => tile.black().on_yellow().bold(),
        TileStatus::Absent => tile.white().on_bright_black(),
    }
}

/// A scored guess as a row of colored tiles
#[must_use]
pub fn colored_guess(word: &Word, feedback: &Feedback) -> String {
    word.text()
        .chars()
        .zip(feedback.tiles())
        .map(|(letter, &status)| colored_tile(letter, status).to_string())
        .collect()
}
