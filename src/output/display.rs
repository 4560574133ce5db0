//! Display functions for command results

use super::formatters::{colored_guess, create_progress_bar, format_points};
use crate::commands::{PlayerSummary, ScoreResult};
use crate::contract::{BASE_POT, CONTRACTS};
use crate::driver::WinReport;
use crate::ledger::LeaderboardEntry;
use colored::Colorize;

/// Print the result of scoring a guess
pub fn print_score_result(result: &ScoreResult) {
    println!("\n{}", "─".repeat(40).cyan());
    println!(
        "Target: {}",
        result.target.text().bright_yellow().bold()
    );
    println!("{}", "─".repeat(40).cyan());

    println!(
        "\n  {}  {}  {}",
        colored_guess(&result.guess, &result.feedback),
        result.feedback.to_emoji(),
        result.feedback
    );
    println!(
        "\n  Correct: {}   Present: {}",
        result.feedback.count_correct().to_string().blue().bold(),
        result.feedback.count_present().to_string().yellow().bold()
    );

    if !result.guess_allowed {
        println!("  {}", "(not on the word list)".bright_black());
    }
}

/// Print the contract menu
pub fn print_contracts() {
    println!("\n{}", "CONTRACTS".bright_cyan().bold());
    for (i, tier) in CONTRACTS.iter().enumerate() {
        println!(
            "  {}. {:<9} {} guesses  x{:<4}  up to {}",
            i + 1,
            tier.label.bold(),
            tier.guesses,
            tier.multiplier(),
            format_points(tier.max_payout()).green()
        );
    }
}

/// Print the current pot as a bar against the base stake
pub fn print_pot(pot: u64) {
    let bar = create_progress_bar(pot, BASE_POT, 20);
    println!("  Pot: [{}] {}", bar.green(), format_points(pot).bright_yellow());
}

/// Print the top of the leaderboard, highlighting `player`
pub fn print_leaderboard(entries: &[LeaderboardEntry], player: Option<&str>) {
    println!("\n{}", "═".repeat(40).cyan());
    println!(" {} ", "LEADERBOARD".bright_cyan().bold());
    println!("{}", "═".repeat(40).cyan());

    if entries.is_empty() {
        println!("\n  No ranked players yet.");
        return;
    }

    println!();
    for entry in entries {
        let line = format!(
            "  {:>3}. {:<20} {:>12}",
            entry.rank,
            entry.username,
            format_points(entry.bank)
        );
        if player == Some(entry.username.as_str()) {
            println!("{}", line.bright_yellow().bold());
        } else {
            println!("{line}");
        }
    }
}

/// Print a player's bank, history and rank
pub fn print_player_summary(summary: &PlayerSummary) {
    println!("\n📊 {}", summary.username.bright_cyan().bold());
    println!(
        "   Bank:     {}",
        format_points(summary.bank).bright_yellow().bold()
    );
    println!("   Solved:   {}", summary.solved);
    match summary.rank {
        Some(rank) => println!("   Rank:     #{rank}"),
        None => println!("   Rank:     {}", "unranked".bright_black()),
    }
}

/// Print the outcome of a settled win
pub fn print_win_report(report: &WinReport) {
    println!("\n{}", "═".repeat(50).bright_cyan());
    println!(
        "{}",
        format!(
            "   🎉 {} solved in {} {}",
            report.word,
            report.guess_count,
            if report.guess_count == 1 { "guess" } else { "guesses" }
        )
            .bright_green()
            .bold()
    );
    println!("{}", "═".repeat(50).bright_cyan());
    println!(
        "   Winnings: {}",
        format!("+{}", format_points(report.winnings)).green().bold()
    );
    println!("   Bank:     {}", format_points(report.new_bank).bright_yellow());
    if !report.settled {
        println!(
            "   {}",
            "Ledger unreachable: credited locally, progress not saved".yellow()
        );
    } else if !report.recorded {
        println!(
            "   {}",
            "Bank saved, but the word or leaderboard was not updated".yellow()
        );
    }
}
