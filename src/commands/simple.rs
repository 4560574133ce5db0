//! Simple interactive CLI mode
//!
//! Line-based game without the TUI

use crate::contract::{CONTRACTS, ContractId};
use crate::core::WORD_LENGTH;
use crate::driver::GameDriver;
use crate::ledger::Ledger;
use crate::output::formatters::{colored_guess, format_points};
use crate::output::{print_contracts, print_leaderboard, print_pot, print_win_report};
use crate::session::{SessionError, SubmitOutcome};
use crate::wordlists::Lexicon;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{self, Write};

/// Run the simple interactive CLI mode
///
/// # Errors
///
/// Returns an error if reading user input fails or the ledger cannot be
/// queried for the leaderboard.
pub async fn run_simple<L: Ledger, X: Lexicon>(
    driver: &mut GameDriver<L, X>,
    leaderboard_limit: usize,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                 FlexWord - Contract Bidding                  ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Bid on how many guesses you need. Fewer guesses pay more.");
    println!("Miss the contract and the pot halves with every extra guess.\n");
    println!("Tiles: {} correct, {} present, {} absent", "🟦", "🟨", "⬛");
    println!("Commands: 'board' for the leaderboard, 'quit' to exit\n");

    loop {
        println!(
            "\n{} {}  Bank: {}",
            "Player:".bright_black(),
            driver.user().username.bright_cyan().bold(),
            format_points(driver.user().bank).bright_yellow().bold()
        );
        print_contracts();

        let choice = get_user_input("\nChoose a contract (1-5 or name)")?.to_lowercase();
        let id = match choice.as_str() {
            "quit" | "q" | "exit" => {
                println!("\n👋 Thanks for playing!\n");
                return Ok(());
            }
            "board" | "b" | "leaderboard" => {
                let entries = driver.leaderboard(leaderboard_limit).await?;
                print_leaderboard(&entries, Some(&driver.user().username));
                continue;
            }
            other => match parse_contract(other) {
                Some(id) => id,
                None => {
                    println!("❌ Unknown contract '{other}'");
                    continue;
                }
            },
        };

        driver.start_contract(id)?;
        let tier = id.tier();
        println!(
            "\n🔒 {} contract: solve in {} for x{}",
            tier.label.bold(),
            tier.guesses,
            tier.multiplier()
        );

        play_round(driver).await?;
    }
}

/// Contract by menu number or name
fn parse_contract(input: &str) -> Option<ContractId> {
    match input.parse::<usize>() {
        Ok(n) => CONTRACTS.get(n.checked_sub(1)?).map(|tier| tier.id),
        Err(_) => input.parse().ok(),
    }
}

async fn play_round<L: Ledger, X: Lexicon>(driver: &mut GameDriver<L, X>) -> Result<()> {
    loop {
        let session = driver.session();
        let turn = session.guesses().len() + 1;
        let label = if session.is_overtime() {
            format!("Guess {turn} (overtime)").red().to_string()
        } else {
            format!("Guess {turn} of {}", turn - 1 + session.guesses_remaining() as usize)
        };
        println!("\n{label}");

        let input = get_user_input("Your guess")?;
        if matches!(input.to_lowercase().as_str(), "quit" | "q" | "exit") {
            driver.exit();
            if let Some(target) = driver.session().revealed_target() {
                println!("\nThe word was {}", target.text().bright_yellow().bold());
            }
            return Ok(());
        }
        if input.chars().count() > WORD_LENGTH {
            println!("❌ Guesses are {WORD_LENGTH} letters");
            continue;
        }

        while !driver.session().current_guess().is_empty() {
            driver.backspace()?;
        }
        for ch in input.chars() {
            driver.input(ch)?;
        }

        match driver.submit() {
            Ok(SubmitOutcome::Miss(report)) => {
                print_last_guess(driver);
                if report.last_chance {
                    println!("{}", "⚠ LAST CHANCE! One guess left on the contract".yellow().bold());
                }
                if report.pot_decayed {
                    println!("{}", "📉 Overtime: pot halved".red());
                }
                print_pot(report.pot);
            }
            Ok(SubmitOutcome::Won { .. }) => {
                print_last_guess(driver);
                println!("\n⏳ Settling...");
                let report = driver.settle_pending().await?;
                print_win_report(&report);
                return Ok(());
            }
            Err(SessionError::InvalidGuess(err)) => println!("❌ {err}"),
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_last_guess<L: Ledger, X: Lexicon>(driver: &GameDriver<L, X>) {
    if let Some(record) = driver.session().guesses().last() {
        println!("  {}", colored_guess(&record.word, &record.feedback));
    }
}

/// Get user input with a prompt
fn get_user_input(prompt: &str) -> Result<String> {
    print!("{prompt}: ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    if read == 0 {
        // EOF behaves like quit
        return Ok("quit".to_string());
    }

    Ok(input.trim().to_string())
}
