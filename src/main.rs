//! FlexWord - CLI
//!
//! Contract-bidding word game with TUI and CLI modes, a persistent bank and a
//! global leaderboard.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flexword::{
    commands::{player_summary, run_simple, score_words},
    config::{FlexConfig, Settings, data_dir},
    driver::GameDriver,
    interactive::{App, run_tui},
    ledger::{Ledger, LedgerBackend},
    output::{print_leaderboard, print_player_summary, print_score_result},
    wordlists::WordList,
};
use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "flexword",
    about = "Bid on how many guesses you need, then solve the word to multiply your pot",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Player name (default: config file, then $FLEXWORD_USER, then $USER)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Ledger database path, or 'memory' for a throwaway ledger
    #[arg(short, long, global = true)]
    ledger: Option<PathBuf>,

    /// Wordlist: 'embedded' (default) or path to a file with one word per line
    #[arg(short = 'w', long, global = true, default_value = "embedded")]
    wordlist: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive TUI mode (default)
    Play,

    /// Simple CLI mode (line-based game without TUI)
    Simple,

    /// Show the top of the leaderboard
    Leaderboard {
        /// Number of entries to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show your bank, solved words and rank
    Bank,

    /// Score a guess against a target word
    Score {
        /// The guessed word
        guess: String,

        /// The target word
        target: String,
    },
}

/// Load the lexicon selected by the -w flag
fn load_lexicon(wordlist: &str) -> Result<WordList> {
    let lexicon = match wordlist {
        "embedded" => WordList::embedded().context("Embedded word list is empty")?,
        path => WordList::from_file(path)
            .with_context(|| format!("Failed to load word list from {path}"))?,
    };
    tracing::info!(
        source = wordlist,
        answers = lexicon.answer_count(),
        allowed = lexicon.allowed_count(),
        "Loaded word list"
    );
    Ok(lexicon)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = FlexConfig::load().unwrap_or_default();
    let settings = Settings::resolve(&config, cli.user, cli.ledger);
    let lexicon = load_lexicon(&cli.wordlist)?;

    // Default to Play mode if no command given
    let command = cli.command.unwrap_or(Commands::Play);

    if let Commands::Score { guess, target } = &command {
        let result = score_words(guess, target, &lexicon).map_err(|e| anyhow::anyhow!(e))?;
        print_score_result(&result);
        return Ok(());
    }

    let ledger = LedgerBackend::open(&settings.ledger)
        .with_context(|| format!("Failed to open ledger at {}", settings.ledger.display()))?;

    match command {
        Commands::Play => run_play_command(ledger, lexicon, &settings).await,
        Commands::Simple => run_simple_command(ledger, lexicon, &settings).await,
        Commands::Leaderboard { limit } => {
            let limit = limit.unwrap_or(settings.leaderboard_limit);
            let entries = ledger
                .top_entries(limit)
                .await
                .context("Failed to read leaderboard")?;
            print_leaderboard(&entries, Some(&settings.username));
            Ok(())
        }
        Commands::Bank => {
            let summary = player_summary(&ledger, &settings.username)
                .await
                .context("Failed to read player record")?;
            print_player_summary(&summary);
            Ok(())
        }
        Commands::Score { .. } => Ok(()),
    }
}

async fn load_driver(
    ledger: LedgerBackend,
    lexicon: WordList,
    settings: &Settings,
) -> Result<GameDriver<LedgerBackend, WordList>> {
    GameDriver::load(ledger, lexicon, settings.username.clone(), settings.driver)
        .await
        .with_context(|| format!("Failed to load player {}", settings.username))
}

async fn run_play_command(ledger: LedgerBackend, lexicon: WordList, settings: &Settings) -> Result<()> {
    let driver = load_driver(ledger, lexicon, settings).await?;
    run_tui(App::new(driver, settings.leaderboard_limit)).await
}

async fn run_simple_command(
    ledger: LedgerBackend,
    lexicon: WordList,
    settings: &Settings,
) -> Result<()> {
    let mut driver = load_driver(ledger, lexicon, settings).await?;
    run_simple(&mut driver, settings.leaderboard_limit).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, drop logs rather than corrupt the terminal
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let candidates = [
        data_dir().join("logs").join("flexword.log"),
        PathBuf::from(".flexword").join("logs").join("flexword.log"),
    ];
    let mut warnings = Vec::new();

    for candidate in candidates {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}
