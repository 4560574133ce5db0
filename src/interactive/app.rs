//! TUI application state and logic

use crate::contract::CONTRACTS;
use crate::driver::{GameDriver, WinReport};
use crate::ledger::{LeaderboardEntry, Ledger};
use crate::output::formatters::format_points;
use crate::session::{Phase, SessionError, SubmitOutcome};
use crate::wordlists::Lexicon;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;

/// Messages kept for the log panel
const MAX_MESSAGES: usize = 6;

/// Application state
pub struct App<L, X> {
    pub driver: GameDriver<L, X>,
    pub menu_index: usize,
    pub messages: Vec<Message>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub leaderboard_limit: usize,
    pub show_leaderboard: bool,
    pub rank: Option<u32>,
    pub last_win: Option<WinReport>,
    pub stats: Statistics,
    pub should_quit: bool,
}

/// What keystrokes currently drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    ContractMenu,
    Guessing,
    Settling,
    Leaderboard,
}

/// Follow-up work a keystroke needs from the async loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    RefreshStandings,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub style: MessageStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    Info,
    Success,
    Warning,
    Error,
}

/// Per-run tallies shown in the status bar
#[derive(Debug, Default, Clone)]
pub struct Statistics {
    pub rounds: usize,
    pub wins: usize,
    pub winnings: u64,
}

impl<L: Ledger, X: Lexicon> App<L, X> {
    #[must_use]
    pub fn new(driver: GameDriver<L, X>, leaderboard_limit: usize) -> Self {
        let mut app = Self {
            driver,
            menu_index: 1,
            messages: Vec::new(),
            leaderboard: Vec::new(),
            leaderboard_limit,
            show_leaderboard: false,
            rank: None,
            last_win: None,
            stats: Statistics::default(),
            should_quit: false,
        };
        app.add_message(
            &format!("Welcome, {}! Pick a contract to open a round.", app.driver.user().username),
            MessageStyle::Info,
        );
        app
    }

    #[must_use]
    pub fn input_mode(&self) -> InputMode {
        if self.show_leaderboard {
            return InputMode::Leaderboard;
        }
        match self.driver.session().phase() {
            Phase::Playing => InputMode::Guessing,
            Phase::Settling => InputMode::Settling,
            Phase::Setup | Phase::Won | Phase::Lost => InputMode::ContractMenu,
        }
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return KeyOutcome::Handled;
        }

        match self.input_mode() {
            InputMode::Leaderboard => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Tab | KeyCode::Char('l' | 'q')) {
                    self.show_leaderboard = false;
                }
                KeyOutcome::Handled
            }
            InputMode::Settling => KeyOutcome::Handled,
            InputMode::ContractMenu => self.handle_menu_key(key.code),
            InputMode::Guessing => self.handle_guess_key(key.code),
        }
    }

    fn handle_menu_key(&mut self, code: KeyCode) -> KeyOutcome {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = self.menu_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_index = (self.menu_index + 1).min(CONTRACTS.len() - 1);
            }
            KeyCode::Char(c @ '1'..='5') => {
                self.menu_index = c as usize - '1' as usize;
                self.start_selected();
            }
            KeyCode::Enter => self.start_selected(),
            KeyCode::Tab | KeyCode::Char('l') => {
                self.show_leaderboard = true;
                return KeyOutcome::RefreshStandings;
            }
            _ => {}
        }
        KeyOutcome::Handled
    }

    fn handle_guess_key(&mut self, code: KeyCode) -> KeyOutcome {
        let result = match code {
            KeyCode::Char(c) => self.driver.input(c),
            KeyCode::Backspace => self.driver.backspace(),
            KeyCode::Enter => {
                self.submit_guess();
                Ok(())
            }
            KeyCode::Esc => {
                self.abandon_round();
                Ok(())
            }
            KeyCode::Tab => {
                self.show_leaderboard = true;
                return KeyOutcome::RefreshStandings;
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.add_message(&e.to_string(), MessageStyle::Error);
        }
        KeyOutcome::Handled
    }

    fn start_selected(&mut self) {
        let tier = CONTRACTS[self.menu_index];
        match self.driver.start_contract(tier.id) {
            Ok(()) => {
                self.stats.rounds += 1;
                self.last_win = None;
                self.add_message(
                    &format!(
                        "{} contract: solve in {} for x{}",
                        tier.label,
                        tier.guesses,
                        tier.multiplier()
                    ),
                    MessageStyle::Info,
                );
            }
            Err(e) => self.add_message(&e.to_string(), MessageStyle::Error),
        }
    }

    fn submit_guess(&mut self) {
        match self.driver.submit() {
            Ok(SubmitOutcome::Miss(report)) => {
                if report.last_chance {
                    self.add_message("LAST CHANCE! One guess left on the contract", MessageStyle::Warning);
                }
                if report.pot_decayed {
                    self.add_message(
                        &format!("Overtime! Pot halved to {}", format_points(report.pot)),
                        MessageStyle::Error,
                    );
                }
            }
            Ok(SubmitOutcome::Won { request, .. }) => {
                self.add_message(
                    &format!("Solved! Settling {} points...", format_points(request.winnings)),
                    MessageStyle::Success,
                );
            }
            // Shown in the input box until the next keystroke
            Err(SessionError::InvalidGuess(_)) => {}
            Err(e) => self.add_message(&e.to_string(), MessageStyle::Error),
        }
    }

    fn abandon_round(&mut self) {
        self.driver.exit();
        if let Some(target) = self.driver.session().revealed_target() {
            self.add_message(
                &format!("Contract abandoned. The word was {target}"),
                MessageStyle::Warning,
            );
        }
    }

    fn quit(&mut self) {
        self.driver.exit();
        self.should_quit = true;
    }

    /// Run the pending settlement and record the result
    pub async fn settle(&mut self) {
        match self.driver.settle_pending().await {
            Ok(report) => {
                self.stats.wins += 1;
                self.stats.winnings = self.stats.winnings.saturating_add(report.winnings);
                self.last_win = Some(report);
                self.add_message(
                    &format!(
                        "+{} banked. Bank: {}",
                        format_points(report.winnings),
                        format_points(report.new_bank)
                    ),
                    MessageStyle::Success,
                );
                if !report.settled {
                    self.add_message(
                        "Ledger unreachable: credited locally, progress not saved",
                        MessageStyle::Warning,
                    );
                } else if !report.recorded {
                    self.add_message(
                        "Bank saved, but the word or leaderboard was not updated",
                        MessageStyle::Warning,
                    );
                }
            }
            Err(e) => self.add_message(&e.to_string(), MessageStyle::Error),
        }
    }

    /// Reload the leaderboard and the player's rank
    pub async fn refresh_standings(&mut self) {
        match self.driver.leaderboard(self.leaderboard_limit).await {
            Ok(entries) => self.leaderboard = entries,
            Err(e) => {
                tracing::warn!("Failed to load leaderboard: {e}");
                self.add_message("Leaderboard unavailable", MessageStyle::Error);
            }
        }
        match self.driver.rank().await {
            Ok(rank) => self.rank = rank,
            Err(e) => tracing::warn!("Failed to load rank: {e}"),
        }
    }

    pub fn add_message(&mut self, text: &str, style: MessageStyle) {
        self.messages.push(Message {
            text: text.to_string(),
            style,
        });

        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }
}

/// Run the TUI application
///
/// # Errors
///
/// Returns an error if terminal setup/cleanup fails or if there's an I/O error
/// during rendering or event handling.
pub async fn run_tui<L: Ledger, X: Lexicon>(app: App<L, X>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err}");
    }

    Ok(())
}

async fn run_app<B, L, X>(terminal: &mut Terminal<B>, mut app: App<L, X>) -> Result<()>
where
    B: ratatui::backend::Backend,
    L: Ledger,
    X: Lexicon,
{
    app.refresh_standings().await;

    loop {
        terminal.draw(|f| super::rendering::ui(f, &app))?;

        // The settling frame stays up while the ledger answers
        if app.input_mode() == InputMode::Settling {
            app.settle().await;
            app.refresh_standings().await;
            continue;
        }

        if let Event::Key(key) = event::read()? {
            // Only process key press events (fixes Windows double-input bug)
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if app.handle_key(key) == KeyOutcome::RefreshStandings {
                app.refresh_standings().await;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Word;
    use crate::driver::DriverOptions;
    use crate::ledger::MemoryLedger;
    use crate::session::GuessError;
    use crate::wordlists::WordList;
    use std::time::Duration;

    fn press(app: &mut App<MemoryLedger, WordList>, code: KeyCode) -> KeyOutcome {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_word(app: &mut App<MemoryLedger, WordList>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
        press(app, KeyCode::Enter);
    }

    async fn app() -> App<MemoryLedger, WordList> {
        let word = |text: &str| Word::new(text).unwrap();
        let lexicon = WordList::new(vec![word("saber")], [word("crane")]).unwrap();
        let options = DriverOptions {
            settlement_timeout: Duration::from_millis(500),
            grace_interval: Duration::ZERO,
        };
        let driver = GameDriver::load(MemoryLedger::new(), lexicon, "tester", options)
            .await
            .unwrap();
        App::new(driver, 5)
    }

    #[tokio::test]
    async fn number_key_opens_contract() {
        let mut app = app().await;
        assert_eq!(app.input_mode(), InputMode::ContractMenu);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.input_mode(), InputMode::Guessing);
        assert_eq!(app.driver.session().contract().unwrap().guesses, 4);
        assert_eq!(app.stats.rounds, 1);
    }

    #[tokio::test]
    async fn menu_navigation_is_clamped() {
        let mut app = app().await;
        for _ in 0..10 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.menu_index, CONTRACTS.len() - 1);
        for _ in 0..10 {
            press(&mut app, KeyCode::Up);
        }
        assert_eq!(app.menu_index, 0);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.driver.session().contract().unwrap().label, "SAFE");
    }

    #[tokio::test]
    async fn invalid_guess_surfaces_session_error() {
        let mut app = app().await;
        press(&mut app, KeyCode::Char('1'));
        type_word(&mut app, "cra");

        assert_eq!(
            app.driver.session().last_error(),
            Some(GuessError::TooShort)
        );
        assert!(app.driver.session().guesses().is_empty());
    }

    #[tokio::test]
    async fn winning_guess_settles_and_returns_to_menu() {
        let mut app = app().await;
        press(&mut app, KeyCode::Char('5'));
        type_word(&mut app, "crane");
        assert!(app.messages.iter().any(|m| m.style == MessageStyle::Warning));

        type_word(&mut app, "saber");
        assert_eq!(app.input_mode(), InputMode::Settling);

        // Keys are ignored while settling
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode(), InputMode::Settling);

        app.settle().await;
        app.refresh_standings().await;

        assert_eq!(app.input_mode(), InputMode::ContractMenu);
        let win = app.last_win.unwrap();
        assert_eq!(win.winnings, 100_000);
        assert!(win.settled);
        assert!(win.recorded);
        assert_eq!(app.stats.wins, 1);
        assert_eq!(app.rank, Some(1));
        assert_eq!(app.leaderboard[0].username, "tester");
    }

    #[tokio::test]
    async fn escape_abandons_round() {
        let mut app = app().await;
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.driver.session().phase(), Phase::Lost);
        assert_eq!(app.input_mode(), InputMode::ContractMenu);
        assert!(app.messages.last().unwrap().text.contains("SABER"));
    }

    #[tokio::test]
    async fn leaderboard_overlay_toggles() {
        let mut app = app().await;
        assert_eq!(press(&mut app, KeyCode::Tab), KeyOutcome::RefreshStandings);
        assert_eq!(app.input_mode(), InputMode::Leaderboard);

        // Menu keys do nothing under the overlay
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.driver.session().phase(), Phase::Setup);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode(), InputMode::ContractMenu);
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn ctrl_c_quits_mid_round() {
        let mut app = app().await;
        press(&mut app, KeyCode::Char('1'));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert!(app.should_quit);
        assert_eq!(app.driver.session().phase(), Phase::Lost);
    }
}
