//! TUI rendering with ratatui
//!
//! Board, keyboard and economy panels for the FlexWord interface.

use super::app::{App, InputMode, MessageStyle};
use crate::contract::{BASE_POT, CONTRACTS};
use crate::core::{TileStatus, WORD_LENGTH};
use crate::ledger::Ledger;
use crate::output::formatters::format_points;
use crate::session::{GameSession, Phase};
use crate::wordlists::Lexicon;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, Paragraph},
};

const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// Main UI rendering function
pub fn ui<L: Ledger, X: Lexicon>(f: &mut Frame, app: &App<L, X>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(12),   // Main content
            Constraint::Length(3), // Input area
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_header(f, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55), // Board or contract menu
            Constraint::Percentage(45), // Economy, keyboard, messages
        ])
        .split(chunks[1]);

    match app.input_mode() {
        InputMode::ContractMenu => render_contract_menu(f, app, main_chunks[0]),
        InputMode::Guessing | InputMode::Settling | InputMode::Leaderboard => {
            if app.driver.session().contract().is_some() {
                render_board(f, app.driver.session(), main_chunks[0]);
            } else {
                render_contract_menu(f, app, main_chunks[0]);
            }
        }
    }
    render_info_panel(f, app, main_chunks[1]);

    render_input(f, app, chunks[2]);
    render_status(f, app, chunks[3]);

    if app.input_mode() == InputMode::Leaderboard {
        render_leaderboard(f, app, centered(f.area(), 50, 60));
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new("🎯 FLEXWORD - Contract Bidding")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn tile_style(status: TileStatus) -> Style {
    let (fg, bg) = match status {
        TileStatus::Correct => (Color::White, Color::Blue),
        TileStatus::Present => (Color::Black, Color::Yellow),
        TileStatus::Absent => (Color::White, Color::DarkGray),
    };
    Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD)
}

fn render_contract_menu<L: Ledger, X: Lexicon>(f: &mut Frame, app: &App<L, X>, area: Rect) {
    let mut lines = Vec::new();

    if let Some(win) = app.last_win {
        lines.push(Line::from(Span::styled(
            format!("🎉 {} for +{}", win.word, format_points(win.winnings)),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    } else if app.driver.session().phase() == Phase::Lost
        && let Some(target) = app.driver.session().revealed_target()
    {
        lines.push(Line::from(Span::styled(
            format!("The word was {target}"),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from("Choose your contract:"));
    lines.push(Line::from(""));

    for (i, tier) in CONTRACTS.iter().enumerate() {
        let selected = i == app.menu_index;
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(if selected { " ▶ " } else { "   " }, style),
            Span::styled(format!("{}. {:<9}", i + 1, tier.label), style),
            Span::raw(format!("{} guesses  ", tier.guesses)),
            Span::styled(
                format!("x{:<4}", tier.multiplier()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!(" max {}", format_points(tier.max_payout())),
                Style::default().fg(Color::Green),
            ),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Contracts ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(paragraph, area);
}

fn render_board(f: &mut Frame, session: &GameSession, area: Rect) {
    let Some(contract) = session.contract() else {
        return;
    };
    let budget = usize::from(contract.guesses);
    let mut lines: Vec<Line> = Vec::new();

    for (i, record) in session.guesses().iter().enumerate() {
        let mut spans = vec![row_label(i, budget)];
        for (letter, &status) in record.word.text().chars().zip(record.feedback.tiles()) {
            spans.push(Span::styled(format!(" {letter} "), tile_style(status)));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    if session.phase() == Phase::Playing {
        let row = session.guesses().len();
        let mut spans = vec![row_label(row, budget)];
        let typed: Vec<char> = session.current_guess().chars().collect();
        for i in 0..WORD_LENGTH {
            let cell = typed.get(i).map_or_else(|| " · ".to_string(), |c| format!(" {c} "));
            spans.push(Span::styled(
                cell,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));

        for empty in (row + 1)..budget {
            let mut spans = vec![row_label(empty, budget)];
            spans.push(Span::styled(
                " ·   ·   ·   ·   · ",
                Style::default().fg(Color::DarkGray),
            ));
            lines.push(Line::from(spans));
        }
    }

    // Keep the latest rows visible once overtime outgrows the panel
    let visible = usize::from(area.height.saturating_sub(2)).max(1);
    let skip = lines.len().saturating_sub(visible);
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    let title = format!(" {} · {} guesses ", contract.label, contract.guesses);
    let border = if session.is_overtime() {
        Color::Red
    } else {
        Color::White
    };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .style(Style::default().fg(border)),
    );
    f.render_widget(paragraph, area);
}

fn row_label(index: usize, budget: usize) -> Span<'static> {
    let style = if index >= budget {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(format!("{:>3} ", index + 1), style)
}

fn render_info_panel<L: Ledger, X: Lexicon>(f: &mut Frame, app: &App<L, X>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Pot gauge
            Constraint::Length(5), // Keyboard
            Constraint::Min(3),    // Messages
        ])
        .split(area);

    render_pot(f, app.driver.session(), chunks[0]);
    render_keyboard(f, app.driver.session(), chunks[1]);
    render_messages(f, app, chunks[2]);
}

fn render_pot(f: &mut Frame, session: &GameSession, area: Rect) {
    let pot = session.pot();
    let percent = (pot.min(BASE_POT) * 100 / BASE_POT) as u16;

    let label = match session.contract() {
        Some(contract) if !session.is_overtime() => format!(
            "{} × {} = {}",
            format_points(pot),
            contract.multiplier(),
            format_points(contract.apply_multiplier(pot))
        ),
        Some(_) => format!("{} (overtime)", format_points(pot)),
        None => format_points(pot),
    };

    let color = if session.is_overtime() {
        Color::Red
    } else {
        Color::Green
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Pot ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .gauge_style(Style::default().fg(color))
        .percent(percent)
        .label(label);

    f.render_widget(gauge, area);
}

fn render_keyboard(f: &mut Frame, session: &GameSession, area: Rect) {
    let keyboard = session.keyboard();
    let lines: Vec<Line> = KEYBOARD_ROWS
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .bytes()
                .flat_map(|letter| {
                    let style = keyboard
                        .status(letter)
                        .map_or_else(|| Style::default().fg(Color::White), tile_style);
                    [
                        Span::styled(format!(" {} ", letter as char), style),
                        Span::raw(" "),
                    ]
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().title(" Keyboard ").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_messages<L: Ledger, X: Lexicon>(f: &mut Frame, app: &App<L, X>, area: Rect) {
    let messages: Vec<ListItem> = app
        .messages
        .iter()
        .rev()
        .map(|msg| {
            let style = match msg.style {
                MessageStyle::Info => Style::default().fg(Color::White),
                MessageStyle::Success => Style::default().fg(Color::Green),
                MessageStyle::Warning => Style::default().fg(Color::Yellow),
                MessageStyle::Error => Style::default().fg(Color::Red),
            };
            ListItem::new(msg.text.clone()).style(style)
        })
        .collect();

    let messages_list =
        List::new(messages).block(Block::default().title(" Messages ").borders(Borders::ALL));

    f.render_widget(messages_list, area);
}

fn render_input<L: Ledger, X: Lexicon>(f: &mut Frame, app: &App<L, X>, area: Rect) {
    let session = app.driver.session();
    let (title, content, color) = match app.input_mode() {
        InputMode::ContractMenu => (
            " ↑/↓ choose · Enter or 1-5 to bid ".to_string(),
            String::new(),
            Color::Cyan,
        ),
        InputMode::Guessing => match session.last_error() {
            Some(err) => (
                " Guess · Space for a blank · Esc to walk away ".to_string(),
                err.to_string(),
                Color::Red,
            ),
            None => (
                " Guess · Space for a blank · Esc to walk away ".to_string(),
                session.current_guess().to_string(),
                Color::Yellow,
            ),
        },
        InputMode::Settling => (
            " Settling ".to_string(),
            "⏳ Banking your winnings...".to_string(),
            Color::Green,
        ),
        InputMode::Leaderboard => (" Leaderboard ".to_string(), String::new(), Color::Cyan),
    };

    let input = Paragraph::new(content)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .style(Style::default().fg(color)),
        );

    f.render_widget(input, area);
}

fn render_status<L: Ledger, X: Lexicon>(f: &mut Frame, app: &App<L, X>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ])
        .split(area);

    let user = app.driver.user();
    let player = Paragraph::new(format!("Player: {}", user.username)).alignment(Alignment::Center);
    f.render_widget(player, chunks[0]);

    let bank = Paragraph::new(format!("Bank: {}", format_points(user.bank)))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(bank, chunks[1]);

    let rank_text = app
        .rank
        .map_or_else(|| "Rank: -".to_string(), |rank| format!("Rank: #{rank}"));
    let rank = Paragraph::new(rank_text).alignment(Alignment::Center);
    f.render_widget(rank, chunks[2]);

    let help_text = match app.input_mode() {
        InputMode::ContractMenu => "q: Quit | Tab: Leaderboard",
        InputMode::Guessing => "Enter: Submit | Tab: Leaderboard",
        InputMode::Settling => "Please wait",
        InputMode::Leaderboard => "Esc: Close",
    };
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[3]);
}

fn render_leaderboard<L: Ledger, X: Lexicon>(f: &mut Frame, app: &App<L, X>, area: Rect) {
    let me = app.driver.user().username.as_str();
    let items: Vec<ListItem> = if app.leaderboard.is_empty() {
        vec![ListItem::new("No ranked players yet")]
    } else {
        app.leaderboard
            .iter()
            .map(|entry| {
                let style = if entry.username == me {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!(
                    "{:>3}. {:<16} {:>12}",
                    entry.rank,
                    entry.username,
                    format_points(entry.bank)
                ))
                .style(style)
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .title(" 🏆 Leaderboard ")
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(Clear, area);
    f.render_widget(list, area);
}

/// A rectangle of the given percentage size centered in `area`
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
