//! TUI (Terminal User Interface) module for Password Prowler
//!
//! Renders session snapshots with Ratatui and turns key presses into
//! [`UserAction`]s. Input is polled with a short timeout so the game loop
//! keeps ticking the round timer while the player thinks.
//!
//! # Keys
//! - Menu: `1`/`2`/`3` (or `E`/`M`/`H`) pick a difficulty
//! - Playing: type the guess, `ENTER` submits, `TAB` reveals a hint, `F2` shows a fact
//! - Round over: `ENTER`/`N` plays again, `F` shows a fact
//! - `F3` opens a prompt for a password to get a suggestion on; `ENTER` asks,
//!   `ESC` closes the prompt
//! - `ESC` quits from anywhere else

use crate::catalog::Difficulty;
use crate::error::GameError;
use crate::game_state::{GameInterface, UserAction};
use crate::scorer::FeedbackCode;
use crate::session::{GameState, GuessRecord, SessionSnapshot, Transition};
use crate::suggestion::{Suggestion, SuggestionError};
use crate::{debug_log, info_log};
use chrono::TimeDelta;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ROW_SPACING: u16 = 2;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;
const LOW_TIME_SECS: i64 = 30;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

/// Background and foreground colours of a scored tile.
fn tile_colors(code: FeedbackCode) -> (Color, Color) {
    match code {
        FeedbackCode::ExactMatch => (Color::Green, Color::Black),
        FeedbackCode::CaseMismatch => (Color::Blue, Color::White),
        FeedbackCode::PresentWrongPosition => (Color::Yellow, Color::Black),
        FeedbackCode::Absent => (Color::Gray, Color::White),
    }
}

/// `m:ss`, clamped at zero.
fn format_remaining(remaining: TimeDelta) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn has_modifier_keys(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Garbage from escape sequences (e.g. alt-tab) shows up as replacement or control characters.
fn is_garbage_char(c: char) -> bool {
    c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD
}

fn menu_action(key: KeyEvent) -> Option<UserAction> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
        KeyCode::Char('1' | 'e' | 'E') => Some(UserAction::SelectDifficulty(Difficulty::Easy)),
        KeyCode::Char('2' | 'm' | 'M') => Some(UserAction::SelectDifficulty(Difficulty::Medium)),
        KeyCode::Char('3' | 'h' | 'H') => Some(UserAction::SelectDifficulty(Difficulty::Hard)),
        _ => None,
    }
}

/// Keys that act during a round instead of editing the guess.
fn playing_shortcut(key: KeyEvent) -> Option<UserAction> {
    match key.code {
        KeyCode::Esc => Some(UserAction::Exit),
        KeyCode::Tab => Some(UserAction::Hint),
        KeyCode::F(2) => Some(UserAction::Fact),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptOutcome {
    Editing,
    Submit(String),
    Cancel,
}

/// Line editing for the suggestion prompt.
fn edit_prompt(buffer: &mut String, key: KeyEvent) -> PromptOutcome {
    match key.code {
        KeyCode::Esc => PromptOutcome::Cancel,
        KeyCode::Enter => {
            let password = std::mem::take(buffer);
            if password.is_empty() {
                PromptOutcome::Cancel
            } else {
                PromptOutcome::Submit(password)
            }
        }
        KeyCode::Backspace => {
            buffer.pop();
            PromptOutcome::Editing
        }
        KeyCode::Char(c) if !has_modifier_keys(&key) => {
            buffer.push(c);
            PromptOutcome::Editing
        }
        _ => PromptOutcome::Editing,
    }
}

fn finished_action(key: KeyEvent) -> Option<UserAction> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
        KeyCode::Enter | KeyCode::Char('n' | 'N') => Some(UserAction::PlayAgain),
        KeyCode::Char('f' | 'F') => Some(UserAction::Fact),
        _ => None,
    }
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    snapshot: &'a SessionSnapshot,
    current_input: &'a str,
    message: &'a str,
    error_message: &'a str,
    fact: Option<&'a str>,
    suggest_input: Option<&'a str>,
    status: &'a str,
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and game state display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    current_input: String,
    message: String,
    error_message: String,
    fact: Option<String>,
    suggest_input: Option<String>,
    status: String,
}

impl TuiInterface {
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched to raw mode or the alternate screen.
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            current_input: String::new(),
            message: String::new(),
            error_message: String::new(),
            fact: None,
            suggest_input: None,
            status: "Choose a difficulty".to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the terminal cannot be restored.
    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self, snapshot: &SessionSnapshot) -> Result<(), io::Error> {
        let ctx = RenderContext {
            snapshot,
            current_input: &self.current_input,
            message: &self.message,
            error_message: &self.error_message,
            fact: self.fact.as_deref(),
            suggest_input: self.suggest_input.as_deref(),
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.draw(snapshot) {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Title
                Constraint::Min(8),     // Game board
                Constraint::Length(10), // Info panel
                Constraint::Length(3),  // Status line
                Constraint::Length(3),  // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0], ctx.snapshot);
        Self::render_board(f, chunks[1], ctx.snapshot, ctx.current_input);
        Self::render_info(f, chunks[2], ctx);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_instructions(
            f,
            chunks[4],
            ctx.snapshot.state,
            ctx.suggest_input.is_some(),
        );
    }

    fn render_title(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
        let mut spans = vec![Span::styled("PASSWORD PROWLER", HEADER_STYLE)];
        if let Some(difficulty) = snapshot.difficulty {
            spans.push(Span::raw(format!("  |  {difficulty}")));
        }
        if let Some(length) = snapshot.password_length {
            spans.push(Span::raw(format!("  |  {length} characters")));
        }
        let title =
            Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_board(f: &mut Frame, area: Rect, snapshot: &SessionSnapshot, current_input: &str) {
        let block = Block::default().title("Guesses").borders(Borders::ALL);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if snapshot.state == GameState::Menu {
            let lines = vec![
                Line::from(Span::styled("Choose a difficulty:", INFO_STYLE)),
                Line::from("  1. Easy"),
                Line::from("  2. Medium"),
                Line::from("  3. Hard"),
            ];
            f.render_widget(Paragraph::new(lines), inner);
            return;
        }

        let available_rows = (inner.height / ROW_SPACING) as usize;
        let showing_input = snapshot.state == GameState::Playing;
        let rows_for_history = available_rows.saturating_sub(usize::from(showing_input));

        // Most recent guesses win when the board is full
        let visible = snapshot.recent_guesses(rows_for_history);
        for (row, record) in visible.iter().enumerate() {
            Self::render_guess_row(f, inner, row, record);
        }

        if showing_input {
            let length = snapshot.password_length.unwrap_or(0);
            Self::render_current_input(f, inner, visible.len(), current_input, length);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn row_y(area: Rect, row: usize) -> Option<u16> {
        let y = area.y + (row as u16 * ROW_SPACING);
        (y < area.y + area.height).then_some(y)
    }

    fn render_guess_row(f: &mut Frame, area: Rect, row: usize, record: &GuessRecord) {
        let Some(y) = Self::row_y(area, row) else {
            return;
        };

        let mut spans = vec![Span::raw("  ")];
        for (letter, code) in record.tiles() {
            let (bg, fg) = tile_colors(code);
            spans.push(Span::styled(
                format!(" {letter} "),
                Style::default().fg(fg).bg(bg),
            ));
            spans.push(Span::raw(" "));
        }
        Self::render_line(f, area, y, spans);
    }

    fn render_current_input(
        f: &mut Frame,
        area: Rect,
        row: usize,
        current_input: &str,
        length: usize,
    ) {
        let Some(y) = Self::row_y(area, row) else {
            return;
        };

        let mut spans = vec![Span::raw("  ")];
        let mut typed = current_input.chars();
        for _ in 0..length {
            let letter = typed.next().unwrap_or(' ');
            spans.push(Span::styled(
                format!(" {letter} "),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ));
            spans.push(Span::raw(" "));
        }
        Self::render_line(f, area, y, spans);
    }

    fn render_line(f: &mut Frame, area: Rect, y: u16, spans: Vec<Span>) {
        let paragraph = Paragraph::new(Line::from(spans));
        f.render_widget(
            paragraph,
            Rect {
                x: area.x,
                y,
                width: area.width,
                height: 1,
            },
        );
    }

    fn render_info(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let snapshot = ctx.snapshot;
        let mut lines = Vec::new();

        let mut counters = Vec::new();
        if let Some(remaining) = snapshot.remaining_time {
            let style = if remaining.num_seconds() <= LOW_TIME_SECS {
                ERROR_STYLE
            } else {
                INFO_STYLE
            };
            counters.push(Span::styled(
                format!("Time left: {}", format_remaining(remaining)),
                style,
            ));
            counters.push(Span::raw("   "));
        }
        if let Some(left) = snapshot.remaining_guesses {
            counters.push(Span::styled(format!("Guesses left: {left}"), INFO_STYLE));
        }
        if !counters.is_empty() {
            lines.push(Line::from(counters));
        }

        for (i, hint) in snapshot.hints.iter().enumerate() {
            lines.push(Line::from(format!(
                "Hint {}/{}: {hint}",
                i + 1,
                snapshot.total_hints
            )));
        }

        match snapshot.state {
            GameState::Won => {
                lines.push(Line::from(Span::styled(
                    "You guessed the password correctly!",
                    SUCCESS_STYLE,
                )));
            }
            GameState::Failed(reason) => {
                lines.push(Line::from(Span::styled(
                    format!("You failed to guess the password: {reason}."),
                    ERROR_STYLE,
                )));
                if let Some(password) = &snapshot.revealed_password {
                    lines.push(Line::from(format!("The password was: {password}")));
                }
            }
            GameState::Menu | GameState::Playing => {}
        }

        if let Some(fact) = ctx.fact {
            lines.push(Line::from(Span::styled(
                format!("Fact: {fact}"),
                SUCCESS_STYLE,
            )));
        }
        if let Some(input) = ctx.suggest_input {
            lines.push(Line::from(Span::styled(
                format!("Password to check: {input}_"),
                INFO_STYLE,
            )));
        }
        if !ctx.message.is_empty() {
            lines.push(Line::from(Span::styled(ctx.message, MESSAGE_STYLE)));
        }
        if !ctx.error_message.is_empty() {
            lines.push(Line::from(Span::styled(ctx.error_message, ERROR_STYLE)));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: GameState, suggesting: bool) {
        let text = match state {
            _ if suggesting => "Type a password | ENTER: Get suggestion | ESC: Cancel",
            GameState::Menu => "1: Easy | 2: Medium | 3: Hard | F3: Suggest | ESC: Quit",
            GameState::Playing => {
                "Type your guess | ENTER: Submit | TAB: Hint | F2: Fact | F3: Suggest | ESC: Quit"
            }
            GameState::Won | GameState::Failed(_) => {
                "ENTER/N: Play again | F: Fact | F3: Suggest | ESC: Quit"
            }
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    fn handle_input(
        &mut self,
        snapshot: &SessionSnapshot,
    ) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }

        let Event::Key(key) = event::read()? else {
            debug_log!("handle_input() - Ignoring non-key event");
            return Ok(None);
        };

        // Only process Press events, ignore Release and Repeat to avoid double input
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }
        if let KeyCode::Char(c) = key.code
            && is_garbage_char(c)
        {
            debug_log!("handle_input() - Ignoring invalid character: {:?}", c);
            return Ok(None);
        }

        debug_log!(
            "handle_input() - Key event received: code={:?}, modifiers={:?}",
            key.code,
            key.modifiers
        );

        if self.suggest_input.is_some() || key.code == KeyCode::F(3) {
            return Ok(self.handle_suggest_input(key));
        }

        Ok(match snapshot.state {
            GameState::Menu => menu_action(key),
            GameState::Playing => {
                self.handle_guess_input(key, snapshot.password_length.unwrap_or(0))
            }
            GameState::Won | GameState::Failed(_) => finished_action(key),
        })
    }

    fn handle_suggest_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        let Some(buffer) = self.suggest_input.as_mut() else {
            // F3 opens the prompt
            self.suggest_input = Some(String::new());
            self.message.clear();
            self.error_message.clear();
            return None;
        };

        match edit_prompt(buffer, key) {
            PromptOutcome::Editing => None,
            PromptOutcome::Cancel => {
                self.suggest_input = None;
                None
            }
            PromptOutcome::Submit(password) => {
                self.suggest_input = None;
                info_log!("handle_suggest_input() - Requesting suggestion");
                Some(UserAction::Suggest(password))
            }
        }
    }

    fn handle_guess_input(&mut self, key: KeyEvent, max_len: usize) -> Option<UserAction> {
        if let Some(action) = playing_shortcut(key) {
            debug_log!("handle_guess_input() - Shortcut {:?}", action);
            return Some(action);
        }

        match key.code {
            KeyCode::Enter => {
                let guess = std::mem::take(&mut self.current_input);
                info_log!(
                    "handle_guess_input() - Submitting guess of {} chars",
                    guess.chars().count()
                );
                Some(UserAction::Guess(guess))
            }
            KeyCode::Backspace => {
                self.current_input.pop();
                None
            }
            KeyCode::Char(c) if !has_modifier_keys(&key) => {
                if self.current_input.chars().count() < max_len {
                    self.current_input.push(c);
                    self.error_message.clear();
                } else {
                    self.error_message = format!("The password only has {max_len} characters.");
                }
                None
            }
            _ => None,
        }
    }
}

impl GameInterface for TuiInterface {
    fn render(&mut self, snapshot: &SessionSnapshot) {
        self.draw_or_log(snapshot);
    }

    fn next_action(&mut self, snapshot: &SessionSnapshot) -> Option<UserAction> {
        // Redrawn on every poll so the countdown stays current
        if self.draw(snapshot).is_err() {
            info_log!("next_action() - Draw failed, returning Exit");
            return Some(UserAction::Exit);
        }

        match self.handle_input(snapshot) {
            Ok(action) => action,
            Err(e) => {
                info_log!("next_action() - Error handling input: {}", e);
                Some(UserAction::Exit)
            }
        }
    }

    fn report_transition(&mut self, transition: &Transition) {
        self.error_message.clear();
        match transition {
            Transition::Started {
                difficulty,
                password_length,
            } => {
                self.current_input.clear();
                self.fact = None;
                self.message.clear();
                self.status =
                    format!("{difficulty} round - the password has {password_length} characters");
            }
            Transition::Scored(record) => {
                self.status = format!("Scored '{}'", record.guess);
            }
            Transition::Won(_) => {
                self.status = "Solved!".to_string();
            }
            Transition::Failed(reason) => {
                self.current_input.clear();
                self.status = format!("Game over - {reason}");
            }
            Transition::HintRevealed(_) => {
                self.status = "Hint revealed".to_string();
            }
            Transition::HintsExhausted => {
                self.error_message = "No more hints for this password.".to_string();
            }
            Transition::ReturnedToMenu => {
                self.fact = None;
                self.message.clear();
                self.status = "Choose a difficulty".to_string();
            }
            Transition::Unchanged => {}
        }
    }

    fn report_error(&mut self, error: &GameError) {
        self.error_message = error.to_string();
    }

    fn show_fact(&mut self, fact: Option<&str>) {
        match fact {
            Some(fact) => self.fact = Some(fact.to_string()),
            None => self.error_message = "No fact available for this password.".to_string(),
        }
    }

    fn show_suggestion(&mut self, result: &Result<Suggestion, SuggestionError>) {
        match result {
            Ok(suggestion) => {
                self.message = format!(
                    "Try '{}'. {}",
                    suggestion.replacement, suggestion.explanation
                );
            }
            Err(e) => self.error_message = e.to_string(),
        }
    }

    fn display_exit_message(&mut self) {
        self.status = "Exiting...".to_string();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
