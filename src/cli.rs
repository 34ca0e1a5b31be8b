use crate::catalog::{Catalog, Difficulty, default_catalog_path};
use crate::error::{CatalogError, GameError};
use crate::game_state::{GameInterface, UserAction};
use crate::scorer;
use crate::session::{
    DEFAULT_TIME_LIMIT_SECS, GameState, GuessRecord, Modifiers, SessionSnapshot, Transition,
};
use crate::suggestion::{Suggestion, SuggestionError};
use chrono::TimeDelta;
use clap::Parser;
use std::io::BufRead;
use std::num::NonZeroUsize;
use std::path::PathBuf;

const HISTORY_DISPLAY: usize = 10;

/// Password Prowler: guess the password, one colour-coded character at a time
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON password catalog
    #[arg(short = 'c', long = "catalog")]
    pub catalog_path: Option<PathBuf>,

    /// Enable the countdown timer
    #[arg(long)]
    pub timer: bool,

    /// Timer length in seconds
    #[arg(
        long = "time-limit",
        value_name = "SECS",
        default_value_t = DEFAULT_TIME_LIMIT_SECS,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub time_limit: i64,

    /// Limit the number of guesses per round (15 if no value is given)
    #[arg(long = "guess-limit", value_name = "N", num_args = 0..=1, default_missing_value = "15")]
    pub guess_limit: Option<NonZeroUsize>,

    /// Use the full-screen terminal interface
    #[arg(long)]
    pub tui: bool,

    /// Print a suggestion for strengthening PASSWORD and exit
    #[arg(long, value_name = "PASSWORD")]
    pub suggest: Option<String>,
}

impl Cli {
    /// Round modifiers selected on the command line.
    #[must_use]
    pub fn settings(&self) -> Modifiers {
        Modifiers {
            timer: self.timer.then(|| TimeDelta::seconds(self.time_limit)),
            guess_limit: self.guess_limit,
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Load the catalog named on the command line, else the per-user catalog if
/// one exists, else the embedded one.
///
/// # Errors
///
/// Returns `CatalogError` if the chosen catalog cannot be read or parsed.
pub fn resolve_catalog(cli: &Cli) -> Result<Catalog, CatalogError> {
    if let Some(path) = &cli.catalog_path {
        log::info!("Loading catalog from {}", path.display());
        return Catalog::from_file(path);
    }
    if let Some(path) = default_catalog_path().filter(|p| p.exists()) {
        log::info!("Loading catalog from {}", path.display());
        return Catalog::from_file(path);
    }
    log::info!("Using embedded catalog");
    Catalog::embedded()
}

// UI Input/Output functions

/// Interpret one line of input in the context of the current state.
///
/// Slash commands work everywhere. While playing, anything else is a guess.
pub fn parse_input(line: &str, state: GameState) -> Result<UserAction, String> {
    let input = line.trim();

    if let Some(command) = input.strip_prefix('/') {
        let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
        return match name.to_ascii_lowercase().as_str() {
            "quit" | "exit" => Ok(UserAction::Exit),
            "hint" => Ok(UserAction::Hint),
            "fact" => Ok(UserAction::Fact),
            "again" | "menu" => Ok(UserAction::PlayAgain),
            "suggest" => Ok(UserAction::Suggest(rest.trim().to_string())),
            other => Err(format!("Unknown command '/{other}'.")),
        };
    }

    match state {
        GameState::Playing => Ok(UserAction::Guess(input.to_string())),
        GameState::Menu => match input.to_ascii_lowercase().as_str() {
            "quit" | "exit" => Ok(UserAction::Exit),
            _ => input
                .parse::<Difficulty>()
                .map(UserAction::SelectDifficulty)
                .map_err(|e| e.to_string()),
        },
        GameState::Won | GameState::Failed(_) => match input.to_ascii_lowercase().as_str() {
            "quit" | "exit" | "n" | "no" => Ok(UserAction::Exit),
            "again" | "y" | "yes" | "" => Ok(UserAction::PlayAgain),
            "fact" => Ok(UserAction::Fact),
            _ => Err("Type 'again' to play again or 'quit' to exit.".to_string()),
        },
    }
}

/// One guess as text: the guess followed by its feedback symbols.
#[must_use]
pub fn format_guess_row(record: &GuessRecord) -> String {
    format!("{}  {}", record.guess, scorer::codes_to_string(&record.feedback))
}

fn prompt_for(state: GameState) -> &'static str {
    match state {
        GameState::Menu => "Choose a difficulty (easy, medium, hard) or 'quit':",
        GameState::Playing => "Enter your guess (/hint, /fact, /suggest <password>, /quit):",
        GameState::Won | GameState::Failed(_) => "Play again? (again, /fact, quit):",
    }
}

pub fn display_snapshot(snapshot: &SessionSnapshot) {
    match snapshot.state {
        GameState::Menu => {
            println!("\n=== Password Prowler ===");
            println!("1. Easy\n2. Medium\n3. Hard");
        }
        GameState::Playing => {
            if let Some(difficulty) = snapshot.difficulty {
                println!("\nDifficulty: {difficulty}");
            }
            if let Some(length) = snapshot.password_length {
                println!("Password length: {length}");
            }
            if let Some(remaining) = snapshot.remaining_time {
                println!("Time left: {} seconds", remaining.num_seconds());
            }
            if let Some(left) = snapshot.remaining_guesses {
                println!("Guesses left: {left}");
            }
            for record in snapshot.recent_guesses(HISTORY_DISPLAY) {
                println!("  {}", format_guess_row(record));
            }
        }
        GameState::Won => {
            println!("You guessed the password correctly!");
        }
        GameState::Failed(reason) => {
            println!("You failed to guess the password ({reason}).");
            if let Some(password) = &snapshot.revealed_password {
                println!("The password was: {password}");
            }
        }
    }
}

pub fn display_transition(transition: &Transition) {
    match transition {
        Transition::Started {
            difficulty,
            password_length,
        } => println!(
            "New {difficulty} round: the password has {password_length} characters. \
             Feedback: G=correct, C=wrong case, Y=wrong position, X=absent."
        ),
        Transition::Scored(_) | Transition::Won(_) | Transition::Unchanged => {}
        Transition::Failed(reason) => println!("Round over: {reason}."),
        Transition::HintRevealed(hint) => println!("Hint: {hint}"),
        Transition::HintsExhausted => println!("No more hints for this password."),
        Transition::ReturnedToMenu => println!("Back to the menu."),
    }
}

pub fn display_fact(fact: Option<&str>) {
    match fact {
        Some(fact) => println!("Fact: {fact}"),
        None => println!("No fact available for this password."),
    }
}

pub fn display_suggestion(result: &Result<Suggestion, SuggestionError>) {
    match result {
        Ok(suggestion) => {
            println!("Suggested password: {}", suggestion.replacement);
            println!("{}", suggestion.explanation);
        }
        Err(e) => println!("No suggestion: {e}"),
    }
}

pub fn display_error(error: &GameError) {
    println!("Error: {error}");
}

pub fn display_exit_message() {
    println!("Exiting.");
}

/// CLI implementation of the `GameInterface` trait.
/// Wraps a `BufRead` reader; end of input counts as an exit.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn render(&mut self, snapshot: &SessionSnapshot) {
        display_snapshot(snapshot);
    }

    fn next_action(&mut self, snapshot: &SessionSnapshot) -> Option<UserAction> {
        println!("{}", prompt_for(snapshot.state));
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => return Some(UserAction::Exit),
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to read input: {e}");
                return Some(UserAction::Exit);
            }
        }

        match parse_input(&line, snapshot.state) {
            Ok(action) => Some(action),
            Err(message) => {
                println!("{message}");
                None
            }
        }
    }

    fn report_transition(&mut self, transition: &Transition) {
        display_transition(transition);
    }

    fn report_error(&mut self, error: &GameError) {
        display_error(error);
    }

    fn show_fact(&mut self, fact: Option<&str>) {
        display_fact(fact);
    }

    fn show_suggestion(&mut self, result: &Result<Suggestion, SuggestionError>) {
        display_suggestion(result);
    }

    fn display_exit_message(&mut self) {
        display_exit_message();
    }
}
