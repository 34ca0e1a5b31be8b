//! Game session state machine.
//!
//! A session moves through `Menu` → `Playing` → `Won` | `Failed` and back to
//! `Menu` via [`GameSession::reset_to_menu`]. Every operation runs to
//! completion and returns a [`Transition`] describing what happened, so the
//! caller decides when to redraw.
//!
//! The round timer is polled: [`GameSession::tick`] compares the clock with
//! the deadline. Timer and guess-limit checks also run before and after each
//! submitted guess.

use crate::catalog::{Difficulty, PasswordCatalog, SecretEntry};
use crate::clock::{Clock, SystemClock};
use crate::error::GameError;
use crate::scorer::{self, FeedbackCode};
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;

pub const DEFAULT_TIME_LIMIT_SECS: i64 = 180;
pub const DEFAULT_GUESS_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    TimedOut,
    OutOfGuesses,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimedOut => f.write_str("time ran out"),
            Self::OutOfGuesses => f.write_str("out of guesses"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Won,
    Failed(FailureReason),
}

impl GameState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Menu => "in the menu",
            Self::Playing => "playing",
            Self::Won => "won",
            Self::Failed(_) => "failed",
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Failed(_))
    }
}

/// Optional rules for a round. Only changeable from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub timer: Option<TimeDelta>,
    pub guess_limit: Option<NonZeroUsize>,
}

impl Modifiers {
    #[must_use]
    pub fn with_timer(mut self, limit: TimeDelta) -> Self {
        self.timer = Some(limit);
        self
    }

    #[must_use]
    pub fn with_guess_limit(mut self, limit: NonZeroUsize) -> Self {
        self.guess_limit = Some(limit);
        self
    }
}

/// A submitted guess and its feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    pub guess: String,
    pub feedback: Vec<FeedbackCode>,
}

impl GuessRecord {
    /// Pairs each guessed character with its code.
    pub fn tiles(&self) -> impl Iterator<Item = (char, FeedbackCode)> + '_ {
        self.guess.chars().zip(self.feedback.iter().copied())
    }
}

/// Outcome of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started {
        difficulty: Difficulty,
        password_length: usize,
    },
    Scored(GuessRecord),
    Won(GuessRecord),
    Failed(FailureReason),
    HintRevealed(String),
    HintsExhausted,
    ReturnedToMenu,
    Unchanged,
}

/// Read-only view handed to the presentation layer after each transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: GameState,
    pub difficulty: Option<Difficulty>,
    pub password_length: Option<usize>,
    /// Only set once the round is over.
    pub revealed_password: Option<String>,
    pub guesses: Vec<GuessRecord>,
    pub hints: Vec<String>,
    pub total_hints: usize,
    pub remaining_time: Option<TimeDelta>,
    pub remaining_guesses: Option<usize>,
}

impl SessionSnapshot {
    /// The last `n` guesses, oldest first.
    #[must_use]
    pub fn recent_guesses(&self, n: usize) -> &[GuessRecord] {
        let skip = self.guesses.len().saturating_sub(n);
        &self.guesses[skip..]
    }
}

#[derive(Debug)]
pub struct GameSession<C = SystemClock> {
    clock: C,
    modifiers: Modifiers,
    state: GameState,
    active_secret: Option<SecretEntry>,
    difficulty: Option<Difficulty>,
    guess_history: Vec<GuessRecord>,
    hint_cursor: usize,
    timer_deadline: Option<DateTime<Utc>>,
    guess_limit: Option<NonZeroUsize>,
    used_passwords: HashSet<String>,
}

impl GameSession<SystemClock> {
    #[must_use]
    pub fn new(modifiers: Modifiers) -> Self {
        Self::with_clock(modifiers, SystemClock)
    }
}

impl<C: Clock> GameSession<C> {
    pub fn with_clock(modifiers: Modifiers, clock: C) -> Self {
        Self {
            clock,
            modifiers,
            state: GameState::Menu,
            active_secret: None,
            difficulty: None,
            guess_history: Vec::new(),
            hint_cursor: 0,
            timer_deadline: None,
            guess_limit: None,
            used_passwords: HashSet::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[must_use]
    pub fn guess_history(&self) -> &[GuessRecord] {
        &self.guess_history
    }

    #[must_use]
    pub fn hint_cursor(&self) -> usize {
        self.hint_cursor
    }

    #[must_use]
    pub fn active_secret(&self) -> Option<&SecretEntry> {
        self.active_secret.as_ref()
    }

    /// Change the modifiers used by the next round.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the session is in the menu.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) -> Result<(), GameError> {
        self.require(GameState::Menu, "change modifiers")?;
        self.modifiers = modifiers;
        Ok(())
    }

    /// Start a round with a secret of the given tier.
    ///
    /// # Errors
    ///
    /// `NoEntriesAvailable` if the catalog has nothing for `tier`, or
    /// `InvalidState` if a round is already in progress or finished.
    pub fn select_difficulty<P>(
        &mut self,
        catalog: &mut P,
        tier: Difficulty,
    ) -> Result<Transition, GameError>
    where
        P: PasswordCatalog + ?Sized,
    {
        self.require(GameState::Menu, "select a difficulty")?;

        let secret = catalog
            .pick_one(tier, &self.used_passwords)
            .ok_or(GameError::NoEntriesAvailable(tier))?;
        let password_length = secret.len();

        self.used_passwords.insert(secret.password.clone());
        self.active_secret = Some(secret);
        self.difficulty = Some(tier);
        self.guess_history.clear();
        self.hint_cursor = 0;
        self.timer_deadline = self.modifiers.timer.map(|limit| self.clock.now() + limit);
        self.guess_limit = self.modifiers.guess_limit;
        self.state = GameState::Playing;

        log::info!(
            "Round started: difficulty={tier}, length={password_length}, timer={:?}, guess_limit={:?}",
            self.modifiers.timer.map(|t| t.num_seconds()),
            self.guess_limit
        );

        Ok(Transition::Started {
            difficulty: tier,
            password_length,
        })
    }

    /// Score a guess against the secret.
    ///
    /// The round fails without scoring if the timer or guess limit has
    /// already run out. A guess that uses up the last allowed attempt is
    /// still scored and recorded; a correct one wins.
    ///
    /// # Errors
    ///
    /// `LengthMismatch` if `text` is not as long as the secret (history is
    /// left untouched), or `InvalidState` outside `Playing`.
    pub fn submit_guess(&mut self, text: &str) -> Result<Transition, GameError> {
        self.require(GameState::Playing, "submit a guess")?;

        if let Some(reason) = self.check_limits() {
            return Ok(self.fail(reason));
        }

        let Some(secret) = self.active_secret.as_ref() else {
            return Err(self.invalid("submit a guess"));
        };

        let expected = secret.len();
        let actual = text.chars().count();
        if actual != expected {
            log::debug!("Rejected guess of length {actual}, expected {expected}");
            return Err(GameError::LengthMismatch { expected, actual });
        }

        let record = GuessRecord {
            guess: text.to_string(),
            feedback: scorer::score(&secret.password, text),
        };
        self.guess_history.push(record.clone());
        log::debug!(
            "Guess #{} scored {}",
            self.guess_history.len(),
            scorer::codes_to_string(&record.feedback)
        );

        if scorer::is_solved(&record.feedback) {
            self.state = GameState::Won;
            log::info!("Round won after {} guesses", self.guess_history.len());
            return Ok(Transition::Won(record));
        }

        if let Some(reason) = self.check_limits() {
            return Ok(self.fail(reason));
        }

        Ok(Transition::Scored(record))
    }

    /// Reveal the next hint, if any remain.
    ///
    /// # Errors
    ///
    /// `InvalidState` outside `Playing`.
    pub fn reveal_hint(&mut self) -> Result<Transition, GameError> {
        self.require(GameState::Playing, "reveal a hint")?;

        if self.timer_expired() {
            return Ok(self.fail(FailureReason::TimedOut));
        }

        let Some(hint) = self
            .active_secret
            .as_ref()
            .and_then(|s| s.hints.get(self.hint_cursor))
            .cloned()
        else {
            return Ok(Transition::HintsExhausted);
        };

        self.hint_cursor += 1;
        Ok(Transition::HintRevealed(hint))
    }

    /// Poll the round timer. Does nothing outside `Playing`.
    pub fn tick(&mut self) -> Transition {
        if self.state == GameState::Playing && self.timer_expired() {
            self.fail(FailureReason::TimedOut)
        } else {
            Transition::Unchanged
        }
    }

    /// Clear the finished round and go back to the menu.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless the round is won or failed.
    pub fn reset_to_menu(&mut self) -> Result<Transition, GameError> {
        if !self.state.is_finished() {
            return Err(self.invalid("return to the menu"));
        }

        self.state = GameState::Menu;
        self.active_secret = None;
        self.difficulty = None;
        self.guess_history.clear();
        self.hint_cursor = 0;
        self.timer_deadline = None;
        self.guess_limit = None;
        log::info!("Returned to menu");

        Ok(Transition::ReturnedToMenu)
    }

    /// Time left on the round timer, never negative.
    #[must_use]
    pub fn remaining_time(&self) -> Option<TimeDelta> {
        self.timer_deadline
            .map(|deadline| (deadline - self.clock.now()).max(TimeDelta::zero()))
    }

    #[must_use]
    pub fn remaining_guesses(&self) -> Option<usize> {
        self.guess_limit
            .map(|limit| limit.get().saturating_sub(self.guess_history.len()))
    }

    /// A random fact about the secret, while playing or after a win.
    pub fn random_fact<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if !matches!(self.state, GameState::Playing | GameState::Won) {
            return None;
        }
        self.active_secret
            .as_ref()
            .and_then(|s| s.facts.choose(rng))
            .map(String::as_str)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let hints = self
            .active_secret
            .as_ref()
            .map(|s| s.hints.iter().take(self.hint_cursor).cloned().collect())
            .unwrap_or_default();

        SessionSnapshot {
            state: self.state,
            difficulty: self.difficulty,
            password_length: self.active_secret.as_ref().map(SecretEntry::len),
            revealed_password: self
                .active_secret
                .as_ref()
                .filter(|_| self.state.is_finished())
                .map(|s| s.password.clone()),
            guesses: self.guess_history.clone(),
            hints,
            total_hints: self.active_secret.as_ref().map_or(0, |s| s.hints.len()),
            remaining_time: self.remaining_time(),
            remaining_guesses: self.remaining_guesses(),
        }
    }

    fn timer_expired(&self) -> bool {
        self.timer_deadline
            .is_some_and(|deadline| self.clock.now() >= deadline)
    }

    fn guesses_exhausted(&self) -> bool {
        self.guess_limit
            .is_some_and(|limit| self.guess_history.len() >= limit.get())
    }

    fn check_limits(&self) -> Option<FailureReason> {
        if self.timer_expired() {
            Some(FailureReason::TimedOut)
        } else if self.guesses_exhausted() {
            Some(FailureReason::OutOfGuesses)
        } else {
            None
        }
    }

    fn fail(&mut self, reason: FailureReason) -> Transition {
        self.state = GameState::Failed(reason);
        log::info!("Round failed: {reason}");
        Transition::Failed(reason)
    }

    fn require(&self, expected: GameState, operation: &'static str) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> GameError {
        log::debug!("Rejected '{operation}' while {}", self.state.name());
        GameError::InvalidState {
            operation,
            state: self.state.name(),
        }
    }
}
