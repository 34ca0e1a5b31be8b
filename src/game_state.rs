use crate::catalog::{Difficulty, PasswordCatalog};
use crate::clock::Clock;
use crate::error::GameError;
use crate::session::{GameSession, SessionSnapshot, Transition};
use crate::suggestion::{PasswordAdvisor, Suggestion, SuggestionError};
use crate::{debug_log, info_log};
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SelectDifficulty(Difficulty),
    Guess(String),
    Hint,
    Fact,
    PlayAgain,
    Suggest(String),
    Exit,
}

/// Presentation surface driven by [`game_loop`].
///
/// The loop never renders by itself: it hands the interface a snapshot after
/// every transition and asks it for the next action.
pub trait GameInterface {
    fn render(&mut self, snapshot: &SessionSnapshot);

    /// Next player action, or `None` if there is nothing to act on yet
    /// (unrecognised input, or a poll that timed out).
    fn next_action(&mut self, snapshot: &SessionSnapshot) -> Option<UserAction>;

    fn report_transition(&mut self, transition: &Transition);

    fn report_error(&mut self, error: &GameError);

    /// `None` when no fact is available: no round in progress or won, or the
    /// secret has no facts.
    fn show_fact(&mut self, fact: Option<&str>);

    fn show_suggestion(&mut self, result: &Result<Suggestion, SuggestionError>);

    fn display_exit_message(&mut self);
}

/// Run the game until the player exits.
pub fn game_loop<C, P, A, R, I>(
    session: &mut GameSession<C>,
    catalog: &mut P,
    advisor: &A,
    rng: &mut R,
    interface: &mut I,
) where
    C: Clock,
    P: PasswordCatalog + ?Sized,
    A: PasswordAdvisor + ?Sized,
    R: Rng + ?Sized,
    I: GameInterface + ?Sized,
{
    interface.render(&session.snapshot());

    loop {
        let expired = session.tick();
        if expired != Transition::Unchanged {
            interface.report_transition(&expired);
            interface.render(&session.snapshot());
        }

        let Some(action) = interface.next_action(&session.snapshot()) else {
            continue;
        };
        info_log!("game_loop() - Action received: {:?}", action);

        let outcome = match action {
            UserAction::Exit => {
                interface.display_exit_message();
                break;
            }
            UserAction::Fact => {
                interface.show_fact(session.random_fact(rng));
                continue;
            }
            UserAction::Suggest(password) => {
                interface.show_suggestion(&advisor.suggest(&password));
                continue;
            }
            UserAction::SelectDifficulty(tier) => session.select_difficulty(catalog, tier),
            UserAction::Guess(text) => session.submit_guess(&text),
            UserAction::Hint => session.reveal_hint(),
            UserAction::PlayAgain => session.reset_to_menu(),
        };

        match outcome {
            Ok(transition) => {
                debug_log!("game_loop() - Transition: {:?}", transition);
                interface.report_transition(&transition);
                if matches!(transition, Transition::Won(_)) {
                    interface.show_fact(session.random_fact(rng));
                }
            }
            Err(e) => {
                debug_log!("game_loop() - Rejected: {}", e);
                interface.report_error(&e);
            }
        }

        interface.render(&session.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, SecretEntry};
    use crate::clock::ManualClock;
    use crate::session::{FailureReason, GameState, Modifiers};
    use crate::suggestion::LocalAdvisor;
    use chrono::TimeDelta;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;
    use std::num::NonZeroUsize;

    /// Feeds a fixed list of actions and records everything it is shown.
    #[derive(Default)]
    struct ScriptedInterface {
        actions: VecDeque<UserAction>,
        transitions: Vec<Transition>,
        errors: Vec<String>,
        facts: Vec<Option<String>>,
        suggestions: Vec<Result<Suggestion, SuggestionError>>,
        renders: Vec<SessionSnapshot>,
        exited: bool,
    }

    impl ScriptedInterface {
        fn new(actions: Vec<UserAction>) -> Self {
            Self {
                actions: actions.into(),
                ..Self::default()
            }
        }
    }

    impl GameInterface for ScriptedInterface {
        fn render(&mut self, snapshot: &SessionSnapshot) {
            self.renders.push(snapshot.clone());
        }

        fn next_action(&mut self, _snapshot: &SessionSnapshot) -> Option<UserAction> {
            Some(self.actions.pop_front().unwrap_or(UserAction::Exit))
        }

        fn report_transition(&mut self, transition: &Transition) {
            self.transitions.push(transition.clone());
        }

        fn report_error(&mut self, error: &GameError) {
            self.errors.push(error.to_string());
        }

        fn show_fact(&mut self, fact: Option<&str>) {
            self.facts.push(fact.map(str::to_string));
        }

        fn show_suggestion(&mut self, result: &Result<Suggestion, SuggestionError>) {
            self.suggestions.push(result.clone());
        }

        fn display_exit_message(&mut self) {
            self.exited = true;
        }
    }

    fn catalog() -> Catalog<StdRng> {
        Catalog::with_rng(
            vec![SecretEntry {
                password: "Abc1".to_string(),
                difficulty: Difficulty::Medium,
                hints: vec!["a hint".to_string()],
                facts: vec!["a fact".to_string()],
            }],
            StdRng::seed_from_u64(5),
        )
    }

    fn run(session: &mut GameSession<ManualClock>, actions: Vec<UserAction>) -> ScriptedInterface {
        let mut interface = ScriptedInterface::new(actions);
        let mut rng = StdRng::seed_from_u64(11);
        game_loop(session, &mut catalog(), &LocalAdvisor, &mut rng, &mut interface);
        interface
    }

    #[test]
    fn test_immediate_exit() {
        let mut session = GameSession::with_clock(Modifiers::default(), ManualClock::default());
        let interface = run(&mut session, vec![UserAction::Exit]);
        assert!(interface.exited);
        assert!(interface.transitions.is_empty());
        assert_eq!(interface.renders.len(), 1);
    }

    #[test]
    fn test_full_round_win_shows_fact() {
        let mut session = GameSession::with_clock(Modifiers::default(), ManualClock::default());
        let interface = run(
            &mut session,
            vec![
                UserAction::SelectDifficulty(Difficulty::Medium),
                UserAction::Hint,
                UserAction::Guess("abc1".to_string()),
                UserAction::Guess("Abc1".to_string()),
            ],
        );

        assert_eq!(session.state(), GameState::Won);
        assert_eq!(interface.transitions.len(), 4);
        assert_eq!(
            interface.transitions[1],
            Transition::HintRevealed("a hint".to_string())
        );
        assert!(matches!(interface.transitions[3], Transition::Won(_)));
        assert_eq!(interface.facts, vec![Some("a fact".to_string())]);
        assert_eq!(
            interface.renders.last().unwrap().revealed_password.as_deref(),
            Some("Abc1")
        );
    }

    #[test]
    fn test_errors_are_reported_not_fatal() {
        let mut session = GameSession::with_clock(Modifiers::default(), ManualClock::default());
        let interface = run(
            &mut session,
            vec![
                UserAction::Guess("too early".to_string()),
                UserAction::SelectDifficulty(Difficulty::Easy),
                UserAction::SelectDifficulty(Difficulty::Medium),
                UserAction::Guess("short".to_string()),
                UserAction::PlayAgain,
            ],
        );

        assert_eq!(interface.errors.len(), 4);
        assert!(interface.errors[1].contains("Easy"));
        assert!(interface.errors[2].contains("4 characters"));
        assert_eq!(session.state(), GameState::Playing);
        assert!(session.guess_history().is_empty());
    }

    #[test]
    fn test_fact_on_demand_during_round() {
        let mut session = GameSession::with_clock(Modifiers::default(), ManualClock::default());
        let interface = run(
            &mut session,
            vec![
                UserAction::Fact,
                UserAction::SelectDifficulty(Difficulty::Medium),
                UserAction::Fact,
            ],
        );
        assert_eq!(interface.facts, vec![None, Some("a fact".to_string())]);
        assert_eq!(session.state(), GameState::Playing);
        assert!(session.guess_history().is_empty());
    }

    #[test]
    fn test_suggestion_is_independent_of_session() {
        let mut session = GameSession::with_clock(Modifiers::default(), ManualClock::default());
        let interface = run(
            &mut session,
            vec![
                UserAction::Suggest("qwerty".to_string()),
                UserAction::Suggest(String::new()),
            ],
        );
        assert!(interface.suggestions[0].is_ok());
        assert_eq!(interface.suggestions[1], Err(SuggestionError::EmptyPassword));
        assert_eq!(session.state(), GameState::Menu);
    }

    #[test]
    fn test_play_again_after_guess_limit() {
        let modifiers = Modifiers::default().with_guess_limit(NonZeroUsize::new(1).unwrap());
        let mut session = GameSession::with_clock(modifiers, ManualClock::default());
        let interface = run(
            &mut session,
            vec![
                UserAction::SelectDifficulty(Difficulty::Medium),
                UserAction::Guess("zzzz".to_string()),
                UserAction::PlayAgain,
            ],
        );
        assert_eq!(
            interface.transitions[1],
            Transition::Failed(FailureReason::OutOfGuesses)
        );
        assert_eq!(interface.transitions[2], Transition::ReturnedToMenu);
        assert_eq!(session.state(), GameState::Menu);
    }

    #[test]
    fn test_loop_ticks_expired_timer() {
        let clock = ManualClock::default();
        let modifiers = Modifiers::default().with_timer(TimeDelta::seconds(30));
        let mut session = GameSession::with_clock(modifiers, clock.clone());
        session
            .select_difficulty(&mut catalog(), Difficulty::Medium)
            .unwrap();
        clock.advance(TimeDelta::seconds(31));

        let interface = run(&mut session, vec![UserAction::Exit]);
        assert_eq!(
            interface.transitions,
            vec![Transition::Failed(FailureReason::TimedOut)]
        );
        assert_eq!(session.state(), GameState::Failed(FailureReason::TimedOut));
    }
}
