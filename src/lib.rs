// Library interface for password-prowler
// This allows integration tests to access internal modules

pub mod catalog;
pub mod cli;
pub mod clock;
pub mod error;
pub mod game_state;
pub mod logging;
pub mod scorer;
pub mod session;
pub mod suggestion;
pub mod tui;

// Re-export commonly used items for easier testing
pub use catalog::{Catalog, Difficulty, PasswordCatalog, SecretEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CatalogError, GameError};
pub use game_state::{GameInterface, UserAction, game_loop};
pub use scorer::{FeedbackCode, is_solved, score};
pub use session::{
    FailureReason, GameSession, GameState, GuessRecord, Modifiers, SessionSnapshot, Transition,
};
pub use suggestion::{LocalAdvisor, PasswordAdvisor, Suggestion, SuggestionError};
