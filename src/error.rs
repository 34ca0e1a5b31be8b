use crate::catalog::Difficulty;
use std::io;
use thiserror::Error;

/// Failures while loading a password catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog entry {index} has an empty password")]
    EmptyPassword { index: usize },
}

/// Errors reported by game session operations. All of them are recoverable.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no passwords available for {0} difficulty")]
    NoEntriesAvailable(Difficulty),

    #[error("guess must be {expected} characters long (got {actual})")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("could not load passwords: {0}")]
    CatalogLoadFailure(#[from] CatalogError),

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}
