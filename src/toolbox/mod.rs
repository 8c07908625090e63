//! Small standalone utilities
//!
//! Pure logic behind the hobby tools: a Caesar cipher, color conversion,
//! a true/false quiz, flash cards, a Pomodoro schedule and a Snakes &
//! Ladders board. Drawing and windowing are left to the caller.

pub mod caesar;
pub mod color;
pub mod quiz;
pub mod flashcards;
pub mod pomodoro;
pub mod ladders;

use thiserror::Error;

/// Errors raised by the toolbox utilities
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// Color string could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Deck or question list has nothing left
    #[error("Nothing left: {0}")]
    Exhausted(String),

    /// Game rule violated
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    /// JSON data could not be read or written
    #[error("Data error: {0}")]
    DataError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for toolbox operations
pub type Result<T> = std::result::Result<T, ToolboxError>;
