use crate::store::StoreError;
use crate::types::RevealState;

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors that can occur while setting up or running a session
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Word source unavailable: {0}")]
    WordSourceUnavailable(String),

    #[error("Persisted state is corrupt: {0}")]
    CorruptPersistedState(String),

    #[error("Cannot {action} while in state {state}")]
    InvalidTransition {
        state: RevealState,
        action: &'static str,
    },

    #[error("Player index {index} out of range for roster of {len}")]
    PlayerOutOfRange { index: usize, len: usize },

    #[error("No active session")]
    NoActiveSession,

    #[error("A game is already being started")]
    StartInFlight,

    #[error("Game start was cancelled")]
    StartCancelled,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl GameError {
    /// Stable machine-readable code, used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            GameError::WordSourceUnavailable(_) => "WORD_SOURCE_UNAVAILABLE",
            GameError::CorruptPersistedState(_) => "CORRUPT_STATE",
            GameError::InvalidTransition { .. } => "INVALID_TRANSITION",
            GameError::PlayerOutOfRange { .. } => "PLAYER_OUT_OF_RANGE",
            GameError::NoActiveSession => "NO_SESSION",
            GameError::StartInFlight => "START_IN_FLIGHT",
            GameError::StartCancelled => "START_CANCELLED",
            GameError::Storage(_) => "STORAGE",
        }
    }
}
