//! Error types

use thiserror::Error;

use crate::board::Pos;

/// Malformed wire-protocol input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("record '{0}' is missing the ':' separator")]
    MissingNameSeparator(String),

    #[error("record '{0}' has more than one ':' separator")]
    ExtraNameSeparator(String),

    #[error("record '{0}' has an empty token name")]
    EmptyName(String),

    #[error("record '{0}' must have exactly two coordinates")]
    CoordinateCount(String),

    #[error("record '{record}' has a non-numeric coordinate '{value}'")]
    InvalidCoordinate { record: String, value: String },

    #[error("record '{0}' is off the board")]
    OutOfBounds(String),

    #[error("token '{0}' is listed more than once")]
    DuplicateRecord(String),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),
}

/// Errors raised by the board, the engine and the turn controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("duplicate token name '{0}'")]
    DuplicateToken(String),

    #[error("invalid token name '{0}' (must be non-empty and free of ':' and ';')")]
    InvalidName(String),

    #[error("token '{0}' not found")]
    UnknownToken(String),

    #[error("token '{token}' at {pos} is off the board")]
    OutOfBounds { token: String, pos: Pos },

    #[error("cell {pos} is claimed by both '{first}' and '{second}'")]
    OccupiedCell { pos: Pos, first: String, second: String },

    #[error("token '{token}' does not stand on {pos}")]
    StaleMove { token: String, pos: Pos },

    #[error("the game is over")]
    GameOver,

    #[error("it is not a human player's turn")]
    NotHumanTurn,
}

/// Convenience Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
