//! TILEWAR Core - Game engine and AI
//!
//! This crate provides the core game logic for TILEWAR:
//! - Board geometry (5x5 grid, offset-based movement)
//! - Tokens and legal move generation
//! - Plain-text move / board-state protocol
//! - Position evaluation with configurable weights
//! - CPU-based minimax AI with alpha-beta pruning
//! - Rosters and a turn controller for whole games

pub mod board;
pub mod token;
pub mod error;
pub mod protocol;
pub mod eval;
pub mod ai;
pub mod engine;
pub mod roster;
pub mod session;

// Re-exports for convenient access
pub use board::{Board, Move, Offset, Pos, BOARD_SIZE};
pub use token::{Player, Token};
pub use error::{EngineError, ProtocolError, Result};
pub use protocol::MoveCommand;
pub use eval::{evaluate, Heuristics, WIN_VALUE};
pub use ai::{AlphaBetaAI, SearchConfig, SearchResult};
pub use engine::{Engine, MoveOutcome};
pub use roster::{Roster, TokenSpec, ARCHETYPES};
pub use session::{Controller, GameSession, GameStatus, TurnRecord};
