//! Turn controller
//!
//! Owns the engine for one game and alternates the sides in a fixed order:
//! the side to move either submits a move (human) or has one searched for
//! it (engine). A side that cannot move has lost.

use serde::{Deserialize, Serialize};

use crate::board::Move;
use crate::engine::{Engine, MoveOutcome};
use crate::error::{EngineError, Result};
use crate::protocol::MoveCommand;
use crate::token::Player;

/// Turn limit applied unless overridden
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// Who decides a side's moves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Engine { depth: u32 },
}

/// Game status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing { to_move: Player },
    Won { winner: Player },
    Draw,
}

/// One applied move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnRecord {
    pub turn: u32,
    pub player: Player,
    pub mv: Move,
    pub captured: Option<String>,
}

/// A game in progress
#[derive(Clone, Debug)]
pub struct GameSession {
    engine: Engine,
    to_move: Player,
    controllers: [Controller; 2],
    turn: u32,
    max_turns: Option<u32>,
    history: Vec<TurnRecord>,
}

impl GameSession {
    /// `controllers` is indexed by side: `[Player 1, Player 2]`
    pub fn new(engine: Engine, first: Player, controllers: [Controller; 2]) -> Self {
        Self {
            engine,
            to_move: first,
            controllers,
            turn: 0,
            max_turns: Some(DEFAULT_MAX_TURNS),
            history: Vec::new(),
        }
    }

    /// `None` removes the limit; two engines may then play forever
    pub fn with_max_turns(mut self, max_turns: Option<u32>) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Moves applied so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    pub fn controller(&self, player: Player) -> Controller {
        self.controllers[player.index()]
    }

    pub fn status(&self) -> GameStatus {
        if self.engine.is_side_defeated(self.to_move) {
            GameStatus::Won {
                winner: self.to_move.opponent(),
            }
        } else if self.max_turns.is_some_and(|max| self.turn >= max) {
            GameStatus::Draw
        } else {
            GameStatus::Ongoing {
                to_move: self.to_move,
            }
        }
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    /// Submit a human move in wire form
    pub fn submit(&mut self, input: &str) -> Result<MoveOutcome> {
        self.ensure_ongoing()?;
        if self.controller(self.to_move) != Controller::Human {
            return Err(EngineError::NotHumanTurn);
        }

        let command: MoveCommand = input.parse()?;
        if let Some(owner) = self.engine.token_player(&command.token) {
            if owner != self.to_move {
                tracing::warn!(
                    "{} tried to move {}'s token {}",
                    self.to_move,
                    owner,
                    command.token
                );
                return Ok(MoveOutcome::WrongSide {
                    token: command.token,
                    owner,
                });
            }
        }

        let outcome = self.engine.apply_command(&command);
        self.record(&outcome);
        Ok(outcome)
    }

    /// Let the engine move for the side to move.
    ///
    /// Human sides get the engine's configured depth, which makes this
    /// usable as a hint-and-play.
    pub fn play_engine_turn(&mut self) -> Result<MoveOutcome> {
        self.ensure_ongoing()?;
        let depth = match self.controller(self.to_move) {
            Controller::Engine { depth } => depth,
            Controller::Human => self.engine.search_config().depth,
        };

        let result = self.engine.best_move(self.to_move, depth);
        let mv = result.best.ok_or(EngineError::GameOver)?;
        tracing::debug!(
            "{} plays {} (score {}, {} nodes)",
            self.to_move,
            mv,
            result.score,
            result.nodes
        );

        let outcome = self
            .engine
            .apply_command(&MoveCommand::new(mv.token.to_string(), mv.to));
        self.record(&outcome);
        Ok(outcome)
    }

    /// Play engine turns until a human must move or the game ends
    pub fn run_until_human(&mut self) -> Result<GameStatus> {
        loop {
            match self.status() {
                GameStatus::Ongoing { to_move }
                    if self.controller(to_move) != Controller::Human =>
                {
                    self.play_engine_turn()?;
                }
                status => return Ok(status),
            }
        }
    }

    fn ensure_ongoing(&self) -> Result<()> {
        match self.status() {
            GameStatus::Ongoing { .. } => Ok(()),
            _ => Err(EngineError::GameOver),
        }
    }

    fn record(&mut self, outcome: &MoveOutcome) {
        if let MoveOutcome::Applied { mv, captured } = outcome {
            self.turn += 1;
            self.history.push(TurnRecord {
                turn: self.turn,
                player: self.to_move,
                mv: mv.clone(),
                captured: captured.as_ref().map(|t| t.name().to_string()),
            });
            self.to_move = self.to_move.opponent();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;
    use crate::roster::Roster;
    use crate::token::Token;

    const HUMANS: [Controller; 2] = [Controller::Human, Controller::Human];
    const ENGINE_VS_HUMAN: [Controller; 2] = [Controller::Engine { depth: 2 }, Controller::Human];

    fn endgame() -> Engine {
        Engine::new(vec![
            Token::new("hunter", Pos::new(0, 0), Player::One, vec![(1, 0), (0, 1)]),
            Token::new("last", Pos::new(1, 0), Player::Two, vec![(0, 1)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_human_move_then_win() {
        let mut session = GameSession::new(endgame(), Player::One, HUMANS);
        assert_eq!(session.status(), GameStatus::Ongoing { to_move: Player::One });

        let outcome = session.submit("hunter:1,0").unwrap();
        assert!(outcome.is_applied());
        assert_eq!(session.turn(), 1);
        assert_eq!(session.history()[0].captured.as_deref(), Some("last"));
        assert_eq!(session.status(), GameStatus::Won { winner: Player::One });
        assert_eq!(session.submit("hunter:1,1"), Err(EngineError::GameOver));
    }

    #[test]
    fn test_wrong_side_rejected() {
        let mut session = GameSession::new(endgame(), Player::One, HUMANS);
        let outcome = session.submit("last:1,1").unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::WrongSide {
                token: "last".into(),
                owner: Player::Two
            }
        );
        assert_eq!(session.to_move(), Player::One);
        assert_eq!(session.turn(), 0);
    }

    #[test]
    fn test_illegal_move_keeps_turn() {
        let mut session = GameSession::new(endgame(), Player::One, HUMANS);
        let outcome = session.submit("hunter:3,3").unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(session.to_move(), Player::One);
        assert!(session.submit("garbage").is_err());
    }

    #[test]
    fn test_not_human_turn() {
        let mut session = GameSession::new(endgame(), Player::One, ENGINE_VS_HUMAN);
        assert_eq!(session.submit("hunter:1,0"), Err(EngineError::NotHumanTurn));
    }

    #[test]
    fn test_engine_finds_win() {
        let mut session = GameSession::new(endgame(), Player::One, ENGINE_VS_HUMAN);
        let status = session.run_until_human().unwrap();
        assert_eq!(status, GameStatus::Won { winner: Player::One });
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_run_until_human_stops_for_human() {
        let engine = Roster::default().to_engine().unwrap();
        let controllers = [Controller::Engine { depth: 1 }, Controller::Human];
        let mut session = GameSession::new(engine, Player::One, controllers);
        let status = session.run_until_human().unwrap();
        assert_eq!(status, GameStatus::Ongoing { to_move: Player::Two });
        assert_eq!(session.turn(), 1);
    }

    #[test]
    fn test_self_play_terminates() {
        let engine = Roster::default().to_engine().unwrap();
        let mut session = GameSession::new(
            engine,
            Player::One,
            [Controller::Engine { depth: 2 }, Controller::Engine { depth: 1 }],
        )
        .with_max_turns(Some(30));

        let status = session.run_until_human().unwrap();
        assert!(matches!(status, GameStatus::Won { .. } | GameStatus::Draw));
        assert!(session.turn() <= 30);
        for (i, record) in session.history().iter().enumerate() {
            assert_eq!(record.turn as usize, i + 1);
        }
    }
}
