//! Engine - protocol façade over the live board
//!
//! Translates `name:x,y` moves and `;`-joined board states into board
//! operations, answers legal-move queries and runs the search for the
//! automated side. Search always runs on a private copy of the board.

use rustc_hash::FxHashMap;

use crate::ai::{AlphaBetaAI, SearchConfig, SearchResult};
use crate::board::{Board, Move, Offset, Pos};
use crate::error::{EngineError, Result};
use crate::eval::Heuristics;
use crate::protocol::{format_board_state, parse_board_state, MoveCommand};
use crate::token::{is_valid_name, Player, Token};

/// What happened to a submitted move
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was played; `captured` left the board
    Applied { mv: Move, captured: Option<Token> },
    /// No token of that name is on the board
    UnknownToken(String),
    /// The target is not among the token's legal moves
    Illegal { token: String, to: Pos },
    /// The token belongs to the side that is not to move
    WrongSide { token: String, owner: Player },
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied { .. })
    }
}

/// Session-level game engine
#[derive(Clone, Debug)]
pub struct Engine {
    board: Board,
    heuristics: Heuristics,
    search: SearchConfig,
}

impl Engine {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Register the full roster of both sides
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Result<Self> {
        let mut board = Board::new();

        for token in tokens {
            if !is_valid_name(token.name()) {
                return Err(EngineError::InvalidName(token.name().to_string()));
            }
            if board.contains(token.name()) {
                return Err(EngineError::DuplicateToken(token.name().to_string()));
            }
            let pos = token.pos();
            if !pos.is_valid() {
                return Err(EngineError::OutOfBounds {
                    token: token.name().to_string(),
                    pos,
                });
            }
            if let Some(occupant) = board.token_at(pos) {
                return Err(EngineError::OccupiedCell {
                    pos,
                    first: occupant.name().to_string(),
                    second: token.name().to_string(),
                });
            }
            board.place(token, pos);
        }

        tracing::debug!("Engine ready with {} tokens", board.len());

        Ok(Self {
            board,
            heuristics: Heuristics::default(),
            search: SearchConfig::default(),
        })
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Search settings; the depth is overridden per call
    pub fn with_search_config(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    pub fn token_player(&self, name: &str) -> Option<Player> {
        self.board.token(name).map(Token::owner)
    }

    pub fn token_position(&self, name: &str) -> Option<Pos> {
        self.board.token(name).map(Token::pos)
    }

    /// A side with no legal move has lost
    pub fn is_side_defeated(&self, player: Player) -> bool {
        !self.board.has_legal_move(player)
    }

    // ========================================================================
    // PROTOCOL INPUT
    // ========================================================================

    /// Apply a `name:x,y` move.
    ///
    /// Malformed text is an error. Unknown tokens and illegal targets are
    /// logged and reported through [`MoveOutcome`] without touching the board.
    pub fn handle_move(&mut self, input: &str) -> Result<MoveOutcome> {
        let command: MoveCommand = input.parse()?;
        Ok(self.apply_command(&command))
    }

    pub fn apply_command(&mut self, command: &MoveCommand) -> MoveOutcome {
        let Some(token) = self.board.token(&command.token) else {
            tracing::warn!("Token '{}' not found", command.token);
            return MoveOutcome::UnknownToken(command.token.clone());
        };

        if !token.legal_moves(&self.board).contains(&command.to) {
            tracing::warn!("Invalid move: {} cannot reach {}", command.token, command.to);
            return MoveOutcome::Illegal {
                token: command.token.clone(),
                to: command.to,
            };
        }

        let mv = Move::new(token, command.to);
        match self.board.apply_move(&mv) {
            Ok(captured) => {
                if let Some(victim) = &captured {
                    tracing::debug!("{} captured {} at {}", mv.token, victim.name(), mv.to);
                } else {
                    tracing::debug!("{} moved to {}", mv.token, mv.to);
                }
                MoveOutcome::Applied { mv, captured }
            }
            Err(e) => {
                tracing::warn!("Move {} rejected: {}", mv, e);
                MoveOutcome::Illegal {
                    token: command.token.clone(),
                    to: command.to,
                }
            }
        }
    }

    /// Resync the board from a `;`-joined list of `name:x,y` records.
    ///
    /// The whole state is validated before anything changes, and a token may
    /// be listed only once. Known tokens are relocated, unknown names become
    /// offset-less Player 1 tokens. Listed tokens are lifted before any is
    /// placed, so records may swap cells; a record landing on an unlisted
    /// token evicts it.
    pub fn handle_board_state(&mut self, state: &str) -> Result<()> {
        let records = parse_board_state(state)?;

        let mut lifted: FxHashMap<&str, Token> = FxHashMap::default();
        for record in &records {
            if let Some(token) = self.board.remove(&record.token) {
                lifted.insert(record.token.as_str(), token);
            }
        }

        for record in &records {
            let token = lifted.remove(record.token.as_str()).unwrap_or_else(|| {
                tracing::debug!("New token '{}' from board state", record.token);
                Token::new(record.token.as_str(), record.to, Player::One, Vec::<Offset>::new())
            });

            if let Some(evicted) = self.board.place(token, record.to) {
                tracing::debug!("{} evicted by board state at {}", evicted.name(), record.to);
            }
        }

        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Legal targets of a token, empty if unknown
    pub fn get_possible_moves(&self, name: &str) -> Vec<Pos> {
        self.board.legal_targets(name)
    }

    pub fn legal_moves_for(&self, player: Player) -> Vec<Move> {
        self.board.legal_moves_for(player)
    }

    /// Every occupied cell in scan order as `name:x,y;...`
    pub fn get_board_state(&self) -> String {
        format_board_state(self.board.tokens().map(|t| (t.name(), t.pos())))
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Search for `player`'s best move at `depth`
    pub fn best_move(&self, player: Player, depth: u32) -> SearchResult {
        let config = SearchConfig {
            depth,
            ..self.search.clone()
        };
        let ai = AlphaBetaAI::with_config(config, self.heuristics.clone());
        let working = self.board.deep_copy();
        ai.best_move(&working, player)
    }

    /// Best move in wire form, `None` if `player` cannot move
    pub fn get_best_move(&self, player: Player, depth: u32) -> Option<String> {
        let result = self.best_move(player, depth);
        if result.best.is_none() {
            tracing::info!("No legal moves found for {}", player);
        }
        result.best.map(|mv| mv.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;

    fn duel() -> Engine {
        Engine::new(vec![
            Token::new("hero", Pos::new(0, 0), Player::One, vec![(1, 0), (0, 1)]),
            Token::new("squire", Pos::new(0, 1), Player::One, vec![]),
            Token::new("villain", Pos::new(1, 0), Player::Two, vec![(-1, 0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_engine_rejects_bad_roster() {
        let dup = Engine::new(vec![
            Token::new("a", Pos::new(0, 0), Player::One, vec![]),
            Token::new("a", Pos::new(1, 0), Player::Two, vec![]),
        ]);
        assert_eq!(dup.err(), Some(EngineError::DuplicateToken("a".into())));

        let off = Engine::new(vec![Token::new("a", Pos::new(5, 0), Player::One, vec![])]);
        assert!(matches!(off, Err(EngineError::OutOfBounds { .. })));

        let shared = Engine::new(vec![
            Token::new("a", Pos::new(0, 0), Player::One, vec![]),
            Token::new("b", Pos::new(0, 0), Player::Two, vec![]),
        ]);
        assert!(matches!(shared, Err(EngineError::OccupiedCell { .. })));

        let bad_name = Engine::new(vec![Token::new("a;b", Pos::new(0, 0), Player::One, vec![])]);
        assert_eq!(bad_name.err(), Some(EngineError::InvalidName("a;b".into())));
    }

    #[test]
    fn test_handle_move_rejects_friendly_target() {
        let mut engine = duel();
        let before = engine.get_board_state();

        let outcome = engine.handle_move("hero:0,1").unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Illegal {
                token: "hero".into(),
                to: Pos::new(0, 1)
            }
        );
        assert_eq!(engine.get_board_state(), before);
    }

    #[test]
    fn test_handle_move_captures() {
        let mut engine = duel();
        let outcome = engine.handle_move("hero:1,0").unwrap();

        match outcome {
            MoveOutcome::Applied { captured: Some(victim), .. } => {
                assert_eq!(victim.name(), "villain")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(engine.token_position("villain"), None);
        assert_eq!(engine.token_position("hero"), Some(Pos::new(1, 0)));
        assert_eq!(engine.get_board_state(), "squire:0,1;hero:1,0");
    }

    #[test]
    fn test_handle_move_unknown_and_malformed() {
        let mut engine = duel();
        assert_eq!(
            engine.handle_move("ghost:1,1").unwrap(),
            MoveOutcome::UnknownToken("ghost".into())
        );
        assert!(engine.handle_move("hero").is_err());
        assert!(engine.handle_move("hero:one,1").is_err());
    }

    #[test]
    fn test_board_state_roundtrip() {
        let mut engine = duel();
        let state = engine.get_board_state();
        let before = engine.board().clone();

        engine.handle_board_state(&state).unwrap();
        assert_eq!(engine.get_board_state(), state);
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn test_board_state_relocates_and_creates() {
        let mut engine = duel();
        engine.handle_board_state("hero:0,1;squire:0,0;newcomer:4,4").unwrap();

        assert_eq!(engine.token_position("hero"), Some(Pos::new(0, 1)));
        assert_eq!(engine.token_position("squire"), Some(Pos::new(0, 0)));
        assert_eq!(engine.token_player("newcomer"), Some(Player::One));
        assert!(engine.get_possible_moves("newcomer").is_empty());
        // offsets survive the relocation
        assert_eq!(engine.get_possible_moves("hero"), vec![Pos::new(1, 1), Pos::new(0, 2)]);
    }

    #[test]
    fn test_board_state_is_atomic() {
        let mut engine = duel();
        let before = engine.get_board_state();
        assert!(engine.handle_board_state("hero:1,1;squire:9,9").is_err());
        assert!(engine.handle_board_state("hero:1,1;broken").is_err());
        assert_eq!(engine.get_board_state(), before);
    }

    #[test]
    fn test_board_state_rejects_repeated_token() {
        let mut engine = duel();
        let before = engine.get_board_state();

        // villain stands on 1,0; listing hero there first must not evict it
        assert_eq!(
            engine.handle_board_state("hero:1,0;hero:0,0"),
            Err(EngineError::Protocol(ProtocolError::DuplicateRecord("hero".into())))
        );
        assert_eq!(engine.token_position("villain"), Some(Pos::new(1, 0)));
        assert_eq!(engine.get_board_state(), before);
    }

    #[test]
    fn test_large_coordinates_are_off_board() {
        let mut engine = duel();
        let before = engine.get_board_state();

        assert_eq!(
            engine.handle_move("hero:9,9").unwrap(),
            MoveOutcome::Illegal {
                token: "hero".into(),
                to: Pos::new(9, 9)
            }
        );
        assert!(matches!(
            engine.handle_move("hero:200,0"),
            Ok(MoveOutcome::Illegal { ref token, .. }) if token == "hero"
        ));
        assert_eq!(
            engine.handle_board_state("hero:200,0"),
            Err(EngineError::Protocol(ProtocolError::OutOfBounds("hero:200,0".into())))
        );
        assert_eq!(engine.get_board_state(), before);
    }

    #[test]
    fn test_get_possible_moves() {
        let engine = duel();
        assert_eq!(engine.get_possible_moves("hero"), vec![Pos::new(1, 0)]);
        assert!(engine.get_possible_moves("nobody").is_empty());
    }

    #[test]
    fn test_get_best_move() {
        let engine = duel();
        let before = engine.get_board_state();
        assert_eq!(engine.get_best_move(Player::One, 2).as_deref(), Some("hero:1,0"));
        assert_eq!(engine.get_board_state(), before);

        let lone = Token::new("lone", Pos::new(0, 0), Player::One, vec![]);
        let stuck = Engine::new(vec![lone]).unwrap();
        assert_eq!(stuck.get_best_move(Player::One, 3), None);
        assert!(stuck.is_side_defeated(Player::One));
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }
}
