//! CPU-based minimax AI with alpha-beta pruning

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::board::{Board, Move};
use crate::eval::{evaluate, Heuristics, WIN_VALUE};
use crate::token::Player;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Search settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Plies to search
    pub depth: u32,
    /// Treat a side with no legal moves as having lost
    pub game_over_detection: bool,
    /// Stop expanding nodes after this many milliseconds
    pub time_limit_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            game_over_detection: true,
            time_limit_ms: None,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Depth cutoff only, no terminal positions
    pub fn without_game_over_detection(mut self) -> Self {
        self.game_over_detection = false;
        self
    }
}

/// Outcome of a root search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` when the side has no legal move
    pub best: Option<Move>,
    pub score: i32,
    /// Nodes visited below the root
    pub nodes: u64,
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
#[derive(Clone, Debug, Default)]
pub struct AlphaBetaAI {
    pub config: SearchConfig,
    pub heuristics: Heuristics,
}

impl AlphaBetaAI {
    pub fn new(depth: u32, heuristics: Heuristics) -> Self {
        Self {
            config: SearchConfig::with_depth(depth),
            heuristics,
        }
    }

    pub fn with_config(config: SearchConfig, heuristics: Heuristics) -> Self {
        Self { config, heuristics }
    }

    /// Pick the best move for `player`.
    ///
    /// Moves are tried in enumeration order and a later move must score
    /// strictly higher to replace the current best, so ties go to the
    /// earliest move. The board is never modified.
    pub fn best_move(&self, board: &Board, player: Player) -> SearchResult {
        let mut search = Search::new(self, self.config.time_limit_ms);
        let child_depth = self.config.depth.saturating_sub(1);

        let mut alpha = i32::MIN;
        let beta = i32::MAX;
        let mut best = None;

        for mv in board.legal_moves_for(player) {
            if best.is_some() && search.expired() {
                break;
            }
            let Some(child) = child_board(board, &mv) else {
                continue;
            };

            let value = search.minimax(&child, player.opponent(), child_depth, alpha, beta, false);
            if best.is_none() || value > alpha {
                alpha = value;
                best = Some(mv);
            }
        }

        let score = if best.is_some() {
            alpha
        } else {
            evaluate(board, player, &self.heuristics)
        };

        tracing::debug!(
            "{} depth {}: best={:?} score={} nodes={}",
            player,
            self.config.depth,
            best.as_ref().map(|m: &Move| m.to_string()),
            score,
            search.nodes
        );

        SearchResult {
            best,
            score,
            nodes: search.nodes,
        }
    }

    /// Minimax value of `board` with `player` to move.
    ///
    /// Scores are from the perspective of the maximizing side: `player` when
    /// `maximizing`, otherwise its opponent.
    pub fn minimax(
        &self,
        board: &Board,
        player: Player,
        depth: u32,
        alpha: i32,
        beta: i32,
        maximizing: bool,
    ) -> i32 {
        Search::new(self, None).minimax(board, player, depth, alpha, beta, maximizing)
    }

    /// Evaluate a position
    pub fn evaluate(&self, board: &Board, player: Player) -> i32 {
        evaluate(board, player, &self.heuristics)
    }
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

struct Search<'a> {
    heuristics: &'a Heuristics,
    game_over_detection: bool,
    deadline: Option<Instant>,
    nodes: u64,
}

impl<'a> Search<'a> {
    fn new(ai: &'a AlphaBetaAI, time_limit_ms: Option<u64>) -> Self {
        Self {
            heuristics: &ai.heuristics,
            game_over_detection: ai.config.game_over_detection,
            deadline: time_limit_ms.map(|ms| Instant::now() + Duration::from_millis(ms)),
            nodes: 0,
        }
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    fn minimax(
        &mut self,
        board: &Board,
        active: Player,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;
        let perspective = if maximizing { active } else { active.opponent() };

        if depth == 0 || self.expired() {
            return evaluate(board, perspective, self.heuristics);
        }

        let moves = board.legal_moves_for(active);
        if moves.is_empty() {
            if !self.game_over_detection {
                return evaluate(board, perspective, self.heuristics);
            }
            // Side to move is stuck and loses; sooner losses score lower
            let loss = WIN_VALUE + depth.min(1_000) as i32;
            return if maximizing { -loss } else { loss };
        }

        if maximizing {
            let mut max_eval = i32::MIN;
            for mv in &moves {
                let Some(child) = child_board(board, mv) else {
                    continue;
                };
                let eval = self.minimax(&child, active.opponent(), depth - 1, alpha, beta, false);
                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break;
                }
            }
            max_eval
        } else {
            let mut min_eval = i32::MAX;
            for mv in &moves {
                let Some(child) = child_board(board, mv) else {
                    continue;
                };
                let eval = self.minimax(&child, active.opponent(), depth - 1, alpha, beta, true);
                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break;
                }
            }
            min_eval
        }
    }
}

fn child_board(board: &Board, mv: &Move) -> Option<Board> {
    let mut child = board.deep_copy();
    child.apply_move(mv).ok()?;
    Some(child)
}

// ============================================================================
// TESTS
// ============================================================================
