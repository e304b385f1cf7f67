//! 5x5 board geometry and the token grid

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::eval::{self, Heuristics};
use crate::token::{Player, Token};

/// Board width and height
pub const BOARD_SIZE: i8 = 5;

const N: usize = BOARD_SIZE as usize;

/// Distance between tile centers in scene units
pub const WORLD_TILE_SPACING: f32 = 1.6;

/// Relative displacement (dx, dy)
pub type Offset = (i8, i8);

/// Board coordinates: x is the column, y the row (row 0 at the top)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i8,
    pub y: i8,
}

impl Pos {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Check if this position is on the board
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.x) && (0..BOARD_SIZE).contains(&self.y)
    }

    /// Displace by an offset, `None` if the result leaves the board
    pub fn offset(&self, (dx, dy): Offset) -> Option<Pos> {
        let target = Pos::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?);
        target.is_valid().then_some(target)
    }

    /// Convert a scene position into board coordinates.
    ///
    /// The grid is centered on the origin with `spacing` between tile
    /// centers; scene y points up while board rows count down from the top.
    pub fn from_world(x: f32, y: f32, spacing: f32) -> Option<Pos> {
        let half_extent = (BOARD_SIZE - 1) as f32 * spacing / 2.0;
        let column = ((x + half_extent) / spacing).round();
        let row = ((half_extent - y) / spacing).round();

        if !(0.0..BOARD_SIZE as f32).contains(&column) || !(0.0..BOARD_SIZE as f32).contains(&row) {
            return None;
        }
        Some(Pos::new(column as i8, row as i8))
    }

    fn cell(&self) -> (usize, usize) {
        (self.x as usize, self.y as usize)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A legal move: the named token steps from `from` to `to`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub token: Arc<str>,
    pub from: Pos,
    pub to: Pos,
}

impl Move {
    pub fn new(token: &Token, to: Pos) -> Self {
        Self {
            token: token.name_arc(),
            from: token.pos(),
            to,
        }
    }
}

/// Wire form `name:x,y`
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.token, self.to)
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Token grid plus a name index mirroring it (clone to copy)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    /// cells[x][y]
    cells: [[Option<Token>; N]; N],
    index: FxHashMap<Arc<str>, Pos>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds check on raw coordinates
    pub fn is_position_valid(x: i32, y: i32) -> bool {
        (0..BOARD_SIZE as i32).contains(&x) && (0..BOARD_SIZE as i32).contains(&y)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn token_at(&self, pos: Pos) -> Option<&Token> {
        if !pos.is_valid() {
            return None;
        }
        let (x, y) = pos.cell();
        self.cells[x][y].as_ref()
    }

    pub fn token(&self, name: &str) -> Option<&Token> {
        self.index.get(name).and_then(|&pos| self.token_at(pos))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Tokens in scan order: x ascending, then y ascending
    pub fn tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.cells.iter().flat_map(|column| column.iter().flatten())
    }

    pub fn token_count(&self, player: Player) -> usize {
        self.tokens().filter(|t| t.owner() == player).count()
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Put `token` on `pos`, overwriting the cell.
    ///
    /// Returns the evicted occupant, which leaves the name index. A token of
    /// the same name standing elsewhere is lifted from its old cell first.
    pub fn place(&mut self, mut token: Token, pos: Pos) -> Option<Token> {
        debug_assert!(pos.is_valid(), "place outside the board: {pos}");

        let name = token.name_arc();
        if let Some(old) = self.index.get(&name).copied() {
            if old != pos {
                self.cell_mut(old).take();
            }
        }

        token.set_pos(pos);
        self.index.insert(Arc::clone(&name), pos);

        match self.cell_mut(pos).replace(token) {
            Some(prev) if prev.name() != &*name => {
                self.index.remove(prev.name());
                Some(prev)
            }
            _ => None,
        }
    }

    /// Move the named token to `to`, capturing whatever stands there
    pub fn move_token(&mut self, name: &str, to: Pos) -> Result<Option<Token>> {
        let from = *self
            .index
            .get(name)
            .ok_or_else(|| EngineError::UnknownToken(name.to_string()))?;
        if !to.is_valid() {
            return Err(EngineError::OutOfBounds {
                token: name.to_string(),
                pos: to,
            });
        }
        Ok(self.relocate(from, to))
    }

    /// Apply a generated move; fails if the move does not match this board
    pub fn apply_move(&mut self, mv: &Move) -> Result<Option<Token>> {
        match self.token_at(mv.from) {
            Some(token) if token.name() == &*mv.token => {}
            _ => {
                return Err(EngineError::StaleMove {
                    token: mv.token.to_string(),
                    pos: mv.from,
                })
            }
        }
        if !mv.to.is_valid() {
            return Err(EngineError::OutOfBounds {
                token: mv.token.to_string(),
                pos: mv.to,
            });
        }
        Ok(self.relocate(mv.from, mv.to))
    }

    /// Take a token off the board
    pub fn remove(&mut self, name: &str) -> Option<Token> {
        let pos = self.index.remove(name)?;
        self.cell_mut(pos).take()
    }

    fn relocate(&mut self, from: Pos, to: Pos) -> Option<Token> {
        let token = self.cell_mut(from).take()?;
        self.place(token, to)
    }

    fn cell_mut(&mut self, pos: Pos) -> &mut Option<Token> {
        let (x, y) = pos.cell();
        &mut self.cells[x][y]
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// All legal moves of `player`, in scan order then offset order
    pub fn legal_moves_for(&self, player: Player) -> Vec<Move> {
        let mut moves = Vec::new();
        for token in self.tokens().filter(|t| t.owner() == player) {
            for to in token.legal_moves(self) {
                moves.push(Move::new(token, to));
            }
        }
        moves
    }

    /// Legal targets of one token, empty if it is not on the board
    pub fn legal_targets(&self, name: &str) -> Vec<Pos> {
        self.token(name)
            .map(|token| token.legal_moves(self))
            .unwrap_or_default()
    }

    pub fn has_legal_move(&self, player: Player) -> bool {
        self.tokens()
            .filter(|t| t.owner() == player)
            .any(|t| t.offsets().iter().any(|&o| t.target(self, o).is_some()))
    }

    /// Independent copy for speculative search
    pub fn deep_copy(&self) -> Board {
        self.clone()
    }

    /// Static score from `player`'s perspective
    pub fn evaluate(&self, player: Player, heuristics: &Heuristics) -> i32 {
        eval::evaluate(self, player, heuristics)
    }
}

/// Grid render, one row per line: `1F` is Player 1's token starting with F
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..BOARD_SIZE {
            let row: Vec<String> = (0..BOARD_SIZE)
                .map(|x| match self.token_at(Pos::new(x, y)) {
                    Some(t) => format!(
                        "{}{}",
                        t.owner().number(),
                        t.name().chars().next().unwrap_or('?')
                    ),
                    None => " .".to_string(),
                })
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
