//! Players and tokens

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Offset, Pos};
use crate::error::ProtocolError;

/// Side identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    #[serde(rename = "Player 1", alias = "1", alias = "p1", alias = "player1")]
    One,
    #[serde(rename = "Player 2", alias = "2", alias = "p2", alias = "player2")]
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// 1 or 2
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub(crate) fn index(self) -> usize {
        self.number() as usize - 1
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

impl FromStr for Player {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "1" | "p1" | "player1" => Ok(Player::One),
            "2" | "p2" | "player2" => Ok(Player::Two),
            _ => Err(ProtocolError::UnknownPlayer(s.to_string())),
        }
    }
}

/// Token names double as protocol keys, so they cannot carry delimiters
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains([':', ';'])
}

/// A game piece; name and offsets are fixed, position follows the board
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    name: Arc<str>,
    pos: Pos,
    owner: Player,
    offsets: Arc<[Offset]>,
}

impl Token {
    pub fn new(
        name: impl Into<Arc<str>>,
        pos: Pos,
        owner: Player,
        offsets: impl Into<Arc<[Offset]>>,
    ) -> Self {
        Self {
            name: name.into(),
            pos,
            owner,
            offsets: offsets.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn x(&self) -> i8 {
        self.pos.x
    }

    pub fn y(&self) -> i8 {
        self.pos.y
    }

    pub fn owner(&self) -> Player {
        self.owner
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub(crate) fn set_pos(&mut self, pos: Pos) {
        self.pos = pos;
    }

    /// Cell reached through `offset`, if it is on the board and not held by
    /// one of our own tokens
    pub fn target(&self, board: &Board, offset: Offset) -> Option<Pos> {
        let to = self.pos.offset(offset)?;
        match board.token_at(to) {
            Some(occupant) if occupant.owner == self.owner => None,
            _ => Some(to),
        }
    }

    /// Legal targets in offset declaration order
    pub fn legal_moves(&self, board: &Board) -> Vec<Pos> {
        self.offsets
            .iter()
            .filter_map(|&offset| self.target(board, offset))
            .collect()
    }
}
