//! Roster - starting tokens of both sides

use std::path::Path;

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Offset, Pos, BOARD_SIZE};
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::format_board_state;
use crate::token::{Player, Token};

/// A token kind and its movement, written for Player 1 (forward is -y)
#[derive(Clone, Debug)]
pub struct Archetype {
    pub kind: &'static str,
    pub offsets: &'static [Offset],
}

const NEIGHBORS: &[Offset] = &[
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// All 12 elemental token kinds
pub static ARCHETYPES: [Archetype; 12] = [
    Archetype { kind: "Fire Token Variant", offsets: &[(0, -1), (-1, -1), (1, -1)] },
    Archetype { kind: "Ice Token Variant", offsets: &[(-1, -1), (1, -1), (-1, 1), (1, 1)] },
    Archetype { kind: "Water Token Variant", offsets: &[(0, -1), (1, 0), (0, 1), (-1, 0)] },
    Archetype { kind: "Earth Token Variant", offsets: &[(0, -1), (0, -2), (0, 1)] },
    Archetype { kind: "Land Storm Token Variant", offsets: &[(0, -2), (-2, 0), (2, 0)] },
    Archetype {
        kind: "Electricity Token Variant",
        offsets: &[(-1, -2), (1, -2), (-2, -1), (2, -1)],
    },
    Archetype { kind: "Wind Token Variant", offsets: &[(-1, 0), (1, 0), (-2, 0), (2, 0), (0, -1)] },
    Archetype { kind: "Plant Token Variant", offsets: &[(0, -1), (-1, 1), (1, 1)] },
    Archetype { kind: "Sea Storm Token Variant", offsets: &[(-1, -1), (1, -1), (-2, -2), (2, -2)] },
    Archetype { kind: "Poison Token Variant", offsets: &[(-1, -1), (1, -1), (0, 1)] },
    Archetype { kind: "Light Token Variant", offsets: NEIGHBORS },
    Archetype {
        kind: "Dark Token Variant",
        offsets: &[
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
            (0, -2),
        ],
    },
];

/// Look up an archetype by kind name
pub fn archetype(kind: &str) -> Option<&'static Archetype> {
    ARCHETYPES.iter().find(|a| a.kind == kind)
}

/// Home cells two rows deep, center first: Player 1 at the bottom
fn home_cells(player: Player) -> Vec<Pos> {
    const COLUMN_ORDER: [i8; 5] = [2, 1, 3, 0, 4];
    let rows: [i8; 2] = match player {
        Player::One => [BOARD_SIZE - 1, BOARD_SIZE - 2],
        Player::Two => [0, 1],
    };
    rows.iter()
        .flat_map(|&y| COLUMN_ORDER.iter().map(move |&x| Pos::new(x, y)))
        .collect()
}

/// Most tokens a side can field
pub const MAX_PER_SIDE: usize = 2 * BOARD_SIZE as usize;

/// One roster entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub player: Player,
    pub x: i8,
    pub y: i8,
    #[serde(default)]
    pub offsets: Vec<Offset>,
}

impl TokenSpec {
    /// Token of an archetype; Player 2 gets the offsets mirrored vertically
    pub fn from_archetype(archetype: &Archetype, player: Player, slot: usize, pos: Pos) -> Self {
        let offsets = archetype
            .offsets
            .iter()
            .map(|&(dx, dy)| match player {
                Player::One => (dx, dy),
                Player::Two => (dx, -dy),
            })
            .collect();
        Self {
            name: format!("{}#{}-{}", archetype.kind, player.number(), slot),
            player,
            x: pos.x,
            y: pos.y,
            offsets,
        }
    }

    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    pub fn to_token(&self) -> Token {
        Token::new(self.name.as_str(), self.pos(), self.player, self.offsets.clone())
    }
}

/// Starting tokens of both sides
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub name: String,
    pub tokens: Vec<TokenSpec>,
}

impl Roster {
    /// Mirror-symmetric armies built from the given kinds
    pub fn symmetric(name: &str, kinds: &[&'static Archetype]) -> Self {
        let mut tokens = Vec::new();
        for player in [Player::One, Player::Two] {
            for (slot, (archetype, pos)) in kinds.iter().zip(home_cells(player)).enumerate() {
                tokens.push(TokenSpec::from_archetype(archetype, player, slot, pos));
            }
        }
        Self {
            name: name.to_string(),
            tokens,
        }
    }

    /// Random symmetric roster with `per_side` tokens (at most two rows)
    pub fn random<R: Rng>(rng: &mut R, name: &str, per_side: usize) -> Self {
        let per_side = per_side.min(MAX_PER_SIDE);
        let kinds: Vec<&'static Archetype> = (0..per_side)
            .map(|_| &ARCHETYPES[rng.gen_range(0..ARCHETYPES.len())])
            .collect();
        Self::symmetric(name, &kinds)
    }

    pub fn side(&self, player: Player) -> impl Iterator<Item = &TokenSpec> + '_ {
        self.tokens.iter().filter(move |t| t.player == player)
    }

    pub fn to_tokens(&self) -> Vec<Token> {
        self.tokens.iter().map(TokenSpec::to_token).collect()
    }

    /// Build a fresh engine for this roster
    pub fn to_engine(&self) -> Result<Engine> {
        Engine::new(self.to_tokens())
    }

    /// Names, bounds and cells must all be usable by the engine
    pub fn validate(&self) -> Result<()> {
        self.to_engine().map(|_| ())
    }

    /// Roster positions in roster order, in board-state form
    pub fn initial_board_state(&self) -> String {
        format_board_state(self.tokens.iter().map(|t| (t.name.as_str(), t.pos())))
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster: {}", path.display()))?;
        let roster: Roster = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse roster: {}", path.display()))?;
        roster
            .validate()
            .with_context(|| format!("Invalid roster: {}", path.display()))?;
        Ok(roster)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Roster {
    /// Six a side: Light in the center of the back row
    fn default() -> Self {
        let kinds: Vec<&'static Archetype> = [
            "Light Token Variant",
            "Fire Token Variant",
            "Ice Token Variant",
            "Water Token Variant",
            "Earth Token Variant",
            "Electricity Token Variant",
        ]
        .iter()
        .filter_map(|kind| archetype(kind))
        .collect();
        Self::symmetric("default", &kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{evaluate, Heuristics};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_archetype_lookup() {
        assert!(archetype("Fire Token Variant").is_some());
        assert!(archetype("Steam Token Variant").is_none());
        for a in &ARCHETYPES {
            assert!(!a.offsets.is_empty(), "{} should move", a.kind);
            assert_ne!(Heuristics::default().token_value(a.kind), 0, "{} needs a value", a.kind);
        }
    }

    #[test]
    fn test_default_roster() {
        let roster = Roster::default();
        assert_eq!(roster.side(Player::One).count(), 6);
        assert_eq!(roster.side(Player::Two).count(), 6);
        roster.validate().unwrap();

        let engine = roster.to_engine().unwrap();
        let board = engine.board();
        assert_eq!(evaluate(board, Player::One, &Heuristics::default()), 0);
        assert_eq!(
            board.legal_moves_for(Player::One).len(),
            board.legal_moves_for(Player::Two).len()
        );
    }

    #[test]
    fn test_player_two_offsets_mirrored() {
        let fire = archetype("Fire Token Variant").unwrap();
        let spec = TokenSpec::from_archetype(fire, Player::Two, 0, Pos::new(2, 0));
        assert_eq!(spec.offsets, vec![(0, 1), (-1, 1), (1, 1)]);
        assert_eq!(spec.name, "Fire Token Variant#2-0");
    }

    #[test]
    fn test_random_roster_deterministic() {
        let a = Roster::random(&mut ChaCha8Rng::seed_from_u64(7), "r", 6);
        let b = Roster::random(&mut ChaCha8Rng::seed_from_u64(7), "r", 6);
        assert_eq!(a, b);
        a.validate().unwrap();

        let big = Roster::random(&mut ChaCha8Rng::seed_from_u64(1), "big", 50);
        assert_eq!(big.side(Player::One).count(), MAX_PER_SIDE);
        big.validate().unwrap();
    }

    #[test]
    fn test_initial_board_state() {
        let roster = Roster::default();
        let mut engine = roster.to_engine().unwrap();
        let before = engine.board().clone();
        engine.handle_board_state(&roster.initial_board_state()).unwrap();
        assert_eq!(engine.board(), &before);
    }

    #[test]
    fn test_roster_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("tilewar-roster-{}.json", std::process::id()));
        let roster = Roster::default();
        roster.save(&path).unwrap();
        let loaded = Roster::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, roster);
    }

    #[test]
    fn test_invalid_roster_rejected() {
        let mut roster = Roster::default();
        roster.tokens[1].x = roster.tokens[0].x;
        roster.tokens[1].y = roster.tokens[0].y;
        assert!(roster.validate().is_err());
    }
}
