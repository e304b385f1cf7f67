//! Position evaluation

use std::path::Path;

use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::{Board, BOARD_SIZE};
use crate::token::Player;

const N: usize = BOARD_SIZE as usize;

/// Win value (effectively infinite)
pub const WIN_VALUE: i32 = 100_000;

/// Corners are weaker than every other cell
pub const DEFAULT_POSITION_WEIGHTS: [[i32; N]; N] = [
    [1, 2, 2, 2, 1],
    [2, 2, 2, 2, 2],
    [2, 2, 2, 2, 2],
    [2, 2, 2, 2, 2],
    [1, 2, 2, 2, 1],
];

/// Importance of the elemental token kinds
pub const DEFAULT_TOKEN_VALUES: [(&str, i32); 12] = [
    ("Fire Token Variant", 3),
    ("Ice Token Variant", 3),
    ("Water Token Variant", 1),
    ("Earth Token Variant", 1),
    ("Land Storm Token Variant", 3),
    ("Electricity Token Variant", 2),
    ("Wind Token Variant", 2),
    ("Plant Token Variant", 4),
    ("Sea Storm Token Variant", 3),
    ("Poison Token Variant", 4),
    ("Light Token Variant", 5),
    ("Dark Token Variant", 5),
];

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Heuristics {
    /// Value of every token on the board
    pub material_weight: i32,
    /// Bonus for standing on a cell, indexed `[x][y]`
    pub position_weights: [[i32; N]; N],
    /// Extra value per token kind
    #[serde(default)]
    pub token_values: FxHashMap<String, i32>,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            material_weight: 10,
            position_weights: DEFAULT_POSITION_WEIGHTS,
            token_values: DEFAULT_TOKEN_VALUES
                .iter()
                .map(|&(name, value)| (name.to_string(), value))
                .collect(),
        }
    }
}

impl Heuristics {
    /// Token count only: `10 * own - 10 * opponent`
    pub fn material_only() -> Self {
        Self {
            material_weight: 10,
            position_weights: [[0; N]; N],
            token_values: FxHashMap::default(),
        }
    }

    pub fn with_token_value(mut self, name: impl Into<String>, value: i32) -> Self {
        self.token_values.insert(name.into(), value);
        self
    }

    /// Value of a token by name; `Fire Token Variant#1-2` falls back to the
    /// `Fire Token Variant` entry
    pub fn token_value(&self, name: &str) -> i32 {
        if let Some(&value) = self.token_values.get(name) {
            return value;
        }
        name.split_once('#')
            .and_then(|(kind, _)| self.token_values.get(kind).copied())
            .unwrap_or(0)
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read heuristics: {}", path.display()))?;
        let heuristics = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse heuristics: {}", path.display()))?;
        Ok(heuristics)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Evaluate position from `player`'s perspective
pub fn evaluate(board: &Board, player: Player, heuristics: &Heuristics) -> i32 {
    board
        .tokens()
        .map(|token| {
            let pos = token.pos();
            let value = heuristics.material_weight
                + heuristics.position_weights[pos.x as usize][pos.y as usize]
                + heuristics.token_value(token.name());
            if token.owner() == player {
                value
            } else {
                -value
            }
        })
        .sum()
}
