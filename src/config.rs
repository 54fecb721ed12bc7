//! Game configuration passed explicitly from the CLI/profile into the game.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default playfield: 20 rows of 12 columns.
pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Gravity ticks per second.
    pub fn tick_rate(self) -> f64 {
        match self {
            Self::Easy => 2.0,
            Self::Medium => 4.0,
            Self::Hard => 7.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Easy => Self::Hard,
            Self::Medium => Self::Easy,
            Self::Hard => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub difficulty: Difficulty,
    /// Fixed seed for the piece sequence; random when `None`.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            difficulty: Difficulty::default(),
            seed: None,
        }
    }
}
