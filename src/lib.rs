//! Tetris 2048 engine: tetrominoes made of numbered tiles lock into a grid where equal
//! tiles merge vertically, full rows clear, and unsupported clusters fall.
//!
//! The terminal front end lives in the binary; everything here is headless and
//! deterministic for a given seed.

pub mod clear;
pub mod config;
pub mod consolidate;
pub mod game;
pub mod gravity;
pub mod grid;
pub mod label;
pub mod merge;
pub mod piece;
pub mod profile;
pub mod theme;
pub mod tile;

pub use config::{Difficulty, GameConfig};
pub use consolidate::{ConsolidationReport, Position, TileMatrix, lock_and_consolidate};
pub use game::GameState;
pub use grid::{Cell, Grid};
pub use tile::Tile;
