//! Post-lock consolidation: lock the piece, then merge, clear and drop until stable.

use crate::clear::clear_full_rows;
use crate::gravity::settle_free_tiles;
use crate::grid::{Cell, Grid};
use crate::merge::merge_until_stable;
use crate::tile::Tile;
use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("tile matrix has no rows")]
    Empty,
    #[error("tile matrix row {row} has {len} cells, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },
    #[error("tile matrix holds no tile")]
    NoTiles,
}

/// Minimal bounding matrix of a landed piece. Row 0 is the piece's bottom row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMatrix {
    width: usize,
    rows: Vec<Vec<Cell>>,
}

impl TileMatrix {
    pub fn new(rows: Vec<Vec<Cell>>) -> Result<Self, ShapeError> {
        let width = rows.first().ok_or(ShapeError::Empty)?.len();
        if width == 0 {
            return Err(ShapeError::Empty);
        }
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(ShapeError::Ragged {
                    row,
                    len: cells.len(),
                    expected: width,
                });
            }
        }
        if !rows.iter().flatten().any(|c| c.is_occupied()) {
            return Err(ShapeError::NoTiles);
        }
        Ok(Self { width, rows })
    }

    /// Same as [`TileMatrix::new`] from raw values, bottom row first, 0 for a hole.
    pub fn from_bottom_rows(values: &[&[u32]]) -> Result<Self, ShapeError> {
        let rows = values
            .iter()
            .map(|line| {
                line.iter()
                    .map(|&v| if v == 0 { Cell::Empty } else { Cell::Tile(Tile::new(v)) })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Every tile with its offset from the bottom-left corner, as (row, col, tile).
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.tile().map(|t| (r, c, t)))
        })
    }
}

/// Grid position of a tile matrix's bottom-left corner. `row` may lie above the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// Everything one lock did to the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub game_over: bool,
    /// Score gained by merges and row clears.
    pub points: u32,
    pub rows_cleared: u32,
    pub merges: u32,
    /// Gravity steps applied to free clusters.
    pub gravity_steps: u32,
    /// Drop/merge/clear rounds after the first merge and clear.
    pub rounds: u32,
}

/// Write the matrix into the grid. Returns false, and flags game over, when a tile
/// lands above the top row; tiles inside the grid are still written.
///
/// Panics if a tile falls outside the side walls or onto an occupied cell.
pub fn lock_tiles(grid: &mut Grid, matrix: &TileMatrix, at: Position) -> bool {
    assert!(
        at.col + matrix.width() <= grid.cols(),
        "piece of width {} at column {} overflows a {}-column grid",
        matrix.width(),
        at.col,
        grid.cols()
    );
    let mut fits = true;
    for (r, c, tile) in matrix.tiles() {
        let (row, col) = (at.row + r, at.col + c);
        if row >= grid.rows() {
            fits = false;
            continue;
        }
        assert!(!grid.is_occupied(row, col), "piece locked onto occupied cell ({row}, {col})");
        grid.set(row, col, Cell::Tile(tile));
    }
    if !fits {
        grid.set_game_over();
    }
    fits
}

/// Merge, clear, then repeat drop/merge/clear until nothing changes.
pub fn consolidate(grid: &mut Grid) -> ConsolidationReport {
    let score_before = grid.score();
    let mut report = ConsolidationReport::default();

    let merged = merge_until_stable(grid);
    let cleared = clear_full_rows(grid);
    report.merges += merged.merges;
    report.rows_cleared += cleared.rows_cleared;

    loop {
        report.rounds += 1;
        let settled = settle_free_tiles(grid);
        let merged = merge_until_stable(grid);
        let cleared = clear_full_rows(grid);
        report.gravity_steps += settled.steps;
        report.merges += merged.merges;
        report.rows_cleared += cleared.rows_cleared;
        if settled.steps == 0 && merged.merges == 0 && cleared.rows_cleared == 0 {
            break;
        }
    }

    report.points = grid.score() - score_before;
    report
}

/// Lock a landed piece and bring the grid back to a stable state.
///
/// A game-over grid is left alone. If the piece pokes above the top row the grid is
/// flagged game over and nothing else runs.
pub fn lock_and_consolidate(grid: &mut Grid, matrix: &TileMatrix, at: Position) -> ConsolidationReport {
    if grid.is_game_over() {
        return ConsolidationReport {
            game_over: true,
            ..ConsolidationReport::default()
        };
    }
    if !lock_tiles(grid, matrix, at) {
        debug!("lock at {at:?} crossed the top boundary, game over");
        return ConsolidationReport {
            game_over: true,
            ..ConsolidationReport::default()
        };
    }
    let report = consolidate(grid);
    debug!("consolidated lock at {at:?}: {report:?}");
    report
}
