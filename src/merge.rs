//! Column merging: tiles slide down their column and equal vertical neighbours combine.

use crate::grid::{Cell, Grid};
use log::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merges: u32,
    /// Sum of the surviving (doubled) tile values; this is what the score gained.
    pub points: u32,
    /// Full passes over all columns, the last one being the no-change pass.
    pub passes: u32,
}

/// Slide the tiles of `col` at or above `from` down to the lowest free rows at or above
/// `from`, keeping their order. Returns true if any tile moved.
fn compact_column_from(grid: &mut Grid, col: usize, from: usize) -> bool {
    let mut write = from;
    let mut moved = false;
    for read in from..grid.rows() {
        if !grid.is_occupied(read, col) {
            continue;
        }
        if read != write {
            let cell = grid.take(read, col);
            grid.set(write, col, cell);
            moved = true;
        }
        write += 1;
    }
    moved
}

/// Remove every gap in `col`. Returns true if any tile moved.
pub fn compact_column(grid: &mut Grid, col: usize) -> bool {
    compact_column_from(grid, col, 0)
}

/// One floor-up merge scan of a compacted column. Returns (merges, points).
pub fn merge_column(grid: &mut Grid, col: usize) -> (u32, u32) {
    let (mut merges, mut points) = (0, 0);
    let mut row = 0;
    while row + 1 < grid.rows() {
        let (Cell::Tile(lower), Cell::Tile(upper)) = (grid.get(row, col), grid.get(row + 1, col))
        else {
            row += 1;
            continue;
        };
        if lower.value() == upper.value() {
            let merged = lower.doubled();
            grid.set(row, col, Cell::Tile(merged));
            grid.take(row + 1, col);
            grid.add_score(merged.value());
            compact_column_from(grid, col, row + 1);
            merges += 1;
            points += merged.value();
            trace!("merged {} at ({row}, {col})", merged.value());
        }
        row += 1;
    }
    (merges, points)
}

/// Compact and merge every column until a full pass changes nothing.
pub fn merge_until_stable(grid: &mut Grid) -> MergeReport {
    let mut report = MergeReport::default();
    loop {
        report.passes += 1;
        let mut changed = false;
        for col in 0..grid.cols() {
            let moved = compact_column(grid, col);
            let (merges, points) = merge_column(grid, col);
            report.merges += merges;
            report.points += points;
            changed |= moved || merges > 0;
        }
        if !changed {
            break;
        }
    }
    report
}
