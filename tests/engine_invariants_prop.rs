//! Property tests for the consolidation engine on generated grids.
//!
//! Invariants covered:
//! - Component labels agree with a flood fill and are numbered 1..=count.
//! - Free clusters settle within `rows` steps and settling twice changes nothing.
//! - Merging keeps the tile sum and scores exactly the merged values.
//! - No full row survives a clear.
//! - A consolidated grid is a fixed point of consolidation.

use proptest::prelude::*;
use std::collections::VecDeque;
use tetris2048::clear::clear_full_rows;
use tetris2048::consolidate::consolidate;
use tetris2048::gravity::{free_component_count, settle_free_tiles};
use tetris2048::grid::{Cell, Grid};
use tetris2048::label::label_components;
use tetris2048::merge::merge_until_stable;
use tetris2048::tile::Tile;

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (1usize..9, 1usize..7).prop_flat_map(|(rows, cols)| {
        let value = prop_oneof![
            3 => Just(0u32),
            1 => Just(2u32),
            1 => Just(4u32),
            1 => Just(8u32),
            1 => Just(16u32),
        ];
        prop::collection::vec(value, rows * cols).prop_map(move |values| {
            let mut grid = Grid::new(rows, cols);
            for (i, v) in values.into_iter().enumerate() {
                if v != 0 {
                    grid.set(i / cols, i % cols, Cell::Tile(Tile::new(v)));
                }
            }
            grid
        })
    })
}

/// Component count by breadth-first flood fill.
fn flood_fill_count(grid: &Grid) -> usize {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut seen = vec![false; rows * cols];
    let mut count = 0;
    for start in 0..rows * cols {
        if seen[start] || !grid.is_occupied(start / cols, start % cols) {
            continue;
        }
        count += 1;
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            let (r, c) = (i / cols, i % cols);
            let mut neighbours = Vec::with_capacity(4);
            if r > 0 {
                neighbours.push(i - cols);
            }
            if r + 1 < rows {
                neighbours.push(i + cols);
            }
            if c > 0 {
                neighbours.push(i - 1);
            }
            if c + 1 < cols {
                neighbours.push(i + 1);
            }
            for n in neighbours {
                if !seen[n] && grid.is_occupied(n / cols, n % cols) {
                    seen[n] = true;
                    queue.push_back(n);
                }
            }
        }
    }
    count
}

proptest! {
    #[test]
    fn labels_match_flood_fill(grid in grid_strategy()) {
        let labels = label_components(&grid);
        prop_assert_eq!(labels.count(), flood_fill_count(&grid));
        for r in 0..grid.rows() {
            for c in 0..grid.cols() {
                let id = labels.get(r, c);
                prop_assert_eq!(id == 0, !grid.is_occupied(r, c));
                prop_assert!(id as usize <= labels.count());
                if c + 1 < grid.cols() && grid.is_occupied(r, c) && grid.is_occupied(r, c + 1) {
                    prop_assert_eq!(id, labels.get(r, c + 1));
                }
                if r + 1 < grid.rows() && grid.is_occupied(r, c) && grid.is_occupied(r + 1, c) {
                    prop_assert_eq!(id, labels.get(r + 1, c));
                }
            }
        }
        for id in 1..=labels.count() as u32 {
            prop_assert!(!labels.cells_of(id).is_empty());
        }
    }

    #[test]
    fn settling_terminates_and_is_idempotent(mut grid in grid_strategy()) {
        let tiles = grid.occupied_count();
        let sum = grid.tile_sum();
        let report = settle_free_tiles(&mut grid);
        prop_assert!(report.steps as usize <= grid.rows());
        prop_assert_eq!(free_component_count(&label_components(&grid)), 0);
        prop_assert_eq!(grid.occupied_count(), tiles);
        prop_assert_eq!(grid.tile_sum(), sum);

        let settled = grid.clone();
        let again = settle_free_tiles(&mut grid);
        prop_assert_eq!(again.steps, 0);
        prop_assert_eq!(grid, settled);
    }

    #[test]
    fn merging_conserves_value(mut grid in grid_strategy()) {
        let sum = grid.tile_sum();
        let score = grid.score();
        let report = merge_until_stable(&mut grid);
        prop_assert_eq!(grid.tile_sum(), sum);
        prop_assert_eq!(grid.score() - score, report.points);
        for c in 0..grid.cols() {
            for r in 0..grid.rows().saturating_sub(1) {
                let (lower, upper) = (grid.get(r, c), grid.get(r + 1, c));
                prop_assert!(lower.is_occupied() || !upper.is_occupied(), "gap in column {}", c);
                if lower.is_occupied() {
                    prop_assert_ne!(lower.value(), upper.value());
                }
            }
        }
    }

    #[test]
    fn no_full_row_survives_a_clear(mut grid in grid_strategy()) {
        let sum = grid.tile_sum();
        let report = clear_full_rows(&mut grid);
        prop_assert!((0..grid.rows()).all(|r| !grid.row_is_full(r)));
        prop_assert_eq!(u64::from(report.points), sum - grid.tile_sum());
        prop_assert_eq!(grid.score(), report.points);
    }

    #[test]
    fn consolidation_reaches_a_fixed_point(mut grid in grid_strategy()) {
        let first = consolidate(&mut grid);
        prop_assert!(!first.game_over);
        let stable = grid.clone();
        let second = consolidate(&mut grid);
        prop_assert_eq!(second.merges, 0);
        prop_assert_eq!(second.rows_cleared, 0);
        prop_assert_eq!(second.gravity_steps, 0);
        prop_assert_eq!(second.points, 0);
        prop_assert_eq!(grid, stable);
    }
}
