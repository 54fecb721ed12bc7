//! Free-tile resolution: clusters that do not touch the floor fall one row per step.

use crate::grid::Grid;
use crate::label::{Labels, label_components};
use log::trace;

/// Outcome of settling free clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    /// Gravity steps that moved at least one tile.
    pub steps: u32,
    /// Sum over steps of tiles moved.
    pub tiles_moved: u32,
}

/// `grounded[id]` is true when component `id` has a cell on the floor row. Index 0 is unused.
pub fn grounded_components(labels: &Labels) -> Vec<bool> {
    let mut grounded = vec![false; labels.count() + 1];
    for col in 0..labels.cols() {
        grounded[labels.get(0, col) as usize] = true;
    }
    grounded[0] = false;
    grounded
}

/// Number of components with no floor cell.
pub fn free_component_count(labels: &Labels) -> usize {
    grounded_components(labels)
        .iter()
        .skip(1)
        .filter(|g| !**g)
        .count()
}

/// Move every tile of every free component down one row.
///
/// Rows are processed floor-first so a cluster moves as a whole; a tile whose target is
/// still occupied stays put this step. Returns the number of tiles moved.
pub fn drop_free_tiles_once(grid: &mut Grid) -> u32 {
    let labels = label_components(grid);
    let grounded = grounded_components(&labels);
    let mut moved = 0;
    // Row 0 never holds a free tile.
    for row in 1..grid.rows() {
        for col in 0..grid.cols() {
            let id = labels.get(row, col);
            if id == 0 || grounded[id as usize] || grid.is_occupied(row - 1, col) {
                continue;
            }
            let cell = grid.take(row, col);
            grid.set(row - 1, col, cell);
            moved += 1;
        }
    }
    moved
}

/// Drop free clusters until every component is grounded.
///
/// Each productive step lowers every free tile by one row, so the loop ends within
/// `grid.rows()` steps.
pub fn settle_free_tiles(grid: &mut Grid) -> SettleReport {
    let mut report = SettleReport::default();
    loop {
        let labels = label_components(grid);
        let free = free_component_count(&labels);
        if free == 0 {
            break;
        }
        let moved = drop_free_tiles_once(grid);
        trace!("gravity step {}: {free} free components, {moved} tiles moved", report.steps + 1);
        if moved == 0 {
            break;
        }
        report.steps += 1;
        report.tiles_moved += moved;
        debug_assert!(report.steps as usize <= grid.rows(), "free-tile loop failed to converge");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounded_grid_is_untouched() {
        let mut g = Grid::from_bottom_rows(3, 3, &[&[2, 0, 0], &[2, 4, 0], &[0, 4, 8]]);
        let before = g.clone();
        assert_eq!(settle_free_tiles(&mut g), SettleReport::default());
        assert_eq!(g, before);
    }

    #[test]
    fn floating_pair_falls_to_floor() {
        let mut g = Grid::new(8, 3);
        g.set(5, 1, crate::grid::Cell::Tile(crate::tile::Tile::new(2)));
        g.set(6, 1, crate::grid::Cell::Tile(crate::tile::Tile::new(4)));
        let r = settle_free_tiles(&mut g);
        assert_eq!(r.steps, 5);
        assert_eq!(g.get(0, 1).value(), 2);
        assert_eq!(g.get(1, 1).value(), 4);
        assert_eq!(g.occupied_count(), 2);
    }

    #[test]
    fn floating_cluster_lands_on_obstruction() {
        // Column 0 is a grounded tower; the cluster in column 2 hangs free above a stub.
        let mut g = Grid::from_bottom_rows(
            6,
            3,
            &[&[2, 0, 8], &[2, 0, 0], &[2, 0, 0], &[0, 0, 16], &[0, 0, 32]],
        );
        settle_free_tiles(&mut g);
        assert_eq!(g.values()[1], vec![2, 0, 16]);
        assert_eq!(g.values()[2], vec![2, 0, 32]);
        assert_eq!(free_component_count(&label_components(&g)), 0);
    }

    #[test]
    fn cluster_touching_a_grounded_one_does_not_fall() {
        let g = Grid::from_bottom_rows(3, 2, &[&[2, 0], &[2, 4], &[0, 4]]);
        assert_eq!(free_component_count(&label_components(&g)), 0);
    }

    #[test]
    fn wide_cluster_falls_as_a_unit() {
        let mut g = Grid::from_bottom_rows(4, 3, &[&[0, 0, 0], &[0, 0, 0], &[2, 4, 8], &[0, 16, 0]]);
        let r = settle_free_tiles(&mut g);
        assert_eq!(r.steps, 2);
        assert_eq!(g.values()[0], vec![2, 4, 8]);
        assert_eq!(g.values()[1], vec![0, 16, 0]);
    }
}
