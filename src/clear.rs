//! Row clearing: full rows score their tile sum and disappear.

use crate::grid::Grid;
use log::trace;

/// What one clearing pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub rows_cleared: u32,
    pub points: u32,
}

/// Remove every full row, bottom to top.
///
/// After a clear the scan stays on the same index, since the row that slid into it
/// may be full as well.
pub fn clear_full_rows(grid: &mut Grid) -> ClearReport {
    let mut report = ClearReport::default();
    let mut row = 0;
    while row < grid.rows() {
        if grid.row_is_full(row) {
            let points: u32 = grid.row(row).iter().map(|c| c.value()).sum();
            grid.add_score(points);
            grid.remove_row(row);
            report.rows_cleared += 1;
            report.points += points;
            trace!("cleared row {row} for {points} points");
        } else {
            row += 1;
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_single_full_row() {
        let mut g = Grid::from_bottom_rows(3, 4, &[&[2, 2, 2, 2], &[4, 0, 0, 8]]);
        let r = clear_full_rows(&mut g);
        assert_eq!(r, ClearReport { rows_cleared: 1, points: 8 });
        assert_eq!(g.score(), 8);
        assert_eq!(g.values()[0], vec![4, 0, 0, 8]);
        assert_eq!(g.values()[1], vec![0, 0, 0, 0]);
    }

    #[test]
    fn clears_consecutive_full_rows() {
        let mut g = Grid::from_bottom_rows(
            4,
            2,
            &[&[2, 4], &[8, 16], &[2, 2], &[32, 0]],
        );
        let r = clear_full_rows(&mut g);
        assert_eq!(r.rows_cleared, 3);
        assert_eq!(r.points, 2 + 4 + 8 + 16 + 2 + 2);
        assert_eq!(g.values(), vec![vec![32, 0], vec![0, 0], vec![0, 0], vec![0, 0]]);
    }

    #[test]
    fn no_full_rows_is_a_noop() {
        let mut g = Grid::from_bottom_rows(2, 2, &[&[2, 0], &[0, 2]]);
        let before = g.clone();
        assert_eq!(clear_full_rows(&mut g), ClearReport::default());
        assert_eq!(g, before);
    }

    #[test]
    fn top_row_can_clear() {
        let mut g = Grid::from_bottom_rows(2, 2, &[&[2, 0], &[4, 4]]);
        let r = clear_full_rows(&mut g);
        assert_eq!(r.rows_cleared, 1);
        assert_eq!(g.values(), vec![vec![2, 0], vec![0, 0]]);
    }
}
