//! Connected-component labelling (4-connectivity) of occupied cells.
//!
//! Classic two-pass labelling: a raster pass hands out provisional labels and records
//! equivalences in a union-find, a second pass resolves every cell to its component and
//! compacts the ids to `1..=count`. Nothing is cached between calls.

use crate::grid::Grid;

/// Array-backed union-find over provisional labels. Label 0 is reserved for "empty".
#[derive(Debug, Clone)]
struct Equivalences {
    parent: Vec<u32>,
}

impl Equivalences {
    fn new() -> Self {
        Self { parent: vec![0] }
    }

    fn fresh(&mut self) -> u32 {
        let label = self.parent.len() as u32;
        self.parent.push(label);
        label
    }

    fn find(&mut self, mut label: u32) -> u32 {
        // Path halving.
        while self.parent[label as usize] != label {
            let grandparent = self.parent[self.parent[label as usize] as usize];
            self.parent[label as usize] = grandparent;
            label = grandparent;
        }
        label
    }

    /// Join two classes; the smaller root survives.
    fn union(&mut self, a: u32, b: u32) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[hi as usize] = lo;
    }

    /// Provisional labels handed out so far.
    fn len(&self) -> usize {
        self.parent.len() - 1
    }
}

/// Result of labelling: one id per cell (0 = empty) plus the component count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    rows: usize,
    cols: usize,
    ids: Vec<u32>,
    count: usize,
}

impl Labels {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        assert!(row < self.rows && col < self.cols, "label ({row}, {col}) out of range");
        self.ids[row * self.cols + col]
    }

    /// Number of distinct components; ids run `1..=count`.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cells of component `id`, in raster order.
    pub fn cells_of(&self, id: u32) -> Vec<(usize, usize)> {
        self.ids
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == id)
            .map(|(i, _)| (i / self.cols, i % self.cols))
            .collect()
    }
}

/// Label every occupied cell of `grid` with its 4-connected component.
///
/// The raster runs row 0 upward, left to right within a row, so the already visited
/// neighbours of a cell are the one in the previous row and the one in the previous column.
/// Component ids are numbered by the raster position of each component's first cell.
pub fn label_components(grid: &Grid) -> Labels {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut ids = vec![0u32; rows * cols];
    let mut eq = Equivalences::new();

    for row in 0..rows {
        for col in 0..cols {
            if !grid.is_occupied(row, col) {
                continue;
            }
            let below = if row > 0 { ids[(row - 1) * cols + col] } else { 0 };
            let left = if col > 0 { ids[row * cols + col - 1] } else { 0 };
            ids[row * cols + col] = match (below, left) {
                (0, 0) => eq.fresh(),
                (l, 0) | (0, l) => l,
                (a, b) => {
                    if a != b {
                        eq.union(a, b);
                    }
                    a.min(b)
                }
            };
        }
    }

    // Roots come out ascending, which keeps ids in raster order of first appearance.
    let mut compact = vec![0u32; eq.len() + 1];
    let mut count = 0u32;
    for label in 1..=eq.len() as u32 {
        if eq.find(label) == label {
            count += 1;
            compact[label as usize] = count;
        }
    }
    for id in ids.iter_mut().filter(|l| **l != 0) {
        *id = compact[eq.find(*id) as usize];
    }

    Labels {
        rows,
        cols,
        ids,
        count: count as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(labels: &Labels) -> Vec<Vec<u32>> {
        (0..labels.rows())
            .map(|r| (0..labels.cols()).map(|c| labels.get(r, c)).collect())
            .collect()
    }

    #[test]
    fn empty_grid_has_no_components() {
        let g = Grid::new(3, 3);
        let l = label_components(&g);
        assert_eq!(l.count(), 0);
        assert!(ids(&l).iter().flatten().all(|&id| id == 0));
    }

    #[test]
    fn separate_clusters_get_consecutive_ids() {
        let g = Grid::from_bottom_rows(3, 4, &[&[2, 0, 0, 2], &[0, 0, 0, 0], &[0, 4, 4, 0]]);
        let l = label_components(&g);
        assert_eq!(l.count(), 3);
        assert_eq!(ids(&l), vec![vec![1, 0, 0, 2], vec![0, 0, 0, 0], vec![0, 3, 3, 0]]);
    }

    #[test]
    fn u_shape_merges_through_equivalence() {
        // Two arms meet only at the top row; the raster sees them as two labels first.
        let g = Grid::from_bottom_rows(3, 3, &[&[2, 0, 2], &[2, 0, 2], &[2, 2, 2]]);
        let l = label_components(&g);
        assert_eq!(l.count(), 1);
        assert!(ids(&l).iter().flatten().all(|&id| id <= 1));
        assert_eq!(l.cells_of(1).len(), 7);
    }

    #[test]
    fn diagonal_cells_are_not_connected() {
        let g = Grid::from_bottom_rows(2, 2, &[&[2, 0], &[0, 2]]);
        assert_eq!(label_components(&g).count(), 2);
    }

    #[test]
    fn chained_equivalences_resolve_to_one_component() {
        // A comb whose teeth are joined by a spine on the last row.
        let g = Grid::from_bottom_rows(
            3,
            5,
            &[&[2, 0, 2, 0, 2], &[2, 0, 2, 0, 2], &[2, 2, 2, 2, 2]],
        );
        let l = label_components(&g);
        assert_eq!(l.count(), 1);
    }
}
