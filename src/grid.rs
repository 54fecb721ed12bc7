//! Grid model: the tile matrix, score and game-over flag. Row 0 is the floor.

use crate::tile::Tile;

/// Single cell: either empty or holding one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Tile(Tile),
}

impl Cell {
    #[inline]
    pub fn is_occupied(self) -> bool {
        matches!(self, Self::Tile(_))
    }

    #[inline]
    pub fn tile(self) -> Option<Tile> {
        match self {
            Self::Tile(t) => Some(t),
            Self::Empty => None,
        }
    }

    /// Tile value, or 0 for an empty cell.
    #[inline]
    pub fn value(self) -> u32 {
        self.tile().map_or(0, Tile::value)
    }
}

/// Fixed-size `rows x cols` playfield. Gravity pulls toward row 0.
///
/// Out-of-range access panics: it is a caller bug, never a game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major, `cells[row * cols + col]`, row 0 first.
    cells: Vec<Cell>,
    score: u32,
    game_over: bool,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid must be at least 1x1");
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
            score: 0,
            game_over: false,
        }
    }

    /// Build a grid from tile values, `values[0]` being the floor row. 0 means empty.
    /// Rows not given are empty.
    pub fn from_bottom_rows(rows: usize, cols: usize, values: &[&[u32]]) -> Self {
        assert!(values.len() <= rows, "more value rows than grid rows");
        let mut grid = Self::new(rows, cols);
        for (row, line) in values.iter().enumerate() {
            assert_eq!(line.len(), cols, "row {row} has {} values, want {cols}", line.len());
            for (col, &v) in line.iter().enumerate() {
                if v != 0 {
                    grid.set(row, col, Cell::Tile(Tile::new(v)));
                }
            }
        }
        grid
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.idx(row, col)]
    }

    #[inline]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_occupied()
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let i = self.idx(row, col);
        self.cells[i] = cell;
    }

    /// Remove and return the cell's content, leaving it empty.
    #[inline]
    pub fn take(&mut self, row: usize, col: usize) -> Cell {
        let i = self.idx(row, col);
        std::mem::take(&mut self.cells[i])
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        let start = self.idx(row, 0);
        &self.cells[start..start + self.cols]
    }

    pub fn row_is_full(&self, row: usize) -> bool {
        self.row(row).iter().all(|c| c.is_occupied())
    }

    /// Delete `row`; every row above moves down by one and the top row becomes empty.
    pub fn remove_row(&mut self, row: usize) {
        let start = self.idx(row, 0);
        self.cells.copy_within(start + self.cols.., start);
        let top = (self.rows - 1) * self.cols;
        self.cells[top..].fill(Cell::Empty);
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_score(&mut self, delta: u32) {
        self.score = self.score.saturating_add(delta);
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn set_game_over(&mut self) {
        self.game_over = true;
    }

    /// Empty every cell and zero the score without reallocating.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::Empty);
        self.score = 0;
        self.game_over = false;
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Sum of every tile value on the grid.
    pub fn tile_sum(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.value())).sum()
    }

    pub fn max_tile(&self) -> Option<Tile> {
        self.cells
            .iter()
            .filter_map(|c| c.tile())
            .max_by_key(|t| t.value())
    }

    /// Tile values, floor row first. Handy for assertions and logging.
    pub fn values(&self) -> Vec<Vec<u32>> {
        (0..self.rows)
            .map(|r| self.row(r).iter().map(|c| c.value()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_take() {
        let mut g = Grid::new(3, 2);
        assert!(!g.is_occupied(1, 1));
        g.set(1, 1, Cell::Tile(Tile::new(8)));
        assert!(g.is_occupied(1, 1));
        assert_eq!(g.get(1, 1).value(), 8);
        assert_eq!(g.take(1, 1).value(), 8);
        assert_eq!(g.get(1, 1), Cell::Empty);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_range_panics() {
        let g = Grid::new(3, 2);
        let _ = g.get(3, 0);
    }

    #[test]
    fn remove_row_shifts_rows_above_down() {
        let mut g = Grid::from_bottom_rows(3, 2, &[&[2, 2], &[4, 0], &[0, 8]]);
        g.remove_row(0);
        assert_eq!(g.values(), vec![vec![4, 0], vec![0, 8], vec![0, 0]]);
    }

    #[test]
    fn reset_keeps_dimensions() {
        let mut g = Grid::from_bottom_rows(2, 2, &[&[2, 4]]);
        g.add_score(10);
        g.set_game_over();
        g.reset();
        assert_eq!(g.occupied_count(), 0);
        assert_eq!(g.score(), 0);
        assert!(!g.is_game_over());
        assert_eq!((g.rows(), g.cols()), (2, 2));
    }

    #[test]
    fn aggregates() {
        let g = Grid::from_bottom_rows(2, 3, &[&[2, 4, 0], &[16, 0, 0]]);
        assert_eq!(g.occupied_count(), 3);
        assert_eq!(g.tile_sum(), 22);
        assert_eq!(g.max_tile().map(Tile::value), Some(16));
        assert!(!g.row_is_full(0));
    }
}
