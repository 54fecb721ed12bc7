//! Tetrominoes whose four cells are numbered tiles.

use crate::consolidate::{Position, TileMatrix};
use crate::grid::{Cell, Grid};
use crate::tile::Tile;
use rand::Rng;

/// Chance that a freshly spawned tile is a 4 instead of a 2.
const FOUR_PROBABILITY: f64 = 0.25;

/// Tetromino kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// Shape in its square rotation box, top row first.
    fn shape(self) -> &'static [&'static str] {
        match self {
            Self::I => &["....", "XXXX", "....", "...."],
            Self::O => &["XX", "XX"],
            Self::T => &[".X.", "XXX", "..."],
            Self::S => &[".XX", "XX.", "..."],
            Self::Z => &["XX.", ".XX", "..."],
            Self::J => &["X..", "XXX", "..."],
            Self::L => &["..X", "XXX", "..."],
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Falling piece: a square box of cells plus the grid position of the box's bottom-left
/// corner. The box may hang past the walls or below the floor as long as its tiles do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: TetrominoKind,
    size: usize,
    /// Top row first, `box_cells[i * size + j]`.
    box_cells: Vec<Cell>,
    pub row: i32,
    pub col: i32,
}

impl Piece {
    /// New piece with random tile values, not yet positioned.
    pub fn new(kind: TetrominoKind, rng: &mut impl Rng) -> Self {
        let shape = kind.shape();
        let size = shape.len();
        let box_cells = shape
            .iter()
            .flat_map(|line| line.chars())
            .map(|ch| {
                if ch == 'X' {
                    let value = if rng.gen_bool(FOUR_PROBABILITY) { 4 } else { 2 };
                    Cell::Tile(Tile::new(value))
                } else {
                    Cell::Empty
                }
            })
            .collect();
        Self {
            kind,
            size,
            box_cells,
            row: 0,
            col: 0,
        }
    }

    /// Place the piece horizontally centred with its lowest tile on the top grid row.
    pub fn spawned(mut self, grid: &Grid) -> Self {
        let lowest = (0..self.size)
            .rev()
            .find(|&i| (0..self.size).any(|j| self.box_cells[i * self.size + j].is_occupied()))
            .unwrap_or(self.size - 1);
        let n = self.size as i32;
        self.col = (grid.cols() as i32 - n) / 2;
        self.row = grid.rows() as i32 - n + lowest as i32;
        self
    }

    /// Every tile as (grid row, grid col, tile). Rows above the grid are allowed.
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        let n = self.size;
        self.box_cells.iter().enumerate().filter_map(move |(k, cell)| {
            let (i, j) = (k / n, k % n);
            cell.tile()
                .map(|t| (self.row + (n - 1 - i) as i32, self.col + j as i32, t))
        })
    }

    pub fn moved(&self, d_row: i32, d_col: i32) -> Self {
        let mut p = self.clone();
        p.row += d_row;
        p.col += d_col;
        p
    }

    pub fn rotated_cw(&self) -> Self {
        let n = self.size;
        let mut p = self.clone();
        for i in 0..n {
            for j in 0..n {
                p.box_cells[i * n + j] = self.box_cells[(n - 1 - j) * n + i];
            }
        }
        p
    }

    pub fn rotated_ccw(&self) -> Self {
        let n = self.size;
        let mut p = self.clone();
        for i in 0..n {
            for j in 0..n {
                p.box_cells[i * n + j] = self.box_cells[j * n + (n - 1 - i)];
            }
        }
        p
    }

    /// True when every tile is inside the walls, on or above the floor, and not on an
    /// occupied cell. Tiles above the top row are fine.
    pub fn fits(&self, grid: &Grid) -> bool {
        self.tiles().all(|(row, col, _)| {
            if col < 0 || col >= grid.cols() as i32 || row < 0 {
                return false;
            }
            row >= grid.rows() as i32 || !grid.is_occupied(row as usize, col as usize)
        })
    }

    /// Minimal bounding tile matrix (bottom row first) and its bottom-left grid position.
    ///
    /// Panics if the piece sits outside the walls or below the floor; only a piece that
    /// [`fits`](Self::fits) may be locked.
    pub fn min_bounded_tile_matrix(&self) -> (TileMatrix, Position) {
        let tiles: Vec<_> = self.tiles().collect();
        let min_row = tiles.iter().map(|t| t.0).min().unwrap_or(self.row);
        let max_row = tiles.iter().map(|t| t.0).max().unwrap_or(self.row);
        let min_col = tiles.iter().map(|t| t.1).min().unwrap_or(self.col);
        let max_col = tiles.iter().map(|t| t.1).max().unwrap_or(self.col);
        let height = (max_row - min_row + 1) as usize;
        let width = (max_col - min_col + 1) as usize;
        let mut rows = vec![vec![Cell::Empty; width]; height];
        for (row, col, tile) in tiles {
            rows[(row - min_row) as usize][(col - min_col) as usize] = Cell::Tile(tile);
        }
        let matrix = TileMatrix::new(rows).expect("a tetromino always holds four tiles");
        let at = Position {
            row: usize::try_from(min_row).expect("piece below the floor"),
            col: usize::try_from(min_col).expect("piece outside the left wall"),
        };
        (matrix, at)
    }

    /// Tile values of the shape's bounding box, top row first (0 = hole). For previews.
    pub fn preview(&self) -> Vec<Vec<u32>> {
        let (matrix, _) = self.clone().with_origin().min_bounded_tile_matrix();
        let mut out = vec![vec![0; matrix.width()]; matrix.height()];
        for (r, c, tile) in matrix.tiles() {
            out[matrix.height() - 1 - r][c] = tile.value();
        }
        out
    }

    /// Shift the box far enough up and right that its tiles have non-negative coordinates.
    fn with_origin(mut self) -> Self {
        self.row = self.size as i32;
        self.col = self.size as i32;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn every_piece_has_four_tiles_of_two_or_four() {
        let mut rng = rng();
        for kind in TetrominoKind::ALL {
            let p = Piece::new(kind, &mut rng);
            let values: Vec<u32> = p.tiles().map(|t| t.2.value()).collect();
            assert_eq!(values.len(), 4, "{kind:?}");
            assert!(values.iter().all(|&v| v == 2 || v == 4));
        }
    }

    #[test]
    fn spawn_puts_lowest_tile_on_top_row() {
        let g = Grid::new(20, 12);
        let mut rng = rng();
        for kind in TetrominoKind::ALL {
            let p = Piece::new(kind, &mut rng).spawned(&g);
            let lowest = p.tiles().map(|t| t.0).min().unwrap();
            assert_eq!(lowest, 19, "{kind:?}");
            assert!(p.fits(&g));
        }
    }

    #[test]
    fn four_rotations_return_to_start() {
        let mut rng = rng();
        let p = Piece::new(TetrominoKind::L, &mut rng);
        let back = p.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
        assert_eq!(back, p);
        assert_eq!(p.rotated_cw().rotated_ccw(), p);
    }

    #[test]
    fn rotation_keeps_tile_values() {
        let mut rng = rng();
        let p = Piece::new(TetrominoKind::T, &mut rng);
        let mut before: Vec<u32> = p.tiles().map(|t| t.2.value()).collect();
        let mut after: Vec<u32> = p.rotated_cw().tiles().map(|t| t.2.value()).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn walls_floor_and_stack_block_placement() {
        let g = Grid::from_bottom_rows(4, 4, &[&[2, 0, 0, 0]]);
        let mut rng = rng();
        let o = Piece::new(TetrominoKind::O, &mut rng);
        assert!(o.moved(0, 2).fits(&g));
        assert!(!o.moved(0, 3).fits(&g));
        assert!(!o.moved(-1, 1).fits(&g));
        assert!(!o.moved(0, 0).fits(&g));
        assert!(o.moved(3, 1).fits(&g));
    }

    #[test]
    fn bounding_matrix_trims_empty_box_rows() {
        let mut rng = rng();
        let i = Piece::new(TetrominoKind::I, &mut rng).moved(0, 1);
        let (m, at) = i.min_bounded_tile_matrix();
        assert_eq!((m.width(), m.height()), (4, 1));
        // The I sits on the second box row from the top, i.e. two rows above the box floor.
        assert_eq!(at, Position { row: 2, col: 1 });
    }

    #[test]
    fn preview_is_top_row_first() {
        let mut rng = rng();
        let j = Piece::new(TetrominoKind::J, &mut rng);
        let preview = j.preview();
        assert_eq!(preview.len(), 2);
        assert!(preview[0][0] > 0 && preview[0][1] == 0 && preview[0][2] == 0);
        assert!(preview[1].iter().all(|&v| v > 0));
    }
}
