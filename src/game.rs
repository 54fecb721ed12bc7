//! Game state: grid, falling piece, next piece, lock and consolidation, popups.

use crate::config::{Difficulty, GameConfig};
use crate::consolidate::{ConsolidationReport, lock_and_consolidate};
use crate::grid::Grid;
use crate::piece::{Piece, TetrominoKind};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Tile value that counts as winning. Play goes on after it.
pub const WIN_TILE: u32 = 2048;

/// How long a score popup stays on screen.
const POPUP_LIFETIME_MS: u32 = 1500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePopup {
    pub row: usize,
    pub col: usize,
    pub amount: u32,
    pub age_ms: u32,
}

/// Game state: grid, current piece, next piece, counters.
#[derive(Debug)]
pub struct GameState {
    pub grid: Grid,
    pub piece: Option<Piece>,
    pub next: Piece,
    rng: StdRng,
    pub difficulty: Difficulty,
    pub rows_cleared: u32,
    pub merges: u32,
    pub pieces_locked: u32,
    /// Some tile reached [`WIN_TILE`].
    pub reached_2048: bool,
    pub last_report: Option<ConsolidationReport>,
    /// Set when a lock cleared rows; the UI takes it to start the flash.
    clear_flash: bool,
    pub popups: Vec<ScorePopup>,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let grid = Grid::new(config.rows, config.cols);
        let first = Piece::new(TetrominoKind::random(&mut rng), &mut rng).spawned(&grid);
        let next = Piece::new(TetrominoKind::random(&mut rng), &mut rng);
        info!(
            "new game {}x{} difficulty {:?} seed {:?}",
            config.rows, config.cols, config.difficulty, config.seed
        );
        Self {
            grid,
            piece: Some(first),
            next,
            rng,
            difficulty: config.difficulty,
            rows_cleared: 0,
            merges: 0,
            pieces_locked: 0,
            reached_2048: false,
            last_report: None,
            clear_flash: false,
            popups: Vec::new(),
        }
    }

    /// Start over on the same grid allocation; the RNG carries on.
    pub fn restart(&mut self, difficulty: Difficulty) {
        self.grid.reset();
        self.difficulty = difficulty;
        self.rows_cleared = 0;
        self.merges = 0;
        self.pieces_locked = 0;
        self.reached_2048 = false;
        self.last_report = None;
        self.clear_flash = false;
        self.popups.clear();
        self.piece = None;
        self.next = Piece::new(TetrominoKind::random(&mut self.rng), &mut self.rng);
        self.spawn_next();
        info!("restart, difficulty {difficulty:?}");
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.grid.score()
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.grid.is_game_over()
    }

    pub fn max_tile_value(&self) -> u32 {
        self.grid.max_tile().map_or(0, |t| t.value())
    }

    /// True once after each lock that cleared rows.
    pub fn take_clear_flash(&mut self) -> bool {
        std::mem::take(&mut self.clear_flash)
    }

    /// Replace the active piece with `f(piece)` if the result fits.
    fn try_transform(&mut self, f: impl FnOnce(&Piece) -> Piece) -> bool {
        if self.is_game_over() {
            return false;
        }
        let Some(piece) = self.piece.as_ref() else {
            return false;
        };
        let candidate = f(piece);
        if candidate.fits(&self.grid) {
            self.piece = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.try_transform(|p| p.moved(0, -1))
    }

    pub fn move_right(&mut self) -> bool {
        self.try_transform(|p| p.moved(0, 1))
    }

    pub fn rotate_cw(&mut self) -> bool {
        self.try_transform(Piece::rotated_cw)
    }

    pub fn rotate_ccw(&mut self) -> bool {
        self.try_transform(Piece::rotated_ccw)
    }

    /// One row down, locking the piece if it cannot move.
    pub fn soft_drop(&mut self) {
        if !self.try_transform(|p| p.moved(-1, 0)) {
            self.lock_piece();
        }
    }

    /// Gravity tick; the same as a soft drop.
    pub fn tick_gravity(&mut self) {
        self.soft_drop();
    }

    pub fn hard_drop(&mut self) {
        while self.try_transform(|p| p.moved(-1, 0)) {}
        self.lock_piece();
    }

    /// Where the active piece would land on a hard drop.
    pub fn ghost(&self) -> Option<Piece> {
        let mut ghost = self.piece.clone()?;
        loop {
            let lower = ghost.moved(-1, 0);
            if !lower.fits(&self.grid) {
                return Some(ghost);
            }
            ghost = lower;
        }
    }

    fn lock_piece(&mut self) {
        if self.is_game_over() {
            return;
        }
        let Some(piece) = self.piece.take() else {
            return;
        };
        let (matrix, at) = piece.min_bounded_tile_matrix();
        let report = lock_and_consolidate(&mut self.grid, &matrix, at);
        self.pieces_locked += 1;
        self.rows_cleared += report.rows_cleared;
        self.merges += report.merges;
        self.last_report = Some(report);
        if report.rows_cleared > 0 {
            self.clear_flash = true;
        }
        if report.points > 0 {
            self.popups.push(ScorePopup {
                row: at.row.min(self.grid.rows() - 1),
                col: at.col,
                amount: report.points,
                age_ms: 0,
            });
        }
        if !self.reached_2048 && self.max_tile_value() >= WIN_TILE {
            self.reached_2048 = true;
            info!("reached {WIN_TILE} after {} pieces", self.pieces_locked);
        }
        if report.game_over {
            info!("game over, score {}", self.score());
            return;
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let upcoming = Piece::new(TetrominoKind::random(&mut self.rng), &mut self.rng);
        let piece = std::mem::replace(&mut self.next, upcoming).spawned(&self.grid);
        if !piece.fits(&self.grid) {
            self.grid.set_game_over();
            info!("no room to spawn {:?}, game over, score {}", piece.kind, self.score());
        }
        self.piece = Some(piece);
    }

    pub fn tick_popups(&mut self, delta_ms: u32) {
        self.popups.retain_mut(|p| {
            p.age_ms += delta_ms;
            p.age_ms < POPUP_LIFETIME_MS
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;
    use crate::tile::Tile;

    fn seeded(seed: u64) -> GameState {
        GameState::new(&GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        })
    }

    #[test]
    fn hard_drop_locks_and_spawns_next() {
        let mut g = seeded(1);
        let next_kind = g.next.kind;
        g.hard_drop();
        assert_eq!(g.pieces_locked, 1);
        assert_eq!(g.piece.as_ref().map(|p| p.kind), Some(next_kind));
        assert!(g.grid.occupied_count() > 0);
    }

    #[test]
    fn moves_stop_at_the_wall() {
        let mut g = seeded(2);
        let mut steps = 0;
        while g.move_left() {
            steps += 1;
            assert!(steps < 20);
        }
        let min_col = g.piece.as_ref().unwrap().tiles().map(|t| t.1).min().unwrap();
        assert_eq!(min_col, 0);
    }

    #[test]
    fn ghost_rests_directly_below_the_piece() {
        let g = seeded(3);
        let piece = g.piece.clone().unwrap();
        let ghost = g.ghost().unwrap();
        assert_eq!(ghost.col, piece.col);
        assert!(ghost.row <= piece.row);
        assert!(ghost.fits(&g.grid));
        assert!(!ghost.moved(-1, 0).fits(&g.grid));
        // On an empty grid the ghost's lowest tile is on the floor.
        assert_eq!(ghost.tiles().map(|t| t.0).min(), Some(0));
    }

    #[test]
    fn piece_stuck_at_the_top_ends_the_game() {
        let mut g = seeded(4);
        // Fill every row but the top one, leaving column 0 open so nothing clears.
        let (rows, cols) = (g.grid.rows(), g.grid.cols());
        for row in 0..rows - 1 {
            for col in 1..cols {
                let value = if row % 2 == 0 { 2 } else { 4 };
                g.grid.set(row, col, Cell::Tile(Tile::new(value)));
            }
        }
        // An O spawns with its upper half above the grid.
        let mut rng = StdRng::seed_from_u64(4);
        g.piece = Some(Piece::new(TetrominoKind::O, &mut rng).spawned(&g.grid));
        g.hard_drop();
        assert!(g.is_game_over());
        assert_eq!(g.pieces_locked, 1);
        assert!(g.last_report.is_some_and(|r| r.game_over));
        // Input after game over is ignored.
        g.hard_drop();
        assert!(!g.move_left());
        assert_eq!(g.pieces_locked, 1);
    }

    #[test]
    fn restart_clears_the_board_in_place() {
        let mut g = seeded(5);
        g.hard_drop();
        g.hard_drop();
        g.restart(Difficulty::Hard);
        assert_eq!(g.grid.occupied_count(), 0);
        assert_eq!(g.score(), 0);
        assert_eq!(g.pieces_locked, 0);
        assert_eq!(g.difficulty, Difficulty::Hard);
        assert!(g.piece.is_some());
    }

    #[test]
    fn popups_expire() {
        let mut g = seeded(6);
        g.popups.push(ScorePopup {
            row: 0,
            col: 0,
            amount: 8,
            age_ms: 0,
        });
        g.tick_popups(1000);
        assert_eq!(g.popups.len(), 1);
        g.tick_popups(600);
        assert!(g.popups.is_empty());
    }
}
