//! Core game state and logic
//!
//! The engine owns the board and the active piece and exposes spawn, move,
//! rotate and tick. It never blocks and never touches I/O; frame pacing and
//! rendering belong to the driver loop in `main`.

use std::error::Error;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::{Board, BOARD_WIDTH, MODULE_HEIGHT};
use crate::piece::Piece;
use crate::shape::ShapeKind;

/// Points for the first row cleared in a tick; every further row in the
/// same tick is worth four times the previous one
const FIRST_ROW_POINTS: u64 = 100;

/// Whether the simulation is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InPlay,
    /// Terminal: a piece came to rest with the top row occupied
    Over,
}

/// Input commands the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCW,
}

/// Board height was not a positive multiple of the module height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidConfig {
    pub height: usize,
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "board height {} is not a positive multiple of {}",
            self.height, MODULE_HEIGHT
        )
    }
}

impl Error for InvalidConfig {}

/// The main game struct
pub struct Game {
    /// The settled grid, including the active piece's current footprint
    pub board: Board,
    /// Cumulative score, monotone within a game
    pub score: u64,
    pub status: GameStatus,
    /// The falling piece; always present while the game runs
    piece: Piece,
    rng: ChaCha8Rng,
    /// Requests a shorter tick interval from the driver; engine logic
    /// ignores it
    drop_fast: bool,
}

impl Game {
    /// Create a new game with a random spawn sequence
    pub fn new(height: usize) -> Result<Self, InvalidConfig> {
        Self::with_seed(height, rand::random())
    }

    /// Create a new game with a fixed seed (reproducible spawn sequence)
    pub fn with_seed(height: usize, seed: u64) -> Result<Self, InvalidConfig> {
        if height == 0 || height % MODULE_HEIGHT != 0 {
            return Err(InvalidConfig { height });
        }
        let mut game = Self {
            board: Board::new(height),
            score: 0,
            status: GameStatus::InPlay,
            piece: Piece::from_columns([]),
            rng: ChaCha8Rng::seed_from_u64(seed),
            drop_fast: false,
        };
        game.spawn();
        Ok(game)
    }

    /// Whether the driver should use the reduced tick interval
    pub fn fast_drop(&self) -> bool {
        self.drop_fast
    }

    /// Apply one input command
    ///
    /// The piece's old footprint is cleared before the operation and the new
    /// footprint written after, so validity checks see the board without the
    /// piece itself. Rejected transforms leave the piece where it was.
    pub fn apply(&mut self, action: Action) {
        if self.status == GameStatus::Over {
            return;
        }
        self.set_piece(false);
        match action {
            Action::MoveLeft => self.move_horizontally(-1),
            Action::MoveRight => self.move_horizontally(1),
            Action::SoftDrop => self.drop_fast = true,
            Action::RotateCW => self.rotate(),
        }
        self.set_piece(true);
    }

    /// Advance the simulation by one frame
    pub fn tick(&mut self) {
        if self.status == GameStatus::Over {
            return;
        }
        if self.is_resting() {
            if self.at_top() {
                self.status = GameStatus::Over;
                tracing::info!(score = self.score, "top-out");
                return;
            }
            let points = self.remove_complete_rows();
            self.score += points;
            self.spawn();
        } else {
            self.set_piece(false);
            self.piece.move_down();
            self.set_piece(true);
        }
    }

    /// Deep-copy a uniformly random template and make it the active piece
    fn spawn(&mut self) {
        let kinds = ShapeKind::all();
        let kind = kinds[self.rng.gen_range(0..kinds.len())];
        self.spawn_kind(kind);
    }

    /// Spawn a specific shape
    ///
    /// Deliberately not validity-checked: if the top rows are already
    /// occupied the piece overlaps them and the next tick's resting check
    /// ends the game.
    fn spawn_kind(&mut self, kind: ShapeKind) {
        tracing::debug!(?kind, "spawn");
        self.piece = kind.blueprint(self.board.height() as i32);
        self.set_piece(true);
        self.drop_fast = false;
    }

    /// Write (or erase) the active piece's footprint on the board
    fn set_piece(&mut self, occupied: bool) {
        for (col, row) in self.piece.cells() {
            self.board.set(row, col, occupied);
        }
    }

    /// The single gatekeeper for movement and rotation: every cell of the
    /// candidate must be in bounds and unoccupied. Callers clear the active
    /// piece's footprint first, so the piece never collides with itself.
    fn is_available(&self, candidate: &Piece) -> bool {
        candidate.cells().all(|(col, row)| {
            (0..BOARD_WIDTH as i32).contains(&col)
                && (0..self.board.height() as i32).contains(&row)
                && !self.board.is_occupied(row, col)
        })
    }

    /// Shift the piece sideways if the target cells are free; silently
    /// bounce off walls and obstacles otherwise
    fn move_horizontally(&mut self, delta: i32) {
        let candidate = self.piece.shifted(delta);
        if self.is_available(&candidate) {
            self.piece = candidate;
        }
    }

    /// Rotate the piece clockwise about its centroid; abandoned entirely if
    /// the corrected candidate collides
    fn rotate(&mut self) {
        let candidate = self.piece.rotated(self.board.height() as i32);
        if self.is_available(&candidate) {
            self.piece = candidate;
        }
    }

    /// A piece rests when any column's lowest cell sits on the floor or
    /// directly above a settled cell
    fn is_resting(&self) -> bool {
        self.piece.lowest_rows().any(|(col, row)| {
            row == 0 || self.board.is_occupied(row - 1, col)
        })
    }

    /// Any occupied cell in the topmost row
    fn at_top(&self) -> bool {
        let top = self.board.height() as i32 - 1;
        (0..BOARD_WIDTH as i32).any(|col| self.board.is_occupied(top, col))
    }

    /// Collapse every full row and return the points awarded this tick:
    /// 100 for the first row, then 400, 1600, 6400 for the rest
    fn remove_complete_rows(&mut self) -> u64 {
        let mut points = 0;
        let mut row_value = 0;
        for row in (0..self.board.height()).rev() {
            if self.board.is_row_full(row) {
                self.board.collapse_row(row);
                row_value = if row_value == 0 {
                    FIRST_ROW_POINTS
                } else {
                    row_value * 4
                };
                points += row_value;
            }
        }
        if points > 0 {
            tracing::debug!(points, "rows cleared");
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Game with a known active shape instead of a random one
    fn game_with(height: usize, kind: ShapeKind) -> Game {
        let mut game = Game::with_seed(height, 1).unwrap();
        game.set_piece(false);
        game.spawn_kind(kind);
        game
    }

    fn fill_row(game: &mut Game, row: i32, except: &[i32]) {
        for col in 0..BOARD_WIDTH as i32 {
            if !except.contains(&col) {
                game.board.set(row, col, true);
            }
        }
    }

    #[test]
    fn test_rejects_invalid_height() {
        assert_eq!(Game::with_seed(0, 1).err(), Some(InvalidConfig { height: 0 }));
        assert_eq!(
            Game::with_seed(12, 1).err(),
            Some(InvalidConfig { height: 12 })
        );
        assert!(Game::with_seed(8, 1).is_ok());
        assert!(Game::with_seed(24, 1).is_ok());
    }

    #[test]
    fn test_spawn_writes_footprint() {
        let game = game_with(8, ShapeKind::J);
        assert!(game.board.is_occupied(7, 2));
        assert!(game.board.is_occupied(7, 3));
        assert!(game.board.is_occupied(7, 4));
        assert!(game.board.is_occupied(6, 4));
        assert_eq!(game.status, GameStatus::InPlay);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_is_available_rejects_bounds_and_collisions() {
        let mut game = game_with(8, ShapeKind::O);
        game.set_piece(false);
        game.board.set(3, 3, true);

        assert!(!game.is_available(&Piece::from_columns([(-1, vec![4])])));
        assert!(!game.is_available(&Piece::from_columns([(8, vec![4])])));
        assert!(!game.is_available(&Piece::from_columns([(4, vec![-1])])));
        assert!(!game.is_available(&Piece::from_columns([(4, vec![8])])));
        assert!(!game.is_available(&Piece::from_columns([(3, vec![3])])));
        assert!(game.is_available(&Piece::from_columns([(4, vec![3, 4])])));
    }

    #[test]
    fn test_move_bounces_off_wall() {
        let mut game = game_with(8, ShapeKind::J);
        // J spans columns 2..=4; two steps reach the wall, the third is a no-op
        game.apply(Action::MoveLeft);
        game.apply(Action::MoveRight);
        game.apply(Action::MoveLeft);
        game.apply(Action::MoveLeft);
        game.apply(Action::MoveLeft);
        assert!(game.board.is_occupied(7, 0));
        assert!(game.board.is_occupied(7, 2));
        assert!(!game.board.is_occupied(7, 3));
        assert_eq!(
            game.piece,
            Piece::from_columns([(0, vec![7]), (1, vec![7]), (2, vec![7, 6])])
        );
    }

    #[test]
    fn test_move_bounces_off_occupied_cells() {
        let mut game = game_with(8, ShapeKind::O);
        game.board.set(7, 5, true);
        let before = game.piece.clone();
        game.apply(Action::MoveRight);
        assert_eq!(game.piece, before);
    }

    #[test]
    fn test_soft_drop_sets_flag_until_next_spawn() {
        let mut game = game_with(8, ShapeKind::O);
        assert!(!game.fast_drop());
        game.apply(Action::SoftDrop);
        assert!(game.fast_drop());
        // Drop to the floor and rest; the fresh spawn clears the flag
        for _ in 0..8 {
            game.tick();
        }
        assert!(!game.fast_drop());
    }

    #[test]
    fn test_rotation_abandoned_when_blocked() {
        let mut game = game_with(16, ShapeKind::I);
        // Occupy the column the bar would pivot into
        game.board.set(13, 4, true);
        let before = game.piece.clone();
        game.apply(Action::RotateCW);
        assert_eq!(game.piece, before);
        // The blocker is still there and the footprint did not move
        assert!(game.board.is_occupied(13, 4));
        assert!(game.board.is_occupied(15, 2));
    }

    #[test]
    fn test_rotation_commits_in_open_space() {
        let mut game = game_with(16, ShapeKind::T);
        for _ in 0..5 {
            game.tick();
        }
        game.apply(Action::RotateCW);
        let cols: Vec<i32> = game.piece.cells().map(|(col, _)| col).collect();
        // T pivots from 3 columns into 2
        assert_eq!(cols.iter().collect::<std::collections::BTreeSet<_>>().len(), 2);
    }

    #[test]
    fn test_tick_moves_piece_down() {
        let mut game = game_with(8, ShapeKind::I);
        game.tick();
        assert!(!game.board.is_occupied(7, 2));
        assert!(game.board.is_occupied(6, 2));
        assert!(game.board.is_occupied(6, 5));
    }

    #[test]
    fn test_piece_merges_at_rest_and_new_piece_spawns() {
        let mut game = game_with(8, ShapeKind::J);
        // Descend 6 rows until the tail column reaches the floor, then one
        // more tick to detect resting
        for _ in 0..7 {
            game.tick();
        }
        assert_eq!(game.status, GameStatus::InPlay);
        // Old piece merged at its final position
        assert!(game.board.is_occupied(1, 2));
        assert!(game.board.is_occupied(1, 3));
        assert!(game.board.is_occupied(1, 4));
        assert!(game.board.is_occupied(0, 4));
        // A fresh piece occupies the top row again
        let top_occupied =
            (0..BOARD_WIDTH as i32).any(|col| game.board.is_occupied(7, col));
        assert!(top_occupied);
    }

    #[test]
    fn test_single_line_clear_scores_100() {
        let mut game = game_with(8, ShapeKind::I);
        fill_row(&mut game, 0, &[2, 3, 4, 5]);
        for _ in 0..8 {
            game.tick();
        }
        assert_eq!(game.score, 100);
        assert_eq!(game.status, GameStatus::InPlay);
        // Collapsed: nothing left on the floor outside the fresh spawn rows
        assert!(!game.board.is_occupied(0, 0));
        assert!(!game.board.is_occupied(0, 7));
    }

    #[test]
    fn test_double_line_clear_scores_500() {
        let mut game = game_with(8, ShapeKind::O);
        fill_row(&mut game, 0, &[3, 4]);
        fill_row(&mut game, 1, &[3, 4]);
        for _ in 0..7 {
            game.tick();
        }
        assert_eq!(game.score, 500);
    }

    #[test]
    fn test_cascading_clear_points() {
        let mut game = game_with(16, ShapeKind::O);
        game.set_piece(false);

        fill_row(&mut game, 0, &[]);
        assert_eq!(game.remove_complete_rows(), 100);

        fill_row(&mut game, 0, &[]);
        fill_row(&mut game, 1, &[]);
        assert_eq!(game.remove_complete_rows(), 500);

        fill_row(&mut game, 0, &[]);
        fill_row(&mut game, 1, &[]);
        fill_row(&mut game, 2, &[]);
        assert_eq!(game.remove_complete_rows(), 2100);

        fill_row(&mut game, 0, &[]);
        fill_row(&mut game, 1, &[]);
        fill_row(&mut game, 2, &[]);
        fill_row(&mut game, 3, &[]);
        assert_eq!(game.remove_complete_rows(), 8500);
    }

    #[test]
    fn test_clear_collapses_only_full_rows() {
        let mut game = game_with(16, ShapeKind::O);
        game.set_piece(false);
        fill_row(&mut game, 0, &[]);
        game.board.set(1, 6, true);
        game.board.set(2, 1, true);

        assert_eq!(game.remove_complete_rows(), 100);
        assert!(game.board.is_occupied(0, 6));
        assert!(game.board.is_occupied(1, 1));
        assert!(!game.board.is_occupied(2, 1));
    }

    #[test]
    fn test_top_out_ends_game_and_freezes_board() {
        let mut game = game_with(8, ShapeKind::J);
        // Stack everything below the spawn rows so the piece rests at once
        for row in 0..6 {
            fill_row(&mut game, row, &[]);
        }
        game.tick();
        assert_eq!(game.status, GameStatus::Over);

        // Terminal: neither ticks nor input mutate anything afterwards
        let frozen = game.board.clone();
        let score = game.score;
        game.tick();
        game.apply(Action::MoveLeft);
        game.apply(Action::RotateCW);
        assert_eq!(game.board, frozen);
        assert_eq!(game.score, score);
    }

    #[test]
    fn test_overlapping_spawn_ends_game_one_tick_later() {
        let mut game = game_with(8, ShapeKind::O);
        game.set_piece(false);
        // Settled stack already reaching into the spawn rows
        game.board.set(6, 3, true);
        game.board.set(5, 3, true);

        // Spawn is not validity-checked: the piece is written over the
        // stack and the game is still in play
        game.spawn_kind(ShapeKind::O);
        assert_eq!(game.status, GameStatus::InPlay);

        // The very next tick finds the piece resting with the top row
        // occupied and ends the game
        game.tick();
        assert_eq!(game.status, GameStatus::Over);
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let mut a = Game::with_seed(16, 42).unwrap();
        let mut b = Game::with_seed(16, 42).unwrap();
        for _ in 0..120 {
            a.tick();
            b.tick();
            assert_eq!(a.board, b.board);
            assert_eq!(a.score, b.score);
        }
    }
}
