//! Falling blocks
//!
//! Gravity pulls the active piece down one row per drop interval. When it
//! can't move down it is locked into the grid, full rows are cleared, and
//! the next piece spawns at the top center. A spawn that already collides
//! ends the game.
//!
//! Rows above the board (y < 0) are never collision-checked, so a piece may
//! hang partly above the top edge.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::piece::{Piece, PieceKind, Shape};
use crate::game::{Game, GameKind, GamePhase, Key, RenderModel};
use crate::highscores::HighScore;
use crate::settings::BlocksTuning;

/// Moves buffered beyond this are dropped
const MAX_PENDING_MOVES: usize = 16;

/// Snapshot handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct BlocksView {
    pub width: i32,
    pub height: i32,
    /// Color index per cell, row-major, 0 = empty
    pub grid: Vec<Vec<u8>>,
    /// Active piece cells in board coordinates (some may have y < 0)
    pub piece_cells: Vec<(i32, i32)>,
    pub piece_color: u8,
    pub score: u32,
    pub high_score: u32,
    pub game_over: bool,
}

pub struct BlocksGame {
    tuning: BlocksTuning,
    rng: Pcg32,
    grid: Vec<Vec<u8>>,
    piece: Piece,
    score: u32,
    phase: GamePhase,
    drop_counter_ms: f64,
    pending: VecDeque<Key>,
    high_score: HighScore,
}

impl BlocksGame {
    pub fn new(tuning: BlocksTuning, high_score: HighScore, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let kind = PieceKind::ALL[rng.random_range(0..PieceKind::ALL.len())];
        let mut game = Self {
            grid: vec![vec![0; tuning.width as usize]; tuning.height as usize],
            piece: Piece::spawn(kind, tuning.width),
            score: 0,
            phase: GamePhase::Running,
            drop_counter_ms: 0.0,
            pending: VecDeque::new(),
            rng,
            tuning,
            high_score,
        };
        game.check_spawn();
        game
    }

    /// Pick a random kind and place it at the top center
    pub fn spawn_piece(&mut self) {
        let kind = PieceKind::ALL[self.rng.random_range(0..PieceKind::ALL.len())];
        self.piece = Piece::spawn(kind, self.tuning.width);
        self.check_spawn();
    }

    fn check_spawn(&mut self) {
        if self.collides(0, 0, &self.piece.shape) {
            self.phase = GamePhase::GameOver;
            log::info!("Blocks game over with score {}", self.score);
            self.high_score.submit(self.score);
        }
    }

    /// Would `shape`, placed at the active piece's position plus (dx, dy),
    /// leave the board or overlap a filled cell?
    pub fn collides(&self, dx: i32, dy: i32, shape: &Shape) -> bool {
        let (width, height) = (self.tuning.width, self.tuning.height);
        shape.cells().any(|(cx, cy)| {
            let x = self.piece.x + cx + dx;
            let y = self.piece.y + cy + dy;
            if x < 0 || x >= width || y >= height {
                return true;
            }
            y >= 0 && self.grid[y as usize][x as usize] != 0
        })
    }

    /// Shift the piece if the target is free
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.collides(dx, dy, &self.piece.shape) {
            return false;
        }
        self.piece.x += dx;
        self.piece.y += dy;
        true
    }

    /// Rotate 90° clockwise in place; silently refused if it would collide
    pub fn rotate(&mut self) -> bool {
        let rotated = self.piece.shape.rotated_cw();
        if self.collides(0, 0, &rotated) {
            return false;
        }
        self.piece.shape = rotated;
        true
    }

    /// Stamp the piece into the grid, clear full rows, spawn the next piece.
    /// Returns the number of rows cleared.
    pub fn lock_and_clear(&mut self) -> u32 {
        let color = self.piece.kind.color();
        let cells: Vec<(i32, i32)> = self.piece.cells().collect();
        for (x, y) in cells {
            // Cells still above the board have nowhere to go
            if y >= 0 {
                self.grid[y as usize][x as usize] = color;
            }
        }

        let lines = self.clear_lines();
        if lines > 0 {
            self.score = self
                .score
                .saturating_add(lines.saturating_mul(self.tuning.line_points));
            log::debug!("Cleared {} line(s), score {}", lines, self.score);
        }

        self.spawn_piece();
        lines
    }

    /// Remove full rows bottom-up, inserting an empty row on top for each
    fn clear_lines(&mut self) -> u32 {
        let width = self.tuning.width as usize;
        let mut cleared = 0;
        let mut y = self.grid.len();
        while y > 0 {
            let row = y - 1;
            if self.grid[row].iter().all(|&c| c != 0) {
                self.grid.remove(row);
                self.grid.insert(0, vec![0; width]);
                cleared += 1;
                // Same index again: the row above slid into it
            } else {
                y -= 1;
            }
        }
        cleared
    }

    /// Accumulate `elapsed_ms`; past the drop interval, fall one row or lock
    pub fn tick(&mut self, elapsed_ms: f64) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.drop_counter_ms += elapsed_ms;
        if self.drop_counter_ms > self.tuning.drop_interval_ms {
            self.drop_counter_ms = 0.0;
            if !self.try_move(0, 1) {
                self.lock_and_clear();
            }
        }
    }

    fn apply(&mut self, key: Key) {
        match key {
            Key::Left => {
                self.try_move(-1, 0);
            }
            Key::Right => {
                self.try_move(1, 0);
            }
            Key::Down => {
                if self.try_move(0, 1) {
                    self.score = self.score.saturating_add(self.tuning.soft_drop_points);
                }
            }
            Key::Up | Key::Space => {
                self.rotate();
            }
            Key::Restart => {}
        }
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    pub fn grid(&self) -> &[Vec<u8>] {
        &self.grid
    }

    pub fn view(&self) -> BlocksView {
        BlocksView {
            width: self.tuning.width,
            height: self.tuning.height,
            grid: self.grid.clone(),
            piece_cells: self.piece.cells().collect(),
            piece_color: self.piece.kind.color(),
            score: self.score,
            high_score: self.high_score.best(),
            game_over: self.phase == GamePhase::GameOver,
        }
    }
}

impl Game for BlocksGame {
    fn kind(&self) -> GameKind {
        GameKind::Blocks
    }

    fn press(&mut self, key: Key) -> bool {
        if self.phase == GamePhase::GameOver || key == Key::Restart {
            return false;
        }
        if self.pending.len() < MAX_PENDING_MOVES {
            self.pending.push_back(key);
        }
        true
    }

    fn advance(&mut self, dt_ms: f64) -> RenderModel {
        while let Some(key) = self.pending.pop_front() {
            if self.phase == GamePhase::GameOver {
                self.pending.clear();
                break;
            }
            self.apply(key);
        }
        self.tick(dt_ms);
        RenderModel::Blocks(self.view())
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use proptest::prelude::*;

    fn game_with_store(store: MemoryStore, seed: u64) -> BlocksGame {
        let high = HighScore::load(Box::new(store), HighScore::BLOCKS_KEY);
        BlocksGame::new(BlocksTuning::default(), high, seed)
    }

    fn game(seed: u64) -> BlocksGame {
        game_with_store(MemoryStore::new(), seed)
    }

    fn place(game: &mut BlocksGame, kind: PieceKind, x: i32, y: i32) {
        game.piece = Piece {
            kind,
            shape: kind.shape(),
            x,
            y,
        };
    }

    /// Fill a row except for the given columns
    fn fill_row(game: &mut BlocksGame, y: usize, holes: &[usize]) {
        for x in 0..10 {
            game.grid[y][x] = if holes.contains(&x) { 0 } else { 9 };
        }
    }

    #[test]
    fn test_new_game_spawns_at_top_center() {
        let g = game(1);
        assert_eq!(g.phase(), GamePhase::Running);
        assert_eq!(g.piece().y, 0);
        let expected_x = 5 - g.piece().shape.width() / 2;
        assert_eq!(g.piece().x, expected_x);
        assert_eq!(g.grid().len(), 20);
        assert!(g.grid().iter().all(|row| row.len() == 10 && row.iter().all(|&c| c == 0)));
    }

    #[test]
    fn test_walls_and_floor_collide() {
        let mut g = game(1);
        place(&mut g, PieceKind::O, 0, 18);
        assert!(g.collides(-1, 0, &g.piece.shape));
        assert!(g.collides(0, 1, &g.piece.shape));
        assert!(!g.collides(1, 0, &g.piece.shape));

        place(&mut g, PieceKind::O, 8, 0);
        assert!(g.collides(1, 0, &g.piece.shape));
    }

    #[test]
    fn test_cells_above_board_are_not_checked() {
        let mut g = game(1);
        fill_row(&mut g, 0, &[]);
        // Vertical I hanging three rows above the top, bottom cell at y=0
        g.piece = Piece {
            kind: PieceKind::I,
            shape: PieceKind::I.shape().rotated_cw(),
            x: 4,
            y: -3,
        };
        assert!(g.collides(0, 0, &g.piece.shape));
        assert!(!g.collides(0, -1, &g.piece.shape));
        // Entirely above the board only the side walls count
        assert!(!g.collides(0, -10, &g.piece.shape));
    }

    #[test]
    fn test_rotation_blocked_by_wall_keeps_shape() {
        let mut g = game(1);
        // Vertical I against the right wall; horizontal needs 4 columns
        g.piece = Piece {
            kind: PieceKind::I,
            shape: PieceKind::I.shape().rotated_cw(),
            x: 9,
            y: 5,
        };
        let before = g.piece.clone();
        assert!(!g.rotate());
        assert_eq!(g.piece, before);
    }

    #[test]
    fn test_rotation_blocked_by_stack_keeps_shape() {
        let mut g = game(1);
        place(&mut g, PieceKind::T, 3, 17);
        // Rotated T spans rows 17..=19 in column 3 and row 18 in column 4
        g.grid[18][4] = 9;
        let before = g.piece.clone();
        assert!(!g.rotate());
        assert_eq!(g.piece, before);
    }

    #[test]
    fn test_rotation_applies_when_free() {
        let mut g = game(1);
        place(&mut g, PieceKind::T, 4, 5);
        assert!(g.rotate());
        assert_eq!(g.piece.shape, PieceKind::T.shape().rotated_cw());
        assert_eq!((g.piece.x, g.piece.y), (4, 5));
    }

    #[test]
    fn test_single_line_clear_scenario() {
        let mut g = game(2);
        fill_row(&mut g, 19, &[3, 4, 5, 6]);
        g.grid[18][0] = 7;
        place(&mut g, PieceKind::I, 3, 19);

        assert_eq!(g.lock_and_clear(), 1);
        assert_eq!(g.score(), 100);
        // The marker above slid down into the bottom row
        assert_eq!(g.grid[19][0], 7);
        assert!(g.grid[19][1..].iter().all(|&c| c == 0));
        assert!(g.grid[0].iter().all(|&c| c == 0));
        assert_eq!(g.grid.len(), 20);
    }

    #[test]
    fn test_lock_stamps_piece_color() {
        let mut g = game(2);
        place(&mut g, PieceKind::O, 0, 18);
        assert_eq!(g.lock_and_clear(), 0);
        assert_eq!(g.grid[18][0], PieceKind::O.color());
        assert_eq!(g.grid[19][1], PieceKind::O.color());
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn test_lock_ignores_cells_above_board() {
        let mut g = game(2);
        g.piece = Piece {
            kind: PieceKind::I,
            shape: PieceKind::I.shape().rotated_cw(),
            x: 0,
            y: -2,
        };
        g.lock_and_clear();
        assert_eq!(g.grid[0][0], PieceKind::I.color());
        assert_eq!(g.grid[1][0], PieceKind::I.color());
        assert_eq!(g.grid[2][0], 0);
    }

    #[test]
    fn test_multi_line_clear_with_gap() {
        let mut g = game(3);
        // Rows 19, 18 and 16 complete once the vertical I fills column 9;
        // row 17 keeps a hole and must survive, shifted to the bottom
        fill_row(&mut g, 19, &[9]);
        fill_row(&mut g, 18, &[9]);
        fill_row(&mut g, 17, &[0, 9]);
        fill_row(&mut g, 16, &[9]);
        g.piece = Piece {
            kind: PieceKind::I,
            shape: PieceKind::I.shape().rotated_cw(),
            x: 9,
            y: 16,
        };

        assert_eq!(g.lock_and_clear(), 3);
        assert_eq!(g.score(), 300);
        assert_eq!(g.grid[19][0], 0);
        assert!(g.grid[19][1..].iter().all(|&c| c != 0));
        assert!(g.grid[..19].iter().all(|row| row.iter().all(|&c| c == 0)));
    }

    #[test]
    fn test_tick_drops_after_interval() {
        let mut g = game(4);
        let y = g.piece().y;
        g.tick(1000.0);
        // Strictly greater than the interval
        assert_eq!(g.piece().y, y);
        g.tick(1.0);
        assert_eq!(g.piece().y, y + 1);
        assert_eq!(g.drop_counter_ms, 0.0);
    }

    #[test]
    fn test_tick_locks_on_floor() {
        let mut g = game(4);
        place(&mut g, PieceKind::O, 0, 18);
        g.tick(1001.0);
        assert_eq!(g.grid[19][0], PieceKind::O.color());
        assert_eq!(g.piece().y, 0);
    }

    #[test]
    fn test_spawn_collision_ends_game_and_saves() {
        let store = MemoryStore::new();
        let mut g = game_with_store(store.clone(), 5);
        g.score = 250;
        fill_row(&mut g, 0, &[0]);
        fill_row(&mut g, 1, &[0]);
        place(&mut g, PieceKind::O, 0, 18);
        g.lock_and_clear();

        assert_eq!(g.phase(), GamePhase::GameOver);
        assert_eq!(store.get(HighScore::BLOCKS_KEY).as_deref(), Some("250"));

        // Terminal: input and time do nothing
        assert!(!g.press(Key::Left));
        let before = g.view();
        let after = g.advance(5_000.0);
        assert_eq!(after, RenderModel::Blocks(before));
    }

    #[test]
    fn test_input_is_buffered_until_advance() {
        let mut g = game(6);
        place(&mut g, PieceKind::O, 4, 5);
        assert!(g.press(Key::Left));
        assert!(g.press(Key::Left));
        assert!(g.press(Key::Down));
        assert_eq!(g.piece().x, 4);

        g.advance(0.0);
        assert_eq!(g.piece().x, 2);
        assert_eq!(g.piece().y, 6);
        assert_eq!(g.score(), 1);
    }

    #[test]
    fn test_soft_drop_on_floor_scores_nothing() {
        let mut g = game(6);
        place(&mut g, PieceKind::O, 4, 18);
        g.press(Key::Down);
        g.advance(0.0);
        assert_eq!(g.piece().y, 18);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn test_restart_key_is_not_consumed() {
        let mut g = game(6);
        assert!(!g.press(Key::Restart));
        assert!(g.pending.is_empty());
    }

    #[test]
    fn test_pending_moves_are_capped() {
        let mut g = game(6);
        for _ in 0..100 {
            g.press(Key::Right);
        }
        assert_eq!(g.pending.len(), MAX_PENDING_MOVES);
    }

    proptest! {
        #[test]
        fn prop_full_rows_award_points_per_line(
            rows in prop::collection::btree_set(0usize..20, 1..5),
            seed in any::<u64>(),
        ) {
            let mut g = game(seed);
            // Fill the chosen rows directly and clear them in one pass
            for &y in &rows {
                fill_row(&mut g, y, &[]);
            }
            // Marker in an untouched row must survive and shift
            let marker_row = (0..20).rev().find(|y| !rows.contains(y));
            if let Some(m) = marker_row {
                g.grid[m][0] = 8;
            }

            let cleared = g.clear_lines();
            prop_assert_eq!(cleared as usize, rows.len());
            prop_assert_eq!(g.grid.len(), 20);
            prop_assert!(g.grid.iter().all(|row| row.len() == 10));
            for y in 0..rows.len() {
                prop_assert!(g.grid[y].iter().all(|&c| c == 0));
            }
            if let Some(m) = marker_row {
                let below = rows.iter().filter(|&&r| r > m).count();
                prop_assert_eq!(g.grid[m + below][0], 8);
            }
        }

        #[test]
        fn prop_piece_never_overlaps_stack(
            seed in any::<u64>(),
            keys in prop::collection::vec(
                prop_oneof![Just(Key::Left), Just(Key::Right), Just(Key::Down), Just(Key::Up)],
                1..150,
            ),
        ) {
            let mut g = game(seed);
            for key in keys {
                g.press(key);
                g.advance(1001.0);
                if g.phase() == GamePhase::GameOver {
                    break;
                }
                prop_assert!(!g.collides(0, 0, &g.piece.shape));
            }
        }
    }
}
