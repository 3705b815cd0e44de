//! Snake
//!
//! The snake moves one cell per tick. A tick is due once the time since the
//! last move reaches the current interval; the interval shrinks a little with
//! every food eaten, down to a floor.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::{Direction, Position};
use crate::game::{Game, GameKind, GamePhase, Key, RenderModel};
use crate::highscores::HighScore;
use crate::settings::SnakeTuning;

/// Snapshot handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct SnakeView {
    pub tiles: i32,
    /// Head first
    pub body: Vec<Position>,
    pub food: Position,
    pub score: u32,
    pub high_score: u32,
    pub game_over: bool,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Body,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    Ate,
    Crashed(Collision),
}

pub struct SnakeGame {
    tuning: SnakeTuning,
    rng: Pcg32,
    /// Head first
    body: VecDeque<Position>,
    /// Direction committed by the last tick
    direction: Direction,
    /// Latest accepted turn, applied at the next tick
    queued: Option<Direction>,
    restart_requested: bool,
    food: Position,
    score: u32,
    phase: GamePhase,
    interval_ms: f64,
    since_move_ms: f64,
    high_score: HighScore,
}

impl SnakeGame {
    pub fn new(tuning: SnakeTuning, high_score: HighScore, seed: u64) -> Self {
        let mut game = Self {
            body: VecDeque::from([tuning.start]),
            direction: Direction::Right,
            queued: None,
            restart_requested: false,
            food: Position::default(),
            score: 0,
            phase: GamePhase::Running,
            interval_ms: tuning.start_interval_ms,
            since_move_ms: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            high_score,
        };
        game.food = game.spawn_food().unwrap_or(game.food);
        game
    }

    /// Back to a fresh run; the stored best is re-read
    pub fn reset(&mut self) {
        self.body = VecDeque::from([self.tuning.start]);
        self.direction = Direction::Right;
        self.queued = None;
        self.restart_requested = false;
        self.score = 0;
        self.phase = GamePhase::Running;
        self.interval_ms = self.tuning.start_interval_ms;
        self.since_move_ms = 0.0;
        self.high_score.reload();
        if let Some(food) = self.spawn_food() {
            self.food = food;
        }
        log::info!("Snake restarted");
    }

    /// Uniform random free cell, or None when the snake covers the board
    pub fn spawn_food(&mut self) -> Option<Position> {
        let tiles = self.tuning.tiles;
        let cells = (tiles.max(0) as usize).saturating_mul(tiles.max(0) as usize);
        if self.body.len() >= cells {
            return None;
        }
        loop {
            let candidate = Position::new(
                self.rng.random_range(0..tiles),
                self.rng.random_range(0..tiles),
            );
            if !self.body.contains(&candidate) {
                return Some(candidate);
            }
        }
    }

    /// Queue a turn. Only turns across the committed direction's axis are
    /// accepted, so two quick presses can never fold the snake back onto
    /// its neck within one tick.
    pub fn handle_input(&mut self, key: Key) {
        if self.phase == GamePhase::GameOver {
            if key == Key::Restart {
                self.restart_requested = true;
            }
            return;
        }

        let wanted = match key {
            Key::Left => Direction::Left,
            Key::Right => Direction::Right,
            Key::Up => Direction::Up,
            Key::Down => Direction::Down,
            Key::Space | Key::Restart => return,
        };
        if wanted.is_perpendicular(self.direction) {
            self.queued = Some(wanted);
        }
    }

    /// Accumulate `elapsed_ms` and move once if a move is due
    pub fn tick(&mut self, elapsed_ms: f64) -> Option<TickOutcome> {
        if self.phase == GamePhase::GameOver {
            return None;
        }
        self.since_move_ms += elapsed_ms;
        if self.since_move_ms < self.interval_ms {
            return None;
        }
        self.since_move_ms = 0.0;
        Some(self.step())
    }

    /// One move, ignoring the timer
    fn step(&mut self) -> TickOutcome {
        if let Some(dir) = self.queued.take() {
            self.direction = dir;
        }

        let head = self.head().step(self.direction);
        let tiles = self.tuning.tiles;
        let collision = if !head.in_bounds(tiles, tiles) {
            Some(Collision::Wall)
        } else if self.body.contains(&head) {
            Some(Collision::Body)
        } else {
            None
        };
        if let Some(collision) = collision {
            self.game_over(collision);
            return TickOutcome::Crashed(collision);
        }

        self.body.push_front(head);

        if head == self.food {
            self.score = self.score.saturating_add(self.tuning.food_points);
            if let Some(food) = self.spawn_food() {
                self.food = food;
            }
            self.interval_ms = (self.interval_ms - self.tuning.interval_step_ms)
                .max(self.tuning.min_interval_ms);
            log::debug!(
                "Snake ate at ({}, {}), length {}, interval {}ms",
                head.x,
                head.y,
                self.body.len(),
                self.interval_ms
            );
            TickOutcome::Ate
        } else {
            self.body.pop_back();
            TickOutcome::Moved
        }
    }

    fn game_over(&mut self, collision: Collision) {
        self.phase = GamePhase::GameOver;
        log::info!(
            "Snake game over ({:?}) with score {}, length {}",
            collision,
            self.score,
            self.body.len()
        );
        self.high_score.submit(self.score);
    }

    pub fn head(&self) -> Position {
        // The body is never empty: it starts with one cell and only grows
        // or trades its tail for a new head.
        self.body[0]
    }

    pub fn body(&self) -> impl ExactSizeIterator<Item = &Position> {
        self.body.iter()
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn view(&self) -> SnakeView {
        SnakeView {
            tiles: self.tuning.tiles,
            body: self.body.iter().copied().collect(),
            food: self.food,
            score: self.score,
            high_score: self.high_score.best(),
            game_over: self.phase == GamePhase::GameOver,
        }
    }
}

impl Game for SnakeGame {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn press(&mut self, key: Key) -> bool {
        self.handle_input(key);
        // Space included: it would scroll the page mid-game
        true
    }

    fn advance(&mut self, dt_ms: f64) -> RenderModel {
        if self.restart_requested {
            self.reset();
        }
        self.tick(dt_ms);
        RenderModel::Snake(self.view())
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn score(&self) -> u32 {
        self.score
    }
}
