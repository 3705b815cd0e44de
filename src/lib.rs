//! Grid Arcade - Snake and falling-blocks games for the browser
//!
//! Core modules:
//! - `sim`: Grid simulations for both games (seeded, host-independent)
//! - `game`: The `Game` trait every host drives, plus input keys
//! - `runner`: Frame-loop driver with elapsed-time tracking and teardown
//! - `renderer`: Surface abstraction, per-game drawing, WebGPU presentation
//! - `storage`: Injected key-value store (memory / LocalStorage)
//! - `highscores`: Persisted best score per game
//! - `settings`: Data-driven game tuning

pub mod game;
pub mod highscores;
pub mod renderer;
pub mod runner;
pub mod settings;
pub mod sim;
pub mod storage;

pub use game::{Game, GameKind, GamePhase, Key, RenderModel, new_game};
pub use highscores::HighScore;
pub use runner::Runner;
pub use settings::{BlocksTuning, Settings, SnakeTuning};
pub use storage::{KeyValueStore, MemoryStore, StoreError};

/// Game configuration constants
pub mod consts {
    /// Snake board size in cells (square)
    pub const SNAKE_TILES: i32 = 25;
    /// Snake move interval at game start (ms per move)
    pub const SNAKE_START_INTERVAL_MS: f64 = 100.0;
    /// Interval reduction per food eaten
    pub const SNAKE_INTERVAL_STEP_MS: f64 = 1.0;
    /// Fastest the snake can get
    pub const SNAKE_MIN_INTERVAL_MS: f64 = 50.0;
    /// Points per food
    pub const FOOD_POINTS: u32 = 10;

    /// Blocks board dimensions
    pub const BLOCKS_WIDTH: i32 = 10;
    pub const BLOCKS_HEIGHT: i32 = 20;
    /// Gravity interval (ms per row)
    pub const DROP_INTERVAL_MS: f64 = 1000.0;
    /// Points per cleared line
    pub const LINE_POINTS: u32 = 100;
    /// Points per soft-drop row
    pub const SOFT_DROP_POINTS: u32 = 1;

    /// Longest frame the runner will feed into a game (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f64 = 250.0;
}
