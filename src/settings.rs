//! Game settings and tuning
//!
//! Persisted as JSON in the key-value store. Every field has a serde
//! default, so older or hand-edited entries still load.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::Position;
use crate::storage::{KeyValueStore, StoreError};

/// Snake tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeTuning {
    /// Board width/height in cells
    pub tiles: i32,
    /// Head position of a fresh snake
    pub start: Position,
    /// Move interval at game start (ms)
    pub start_interval_ms: f64,
    /// Interval reduction per food eaten (ms)
    pub interval_step_ms: f64,
    /// Fastest allowed interval (ms)
    pub min_interval_ms: f64,
    pub food_points: u32,
}

impl Default for SnakeTuning {
    fn default() -> Self {
        Self {
            tiles: SNAKE_TILES,
            start: Position::new(SNAKE_TILES / 2, SNAKE_TILES / 2),
            start_interval_ms: SNAKE_START_INTERVAL_MS,
            interval_step_ms: SNAKE_INTERVAL_STEP_MS,
            min_interval_ms: SNAKE_MIN_INTERVAL_MS,
            food_points: FOOD_POINTS,
        }
    }
}

/// Falling-blocks tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocksTuning {
    pub width: i32,
    pub height: i32,
    /// Gravity interval (ms per row)
    pub drop_interval_ms: f64,
    pub line_points: u32,
    pub soft_drop_points: u32,
}

impl Default for BlocksTuning {
    fn default() -> Self {
        Self {
            width: BLOCKS_WIDTH,
            height: BLOCKS_HEIGHT,
            drop_interval_ms: DROP_INTERVAL_MS,
            line_points: LINE_POINTS,
            soft_drop_points: SOFT_DROP_POINTS,
        }
    }
}

/// All player-facing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snake: SnakeTuning,
    pub blocks: BlocksTuning,
    /// Draw the snake board's grid lines
    pub show_grid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snake: SnakeTuning::default(),
            blocks: BlocksTuning::default(),
            show_grid: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "grid_arcade_settings";

    /// Smallest board either game accepts
    const MIN_BOARD: i32 = 4;
    /// Largest board either game accepts
    const MAX_BOARD: i32 = 100;
    /// Cap on any single points award
    const MAX_POINTS: u32 = 10_000;

    /// Load from the store, falling back to defaults on a missing or bad entry
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from storage");
                    return settings.sanitized();
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        // Serializing plain numbers and bools cannot fail
        let json = serde_json::to_string(self).unwrap_or_default();
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp values that would make a game unplayable
    pub fn sanitized(mut self) -> Self {
        let snake = &mut self.snake;
        snake.tiles = snake.tiles.clamp(Self::MIN_BOARD, Self::MAX_BOARD);
        if !snake.start.in_bounds(snake.tiles, snake.tiles) {
            snake.start = Position::new(snake.tiles / 2, snake.tiles / 2);
        }
        snake.start_interval_ms = positive_or(snake.start_interval_ms, SNAKE_START_INTERVAL_MS);
        if !snake.interval_step_ms.is_finite() || snake.interval_step_ms < 0.0 {
            snake.interval_step_ms = SNAKE_INTERVAL_STEP_MS;
        }
        snake.min_interval_ms = positive_or(snake.min_interval_ms, SNAKE_MIN_INTERVAL_MS)
            .max(1.0)
            .min(snake.start_interval_ms);
        snake.food_points = snake.food_points.min(Self::MAX_POINTS);

        let blocks = &mut self.blocks;
        blocks.width = blocks.width.clamp(Self::MIN_BOARD, Self::MAX_BOARD);
        blocks.height = blocks.height.clamp(Self::MIN_BOARD, Self::MAX_BOARD);
        blocks.drop_interval_ms = positive_or(blocks.drop_interval_ms, DROP_INTERVAL_MS);
        blocks.line_points = blocks.line_points.min(Self::MAX_POINTS);
        blocks.soft_drop_points = blocks.soft_drop_points.min(Self::MAX_POINTS);
        self
    }
}

/// `value` when it is a finite positive number, otherwise `default`
fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_match_classic_constants() {
        let s = Settings::default();
        assert_eq!(s.snake.tiles, 25);
        assert_eq!(s.snake.start, Position::new(12, 12));
        assert_eq!(s.snake.start_interval_ms, 100.0);
        assert_eq!(s.blocks.width, 10);
        assert_eq!(s.blocks.height, 20);
        assert_eq!(s.blocks.line_points, 100);
    }

    #[test]
    fn test_missing_entry_uses_defaults() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_corrupt_entry_uses_defaults() {
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, "{not json");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_entry_fills_defaults() {
        let json = r#"{"blocks":{"drop_interval_ms":500.0},"show_grid":false}"#;
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, json);
        let s = Settings::load(&store);
        assert_eq!(s.blocks.drop_interval_ms, 500.0);
        assert_eq!(s.blocks.width, BLOCKS_WIDTH);
        assert!(!s.show_grid);
        assert_eq!(s.snake, SnakeTuning::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut s = Settings::default();
        s.snake.tiles = 15;
        s.snake.start = Position::new(7, 7);
        s.save(&mut store).unwrap();
        assert_eq!(Settings::load(&store), s);
    }

    #[test]
    fn test_sanitize_fixes_unplayable_values() {
        let mut s = Settings::default();
        s.snake.tiles = 1;
        s.snake.start = Position::new(40, 40);
        s.snake.start_interval_ms = -3.0;
        s.blocks.width = 0;
        s.blocks.drop_interval_ms = f64::NAN;

        let s = s.sanitized();
        assert_eq!(s.snake.tiles, 4);
        assert_eq!(s.snake.start, Position::new(2, 2));
        assert_eq!(s.snake.start_interval_ms, SNAKE_START_INTERVAL_MS);
        assert_eq!(s.blocks.width, 4);
        assert_eq!(s.blocks.drop_interval_ms, DROP_INTERVAL_MS);

        let mut s = Settings::default();
        s.snake.tiles = 50_000;
        s.snake.start = Position::new(30_000, 30_000);
        s.snake.start_interval_ms = f64::INFINITY;
        s.snake.interval_step_ms = f64::NAN;
        s.snake.min_interval_ms = f64::NEG_INFINITY;
        s.snake.food_points = u32::MAX;
        s.blocks.width = 100_000;
        s.blocks.height = 100_000;
        s.blocks.drop_interval_ms = f64::INFINITY;
        s.blocks.line_points = u32::MAX;

        let s = s.sanitized();
        assert_eq!(s.snake.tiles, 100);
        assert_eq!(s.snake.start, Position::new(50, 50));
        assert_eq!(s.snake.start_interval_ms, SNAKE_START_INTERVAL_MS);
        assert_eq!(s.snake.interval_step_ms, SNAKE_INTERVAL_STEP_MS);
        assert_eq!(s.snake.min_interval_ms, SNAKE_MIN_INTERVAL_MS);
        assert_eq!(s.snake.food_points, 10_000);
        assert_eq!(s.blocks.width, 100);
        assert_eq!(s.blocks.height, 100);
        assert_eq!(s.blocks.drop_interval_ms, DROP_INTERVAL_MS);
        assert_eq!(s.blocks.line_points, 10_000);
    }

    #[test]
    fn test_oversized_stored_entries_are_clamped() {
        let json = r#"{"snake":{"tiles":50000},"blocks":{"width":100000,"height":100000}}"#;
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, json);
        let s = Settings::load(&store);
        assert_eq!(s.snake.tiles, 100);
        assert_eq!(s.blocks.width, 100);
        assert_eq!(s.blocks.height, 100);

        // Out-of-range numbers either fail to parse or become inf; both end at the default
        let json = r#"{"snake":{"start_interval_ms":1e309}}"#;
        let store = MemoryStore::with_entry(Settings::STORAGE_KEY, json);
        let s = Settings::load(&store);
        assert_eq!(s.snake.start_interval_ms, SNAKE_START_INTERVAL_MS);
        assert!(s.snake.min_interval_ms <= s.snake.start_interval_ms);
    }
}
