//! Persisted best score
//!
//! One integer per game, read when a game is constructed (or reset) and
//! written back only when a finished run beats it.

use crate::storage::KeyValueStore;

/// Best score for one game, backed by an injected store
pub struct HighScore {
    key: &'static str,
    best: u32,
    store: Box<dyn KeyValueStore>,
}

impl HighScore {
    /// Storage key for the snake game
    pub const SNAKE_KEY: &'static str = "grid_arcade_snake_high_score";
    /// Storage key for the blocks game
    pub const BLOCKS_KEY: &'static str = "grid_arcade_blocks_high_score";

    /// Read the stored value; missing or unparseable values count as zero
    pub fn load(store: Box<dyn KeyValueStore>, key: &'static str) -> Self {
        let best = Self::read(store.as_ref(), key);
        log::info!("Loaded high score {} for {}", best, key);
        Self { key, best, store }
    }

    fn read(store: &dyn KeyValueStore, key: &str) -> u32 {
        store
            .get(key)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0)
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Re-read the stored value (another tab may have written it)
    pub fn reload(&mut self) {
        self.best = Self::read(self.store.as_ref(), self.key);
    }

    /// Record a finished run. Returns true if it set a new best.
    ///
    /// The in-memory best is updated even when the write fails, so the
    /// scoreboard stays right for the rest of the session.
    pub fn submit(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        match self.store.set(self.key, &score.to_string()) {
            Ok(()) => log::info!("New high score {} saved to {}", score, self.key),
            Err(e) => log::warn!("Could not save high score {}: {}", score, e),
        }
        true
    }
}

impl std::fmt::Debug for HighScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighScore")
            .field("key", &self.key)
            .field("best", &self.best)
            .finish_non_exhaustive()
    }
}
