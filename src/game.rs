//! The seam between hosts and games
//!
//! A host (browser loop, native demo, test) only ever does three things:
//! hand key presses to `Game::press`, call `Game::advance` with the elapsed
//! time, and draw the returned `RenderModel`.

use serde::{Deserialize, Serialize};

use crate::highscores::HighScore;
use crate::settings::Settings;
use crate::sim::{BlocksGame, BlocksView, SnakeGame, SnakeView};
use crate::storage::KeyValueStore;

/// Keys the games understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Restart,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "ArrowUp" => Some(Key::Up),
            "ArrowDown" => Some(Key::Down),
            " " | "Spacebar" => Some(Key::Space),
            "r" | "R" => Some(Key::Restart),
            _ => None,
        }
    }
}

/// Which game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Snake,
    Blocks,
}

impl GameKind {
    pub const ALL: [GameKind; 2] = [GameKind::Blocks, GameKind::Snake];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::Blocks => "blocks",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "snake" => Some(GameKind::Snake),
            "blocks" | "tetris" => Some(GameKind::Blocks),
            _ => None,
        }
    }
}

/// Game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    /// Terminal until reset (snake) or forever (blocks)
    GameOver,
}

/// Everything the render step needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub enum RenderModel {
    Snake(SnakeView),
    Blocks(BlocksView),
}

impl RenderModel {
    pub fn score(&self) -> u32 {
        match self {
            RenderModel::Snake(v) => v.score,
            RenderModel::Blocks(v) => v.score,
        }
    }

    pub fn is_game_over(&self) -> bool {
        match self {
            RenderModel::Snake(v) => v.game_over,
            RenderModel::Blocks(v) => v.game_over,
        }
    }
}

/// A playable game
pub trait Game {
    fn kind(&self) -> GameKind;

    /// Queue a key press for the next `advance`. Returns true if the game
    /// uses this key at all (the host should then suppress its default
    /// browser action), whether or not the press is accepted.
    fn press(&mut self, key: Key) -> bool;

    /// Apply queued input, advance timers by `dt_ms`, run at most the ticks
    /// that are due, and snapshot the result.
    fn advance(&mut self, dt_ms: f64) -> RenderModel;

    fn phase(&self) -> GamePhase;

    fn score(&self) -> u32;
}

/// Build a game with its persisted best score loaded from `store`
pub fn new_game(
    kind: GameKind,
    settings: &Settings,
    store: Box<dyn KeyValueStore>,
    seed: u64,
) -> Box<dyn Game> {
    log::info!("Starting {} (seed {})", kind.as_str(), seed);
    match kind {
        GameKind::Snake => {
            let high = HighScore::load(store, HighScore::SNAKE_KEY);
            Box::new(SnakeGame::new(settings.snake.clone(), high, seed))
        }
        GameKind::Blocks => {
            let high = HighScore::load(store, HighScore::BLOCKS_KEY);
            Box::new(BlocksGame::new(settings.blocks.clone(), high, seed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_dom_keys() {
        assert_eq!(Key::from_dom("ArrowUp"), Some(Key::Up));
        assert_eq!(Key::from_dom(" "), Some(Key::Space));
        assert_eq!(Key::from_dom("R"), Some(Key::Restart));
        assert_eq!(Key::from_dom("r"), Some(Key::Restart));
        assert_eq!(Key::from_dom("Enter"), None);
        assert_eq!(Key::from_dom("a"), None);
    }

    #[test]
    fn test_kind_names() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(GameKind::from_str("Snake"), Some(GameKind::Snake));
        assert_eq!(GameKind::from_str("pong"), None);
    }

    #[test]
    fn test_new_game_reads_its_own_key() {
        let store = MemoryStore::with_entry(HighScore::SNAKE_KEY, "40");
        let settings = Settings::default();

        let mut snake = new_game(GameKind::Snake, &settings, Box::new(store.clone()), 1);
        assert_eq!(snake.kind(), GameKind::Snake);
        match snake.advance(0.0) {
            RenderModel::Snake(v) => assert_eq!(v.high_score, 40),
            other => panic!("unexpected model {other:?}"),
        }

        let mut blocks = new_game(GameKind::Blocks, &settings, Box::new(store), 1);
        assert_eq!(blocks.phase(), GamePhase::Running);
        match blocks.advance(0.0) {
            RenderModel::Blocks(v) => assert_eq!(v.high_score, 0),
            other => panic!("unexpected model {other:?}"),
        }
    }
}
