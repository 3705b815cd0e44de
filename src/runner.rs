//! Frame-loop driver
//!
//! Owns a game for the lifetime of one host session. The host calls
//! `frame` from its animation callback with a monotonic timestamp and
//! `key_down` from its key listener; `destroy` ends the session.

use crate::consts::MAX_FRAME_MS;
use crate::game::{Game, GameKind, Key, RenderModel};
use crate::renderer::{Surface, Viewport, render};

pub struct Runner {
    game: Box<dyn Game>,
    viewport: Viewport,
    show_grid: bool,
    /// Timestamp of the previous frame; None until the first one
    last_time: Option<f64>,
    last_model: Option<RenderModel>,
    destroyed: bool,
}

impl Runner {
    pub fn new(game: Box<dyn Game>, viewport: Viewport, show_grid: bool) -> Self {
        Self {
            game,
            viewport,
            show_grid,
            last_time: None,
            last_model: None,
            destroyed: false,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.game.kind()
    }

    pub fn is_running(&self) -> bool {
        !self.destroyed
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Draw at a new surface size from the next frame on
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Route a DOM key value to the game. Returns true when the key is one
    /// the game consumes, so the host can prevent its default action.
    pub fn key_down(&mut self, dom_key: &str) -> bool {
        if self.destroyed {
            return false;
        }
        match Key::from_dom(dom_key) {
            Some(key) => self.game.press(key),
            None => false,
        }
    }

    /// Advance by the time since the previous frame and draw the result.
    /// Returns false (drawing nothing) once destroyed.
    pub fn frame(&mut self, now_ms: f64, surface: &mut dyn Surface) -> bool {
        if self.destroyed {
            return false;
        }

        let dt = match self.last_time {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_MS),
            None => 0.0,
        };
        self.last_time = Some(now_ms);

        let model = self.game.advance(dt);
        render(&model, &self.viewport, self.show_grid, surface);
        self.last_model = Some(model);
        true
    }

    /// End the session. Returns true only on the first call.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        log::debug!("{} runner destroyed", self.game.kind().as_str());
        true
    }

    /// Model from the most recent frame
    pub fn last_model(&self) -> Option<&RenderModel> {
        self.last_model.as_ref()
    }
}
