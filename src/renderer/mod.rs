//! Rendering
//!
//! Games hand back a `RenderModel`; `render` turns it into calls on a
//! `Surface`. The browser host draws shapes through a `Batch` presented by
//! the WebGPU pipeline and lays text runs out as DOM overlay spans.

pub mod batch;
pub mod draw;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use batch::Batch;
pub use draw::render;
pub use pipeline::GpuRenderer;
pub use vertex::{Color, Vertex, colors, css_color};

use glam::Vec2;

/// Horizontal anchoring of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A line of text anchored at its baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub pos: Vec2,
    pub size_px: f32,
    pub align: TextAlign,
    pub color: Color,
}

/// Something 2D primitives can be drawn on. Coordinates are surface pixels,
/// origin top-left, y down.
pub trait Surface {
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn fill_text(&mut self, run: TextRun);
}

/// Pixel size of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    /// Cell size for a square board `tiles` cells across
    pub fn square_cell(&self, tiles: i32) -> f32 {
        self.width.min(self.height) / tiles.max(1) as f32
    }

    /// Largest cell size that fits a `cols` x `rows` board
    pub fn fitted_cell(&self, cols: i32, rows: i32) -> f32 {
        (self.width / cols.max(1) as f32).min(self.height / rows.max(1) as f32)
    }
}
