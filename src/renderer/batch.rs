//! CPU-side frame batch
//!
//! Collects one frame's primitives as a triangle list for the GPU pipeline,
//! plus the text runs that the host places on top of the canvas.

use glam::Vec2;

use super::shapes;
use super::vertex::{Color, Vertex};
use super::{Surface, TextRun};

/// Circle smoothness; food markers are small
const CIRCLE_SEGMENTS: u32 = 24;

#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub vertices: Vec<Vertex>,
    pub texts: Vec<TextRun>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse the allocations for the next frame
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.texts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.texts.is_empty()
    }

    /// Text content only, in draw order
    pub fn text_lines(&self) -> Vec<&str> {
        self.texts.iter().map(|t| t.text.as_str()).collect()
    }
}

impl Surface for Batch {
    fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
        self.vertices.extend(shapes::rect(min, size, color));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.vertices.extend(shapes::line(from, to, width, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.vertices
            .extend(shapes::circle(center, radius, color, CIRCLE_SEGMENTS));
    }

    fn fill_text(&mut self, run: TextRun) {
        self.texts.push(run);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::TextAlign;

    #[test]
    fn test_batch_collects_and_clears() {
        let mut batch = Batch::new();
        assert!(batch.is_empty());

        batch.fill_rect(Vec2::ZERO, Vec2::ONE, [1.0; 4]);
        batch.fill_circle(Vec2::ZERO, 2.0, [1.0; 4]);
        batch.fill_text(TextRun {
            text: "hi".to_string(),
            pos: Vec2::ZERO,
            size_px: 12.0,
            align: TextAlign::Left,
            color: [1.0; 4],
        });
        assert_eq!(batch.vertices.len(), 6 + CIRCLE_SEGMENTS as usize * 3);
        assert_eq!(batch.text_lines(), vec!["hi"]);

        batch.clear();
        assert!(batch.is_empty());
    }
}
