//! Per-game frame drawing
//!
//! Full redraw every frame: background, board, pieces, score panel, and the
//! game-over banner when the run has ended.

use glam::Vec2;

use super::vertex::colors;
use super::{Surface, TextAlign, TextRun, Viewport};
use crate::game::RenderModel;
use crate::sim::{BlocksView, SnakeView};

const PANEL_FONT_PX: f32 = 24.0;
const PANEL_LINE_PX: f32 = 30.0;
const PANEL_MARGIN_PX: f32 = 10.0;
const BANNER_HALF_HEIGHT: f32 = 40.0;
const BANNER_TITLE_PX: f32 = 36.0;
const BANNER_HINT_PX: f32 = 18.0;
const GRID_LINE_WIDTH: f32 = 0.5;

/// Draw one frame of `model` onto `surface`
pub fn render(
    model: &RenderModel,
    viewport: &Viewport,
    show_grid: bool,
    surface: &mut dyn Surface,
) {
    match model {
        RenderModel::Snake(view) => draw_snake(view, viewport, show_grid, surface),
        RenderModel::Blocks(view) => draw_blocks(view, viewport, surface),
    }
}

pub fn draw_snake(
    view: &SnakeView,
    viewport: &Viewport,
    show_grid: bool,
    surface: &mut dyn Surface,
) {
    let tile = viewport.square_cell(view.tiles);
    let board = view.tiles as f32 * tile;

    surface.fill_rect(Vec2::ZERO, viewport.size(), colors::BACKGROUND);

    if show_grid {
        for i in 0..=view.tiles {
            let at = i as f32 * tile;
            surface.stroke_line(
                Vec2::new(at, 0.0),
                Vec2::new(at, board),
                GRID_LINE_WIDTH,
                colors::GRID_LINE,
            );
            surface.stroke_line(
                Vec2::new(0.0, at),
                Vec2::new(board, at),
                GRID_LINE_WIDTH,
                colors::GRID_LINE,
            );
        }
    }

    // Tail first so the head is never painted over
    for (index, segment) in view.body.iter().enumerate().rev() {
        let color = if index == 0 {
            colors::SNAKE_HEAD
        } else {
            colors::SNAKE_BODY
        };
        surface.fill_rect(
            Vec2::new(segment.x as f32 * tile + 1.0, segment.y as f32 * tile + 1.0),
            Vec2::splat(tile - 2.0),
            color,
        );
    }

    let food_center = Vec2::new(
        view.food.x as f32 * tile + tile / 2.0,
        view.food.y as f32 * tile + tile / 2.0,
    );
    surface.fill_circle(food_center, (tile / 2.0 - 2.0).max(1.0), colors::FOOD);

    score_panel(
        surface,
        &[
            format!("Score: {}", view.score),
            format!("Length: {}", view.body.len()),
            format!("Best: {}", view.high_score),
        ],
    );

    if view.game_over {
        game_over_banner(surface, viewport, "Press R to restart");
    }
}

pub fn draw_blocks(view: &BlocksView, viewport: &Viewport, surface: &mut dyn Surface) {
    let cell = viewport.fitted_cell(view.width, view.height);
    let block = Vec2::splat(cell - 1.0);

    surface.fill_rect(Vec2::ZERO, viewport.size(), colors::BACKGROUND);

    for (y, row) in view.grid.iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            if value != 0 {
                surface.fill_rect(
                    Vec2::new(x as f32 * cell, y as f32 * cell),
                    block,
                    colors::block(value),
                );
            }
        }
    }

    let piece_color = colors::block(view.piece_color);
    for &(x, y) in view.piece_cells.iter().filter(|(_, y)| *y >= 0) {
        surface.fill_rect(
            Vec2::new(x as f32 * cell, y as f32 * cell),
            block,
            piece_color,
        );
    }

    score_panel(
        surface,
        &[
            format!("Score: {}", view.score),
            format!("Best: {}", view.high_score),
        ],
    );

    if view.game_over {
        game_over_banner(surface, viewport, &format!("Final score: {}", view.score));
    }
}

fn score_panel(surface: &mut dyn Surface, lines: &[String]) {
    for (i, line) in lines.iter().enumerate() {
        surface.fill_text(TextRun {
            text: line.clone(),
            pos: Vec2::new(PANEL_MARGIN_PX, PANEL_LINE_PX * (i + 1) as f32),
            size_px: PANEL_FONT_PX,
            align: TextAlign::Left,
            color: colors::TEXT,
        });
    }
}

fn game_over_banner(surface: &mut dyn Surface, viewport: &Viewport, hint: &str) {
    let center = viewport.center();
    surface.fill_rect(
        Vec2::new(0.0, center.y - BANNER_HALF_HEIGHT),
        Vec2::new(viewport.width, BANNER_HALF_HEIGHT * 2.0),
        colors::OVERLAY,
    );
    surface.fill_text(TextRun {
        text: "Game Over!".to_string(),
        pos: center,
        size_px: BANNER_TITLE_PX,
        align: TextAlign::Center,
        color: colors::TEXT,
    });
    surface.fill_text(TextRun {
        text: hint.to_string(),
        pos: center + Vec2::new(0.0, 30.0),
        size_px: BANNER_HINT_PX,
        align: TextAlign::Center,
        color: colors::TEXT,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Batch;
    use crate::renderer::vertex::Color;
    use crate::sim::Position;

    /// Records calls instead of tessellating
    #[derive(Default)]
    struct Recorder {
        rects: Vec<(Vec2, Vec2, Color)>,
        lines: usize,
        circles: Vec<(Vec2, f32)>,
        texts: Vec<TextRun>,
    }

    impl Surface for Recorder {
        fn fill_rect(&mut self, min: Vec2, size: Vec2, color: Color) {
            self.rects.push((min, size, color));
        }
        fn stroke_line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _color: Color) {
            self.lines += 1;
        }
        fn fill_circle(&mut self, center: Vec2, radius: f32, _color: Color) {
            self.circles.push((center, radius));
        }
        fn fill_text(&mut self, run: TextRun) {
            self.texts.push(run);
        }
    }

    fn snake_view(game_over: bool) -> SnakeView {
        SnakeView {
            tiles: 25,
            body: vec![Position::new(13, 12), Position::new(12, 12)],
            food: Position::new(3, 4),
            score: 10,
            high_score: 40,
            game_over,
        }
    }

    fn blocks_view(game_over: bool) -> BlocksView {
        let mut grid = vec![vec![0u8; 10]; 20];
        grid[19][0] = 1;
        grid[19][1] = 5;
        BlocksView {
            width: 10,
            height: 20,
            grid,
            piece_cells: vec![(4, -1), (4, 0), (5, 0), (6, 0)],
            piece_color: 6,
            score: 300,
            high_score: 1200,
            game_over,
        }
    }

    #[test]
    fn test_snake_frame_layout() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rec = Recorder::default();
        draw_snake(&snake_view(false), &vp, true, &mut rec);

        // Background first, full surface
        assert_eq!(rec.rects[0], (Vec2::ZERO, vp.size(), colors::BACKGROUND));
        // 26 vertical + 26 horizontal grid lines
        assert_eq!(rec.lines, 52);
        // Head drawn last, inset by one pixel in a 24px tile
        let (min, size, color) = *rec.rects.last().unwrap();
        assert_eq!(min, Vec2::new(13.0 * 24.0 + 1.0, 12.0 * 24.0 + 1.0));
        assert_eq!(size, Vec2::splat(22.0));
        assert_eq!(color, colors::SNAKE_HEAD);
        assert_eq!(rec.rects[1].2, colors::SNAKE_BODY);
        // Food
        assert_eq!(rec.circles, vec![(Vec2::new(84.0, 108.0), 10.0)]);

        let lines: Vec<_> = rec.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(lines, vec!["Score: 10", "Length: 2", "Best: 40"]);
        assert_eq!(rec.texts[0].pos, Vec2::new(10.0, 30.0));
    }

    #[test]
    fn test_snake_grid_toggle() {
        let vp = Viewport::new(500.0, 500.0);
        let mut rec = Recorder::default();
        draw_snake(&snake_view(false), &vp, false, &mut rec);
        assert_eq!(rec.lines, 0);
    }

    #[test]
    fn test_snake_game_over_banner() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rec = Recorder::default();
        draw_snake(&snake_view(true), &vp, true, &mut rec);

        let (min, size, color) = *rec.rects.last().unwrap();
        assert_eq!(min, Vec2::new(0.0, 260.0));
        assert_eq!(size, Vec2::new(800.0, 80.0));
        assert_eq!(color, colors::OVERLAY);

        let title = &rec.texts[3];
        assert_eq!(title.text, "Game Over!");
        assert_eq!(title.align, TextAlign::Center);
        assert_eq!(title.pos, Vec2::new(400.0, 300.0));
        assert_eq!(rec.texts[4].text, "Press R to restart");
    }

    #[test]
    fn test_blocks_frame_skips_hidden_piece_cells() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rec = Recorder::default();
        draw_blocks(&blocks_view(false), &vp, &mut rec);

        // background + 2 grid cells + 3 visible piece cells
        assert_eq!(rec.rects.len(), 6);
        assert_eq!(rec.rects[1], (Vec2::new(0.0, 570.0), Vec2::splat(29.0), colors::block(1)));
        assert_eq!(rec.rects[2].2, colors::block(5));
        assert!(rec.rects[3..].iter().all(|r| r.2 == colors::block(6)));

        let lines: Vec<_> = rec.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(lines, vec!["Score: 300", "Best: 1200"]);
    }

    #[test]
    fn test_blocks_game_over_banner_shows_final_score() {
        let vp = Viewport::new(800.0, 600.0);
        let mut batch = Batch::new();
        render(
            &RenderModel::Blocks(blocks_view(true)),
            &vp,
            true,
            &mut batch,
        );
        assert_eq!(
            batch.text_lines(),
            vec!["Score: 300", "Best: 1200", "Game Over!", "Final score: 300"]
        );
    }
}
