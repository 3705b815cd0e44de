//! Vertex type and palette for 2D rendering

use bytemuck::{Pod, Zeroable};

/// RGBA, components in 0..=1
pub type Color = [f32; 4];

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Opaque color from 8-bit sRGB components
pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// CSS `rgba()` string, for text drawn outside the GPU surface
pub fn css_color(color: Color) -> String {
    let [r, g, b, a] = color;
    format!(
        "rgba({}, {}, {}, {})",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        a
    )
}

/// Colors for game elements
pub mod colors {
    use super::{Color, rgb};

    pub const BACKGROUND: Color = rgb(0x1a, 0x30, 0x09);
    pub const GRID_LINE: Color = rgb(0x2d, 0x50, 0x16);
    pub const SNAKE_HEAD: Color = rgb(0xf0, 0xc9, 0x59);
    pub const SNAKE_BODY: Color = rgb(0xd4, 0xaf, 0x37);
    pub const FOOD: Color = rgb(0xf0, 0x00, 0x00);
    pub const TEXT: Color = rgb(0xd4, 0xaf, 0x37);
    pub const OVERLAY: Color = [0.0, 0.0, 0.0, 0.7];
    /// Grid values outside the piece range
    pub const UNKNOWN_BLOCK: Color = rgb(0x80, 0x80, 0x80);

    /// Indexed by grid color value; 0 is the empty cell
    pub const BLOCKS: [Color; 8] = [
        rgb(0x00, 0x00, 0x00),
        rgb(0x00, 0xf0, 0xf0), // I - cyan
        rgb(0xf0, 0xf0, 0x00), // O - yellow
        rgb(0xa0, 0x00, 0xf0), // T - purple
        rgb(0x00, 0xf0, 0x00), // S - green
        rgb(0xf0, 0x00, 0x00), // Z - red
        rgb(0x00, 0x00, 0xf0), // J - blue
        rgb(0xf0, 0xa0, 0x00), // L - orange
    ];

    pub fn block(index: u8) -> Color {
        BLOCKS.get(index as usize).copied().unwrap_or(UNKNOWN_BLOCK)
    }
}
