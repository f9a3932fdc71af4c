//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position (stage pixels, y down) and sRGB color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
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

/// Opaque color from a 0xRRGGBB literal
pub const fn hex(rgb: u32) -> [f32; 4] {
    with_alpha(rgb, 1.0)
}

/// Translucent color from a 0xRRGGBB literal
pub const fn with_alpha(rgb: u32, alpha: f32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Colors for game elements
pub mod colors {
    use super::{hex, with_alpha};

    pub const ASPHALT: [f32; 4] = hex(0x1e293b);
    pub const ROAD_EDGE: [f32; 4] = hex(0x0f172a);
    pub const DIVIDER: [f32; 4] = hex(0x475569);

    pub const CONE: [f32; 4] = hex(0xf97316);
    pub const CONE_STRIPE: [f32; 4] = hex(0xffffff);
    pub const CONE_DEAD: [f32; 4] = hex(0x334155);
    pub const CONE_SQUASHED: [f32; 4] = hex(0xea580c);

    pub const CAR_SHADOW: [f32; 4] = with_alpha(0x000000, 0.4);
    pub const CAR_BODY: [f32; 4] = hex(0xdc2626);
    pub const CAR_ROOF: [f32; 4] = hex(0x851414);
    pub const WINDSHIELD: [f32; 4] = hex(0x7dd3fc);
    pub const BUMPER: [f32; 4] = hex(0x450a0a);
    pub const TAIL_LIGHT: [f32; 4] = hex(0xff0000);
    pub const TAIL_GLOW: [f32; 4] = with_alpha(0xff0000, 0.18);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_channels() {
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(with_alpha(0x00ff00, 0.5), [0.0, 1.0, 0.0, 0.5]);
    }
}
