//! Shape generation for 2D primitives
//!
//! Every shape is emitted as a triangle list in stage pixels.

use glam::{Affine2, Vec2};
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Generate vertices for a filled axis-aligned rectangle
pub fn rect(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> [Vertex; 6] {
    let (x1, y1) = (x + w, y + h);
    [
        Vertex::new(x, y, color),
        Vertex::new(x1, y, color),
        Vertex::new(x, y1, color),
        Vertex::new(x, y1, color),
        Vertex::new(x1, y, color),
        Vertex::new(x1, y1, color),
    ]
}

/// Generate vertices for a filled triangle
pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> [Vertex; 3] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Generate vertices for a filled ellipse
pub fn ellipse(center: Vec2, radii: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radii.x * theta1.cos(),
            center.y + radii.y * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radii.x * theta2.cos(),
            center.y + radii.y * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a dashed vertical line from `y0` to `y1`.
///
/// Dashes begin at `y0 + phase` and repeat every `dash + gap`; increasing
/// `phase` scrolls the pattern downward.
pub fn dashed_vertical_line(
    x: f32,
    y0: f32,
    y1: f32,
    width: f32,
    dash: f32,
    gap: f32,
    phase: f32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let period = dash + gap;
    if period <= 0.0 || y1 <= y0 {
        return Vec::new();
    }

    let mut vertices = Vec::new();
    let mut start = y0 + phase.rem_euclid(period) - period;
    while start < y1 {
        let top = start.max(y0);
        let bottom = (start + dash).min(y1);
        if bottom > top {
            vertices.extend(rect(x - width / 2.0, top, width, bottom - top, color));
        }
        start += period;
    }

    vertices
}

/// Rotation by `angle` radians about `pivot`
pub fn rotation_about(pivot: Vec2, angle: f32) -> Affine2 {
    Affine2::from_translation(pivot)
        * Affine2::from_angle(angle)
        * Affine2::from_translation(-pivot)
}

/// Apply `transform` to every vertex position in place
pub fn transform(vertices: &mut [Vertex], transform: &Affine2) {
    for v in vertices {
        let p = transform.transform_point2(Vec2::from(v.position));
        v.position = p.to_array();
    }
}
