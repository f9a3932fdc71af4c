//! Scene painter
//!
//! Turns the simulation state into one triangle list, painted back to
//! front: asphalt, lane edges, centre divider, cones in spawn order, car.
//! The whole frame is rebuilt every time.

use glam::Vec2;

use super::shapes::{dashed_vertical_line, ellipse, rect, rotation_about, transform, triangle};
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::{Cone, ConeStatus, Player, SimState};

/// Width of the dark strips at each lane edge
pub const EDGE_WIDTH: f32 = 10.0;
/// Divider dash length and stroke width
pub const DASH_LENGTH: f32 = 40.0;
pub const DIVIDER_WIDTH: f32 = 4.0;

const ELLIPSE_SEGMENTS: u32 = 24;

/// Presentation switches that do not affect gameplay
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneOptions {
    /// Freeze the divider and keep the car level
    pub reduced_motion: bool,
}

/// Build the full frame for `state`
pub fn build_scene(state: &SimState, dash_period: f32, options: &SceneOptions) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(256 + state.cones.len() * 24);

    // Asphalt and lane edges
    vertices.extend(rect(0.0, 0.0, GAME_WIDTH, GAME_HEIGHT, colors::ASPHALT));
    vertices.extend(rect(0.0, 0.0, EDGE_WIDTH, GAME_HEIGHT, colors::ROAD_EDGE));
    vertices.extend(rect(
        GAME_WIDTH - EDGE_WIDTH,
        0.0,
        EDGE_WIDTH,
        GAME_HEIGHT,
        colors::ROAD_EDGE,
    ));

    let phase = if options.reduced_motion {
        0.0
    } else {
        state.road_offset
    };
    vertices.extend(dashed_vertical_line(
        GAME_WIDTH / 2.0,
        0.0,
        GAME_HEIGHT,
        DIVIDER_WIDTH,
        DASH_LENGTH,
        dash_period - DASH_LENGTH,
        phase,
        colors::DIVIDER,
    ));

    for cone in &state.cones {
        paint_cone(&mut vertices, cone);
    }

    let tilt = if options.reduced_motion {
        0.0
    } else {
        state.player.tilt
    };
    paint_car(&mut vertices, &state.player, tilt);

    vertices
}

fn paint_cone(out: &mut Vec<Vertex>, cone: &Cone) {
    let Vec2 { x, y } = cone.pos;
    let Vec2 { x: w, y: h } = cone.size;

    let color = match cone.status {
        ConeStatus::Hit => {
            // Flattened under the wheels
            out.extend(ellipse(
                Vec2::new(x + w / 2.0, y + h - 4.0),
                Vec2::new(w / 2.0 + 15.0, 7.0),
                colors::CONE_SQUASHED,
                ELLIPSE_SEGMENTS,
            ));
            return;
        }
        ConeStatus::Missed => colors::CONE_DEAD,
        ConeStatus::Untouched => colors::CONE,
    };

    // Base plate, body, reflective stripe
    out.extend(rect(x, y + h - 8.0, w, 8.0, color));
    out.extend(triangle(
        Vec2::new(x + 4.0, y + h - 8.0),
        Vec2::new(x + w - 4.0, y + h - 8.0),
        Vec2::new(x + w / 2.0, y),
        color,
    ));
    if cone.status == ConeStatus::Untouched {
        out.extend(rect(x + 12.0, y + 12.0, w - 24.0, 4.0, colors::CONE_STRIPE));
    }
}

fn paint_car(out: &mut Vec<Vertex>, player: &Player, tilt: f32) {
    let Vec2 { x, y } = player.pos;
    let Vec2 { x: w, y: h } = player.size;
    let start = out.len();

    out.extend(rect(x + 5.0, y + 5.0, w, h, colors::CAR_SHADOW));
    out.extend(rect(x, y, w, h, colors::CAR_BODY));
    out.extend(rect(x + 6.0, y + 18.0, w - 12.0, 42.0, colors::CAR_ROOF));
    out.extend(rect(x + 10.0, y + 22.0, w - 20.0, 14.0, colors::WINDSHIELD));
    out.extend(rect(x - 4.0, y + h - 6.0, w + 8.0, 8.0, colors::BUMPER));

    // Tail lights with a soft halo
    for light_x in [x + 2.0, x + w - 14.0] {
        for spread in [8.0, 4.0] {
            out.extend(rect(
                light_x - spread,
                y + h - 3.0 - spread,
                12.0 + spread * 2.0,
                4.0 + spread * 2.0,
                colors::TAIL_GLOW,
            ));
        }
        out.extend(rect(light_x, y + h - 3.0, 12.0, 4.0, colors::TAIL_LIGHT));
    }

    if tilt != 0.0 {
        let pivot = player.pos + player.size / 2.0;
        transform(&mut out[start..], &rotation_about(pivot, tilt));
    }
}
