//! Simulation state and entity types
//!
//! Everything the step function reads or writes between frames lives in
//! `SimState`. No velocity, tilt or road offset is kept anywhere else.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::tuning::Tuning;

/// Press state of the two steering controls, sampled once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub const NONE: Self = Self {
        left: false,
        right: false,
    };
    pub const LEFT: Self = Self {
        left: true,
        right: false,
    };
    pub const RIGHT: Self = Self {
        left: false,
        right: true,
    };
}

/// The player's car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal velocity (px/frame)
    pub(crate) vel_x: f32,
    /// Visual roll angle (radians), negative when steering left
    pub tilt: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(GAME_WIDTH / 2.0 - CAR_WIDTH / 2.0, CAR_Y),
            size: Vec2::new(CAR_WIDTH, CAR_HEIGHT),
            vel_x: 0.0,
            tilt: 0.0,
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// y of the car's bottom edge
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn velocity(&self) -> f32 {
        self.vel_x
    }
}

/// What happened to a cone so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConeStatus {
    /// Still falling toward the car
    #[default]
    Untouched,
    /// Crushed by the car (scored), drawn squashed
    Hit,
    /// Slipped past the car (cost a life), drawn greyed out
    Missed,
}

/// A falling traffic cone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cone {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Fall speed captured at spawn (px/frame)
    speed: f32,
    pub status: ConeStatus,
}

impl Cone {
    pub fn new(id: u32, pos: Vec2, speed: f32) -> Self {
        Self {
            id,
            pos,
            size: Vec2::new(CONE_WIDTH, CONE_HEIGHT),
            speed,
            status: ConeStatus::Untouched,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn hit(&self) -> bool {
        self.status == ConeStatus::Hit
    }

    pub fn missed(&self) -> bool {
        self.status == ConeStatus::Missed
    }

    pub fn is_resolved(&self) -> bool {
        self.status != ConeStatus::Untouched
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub player: Player,
    /// Active cones in spawn order
    pub cones: Vec<Cone>,
    /// Global fall speed handed to newly spawned cones (px/frame)
    pub speed: f32,
    /// Phase of the centre divider dashes, in `[0, dash_period)`
    pub road_offset: f32,
    /// Simulation frame counter
    pub frame: u64,
    /// Next entity ID
    next_id: u32,
}

impl SimState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player: Player::default(),
            cones: Vec::new(),
            speed: tuning.initial_speed,
            road_offset: 0.0,
            frame: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a cone at `pos` falling at `speed`, returning its ID
    pub fn spawn_cone(&mut self, pos: Vec2, speed: f32) -> u32 {
        let id = self.next_entity_id();
        self.cones.push(Cone::new(id, pos, speed));
        id
    }
}
