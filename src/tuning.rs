//! Data-driven game balance
//!
//! Every physics, spawn and progression constant the simulation reads.
//! Missing fields in a JSON document fall back to the shipped defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{CAR_WIDTH, CONE_WIDTH, GAME_WIDTH};

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Balance knobs for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Steering ===
    /// Velocity added per frame while a direction is held
    pub accel: f32,
    /// Velocity multiplier per frame with no direction held
    pub friction: f32,
    /// Absolute velocity limit (px/frame)
    pub max_velocity: f32,
    /// Tilt change per frame while a direction is held (radians)
    pub tilt_step: f32,
    /// Absolute tilt limit (radians)
    pub tilt_limit: f32,
    /// Tilt multiplier per frame with no direction held
    pub tilt_decay: f32,
    /// Gap kept between the car and each lane edge
    pub boundary_margin: f32,

    // === Cones ===
    /// Global fall speed at the start of a run (px/frame)
    pub initial_speed: f32,
    /// Global fall speed added every frame
    pub speed_increment: f32,
    /// Hard cap on global fall speed
    pub speed_cap: f32,
    /// Probability of spawning one cone on a given frame
    pub spawn_chance: f64,
    /// Gap kept between a spawned cone and each lane edge
    pub spawn_margin: f32,
    /// How far past the stage bottom a squashed/dead cone keeps falling
    pub despawn_margin: f32,

    // === Road ===
    /// Length of one dash plus one gap on the centre divider
    pub dash_period: f32,

    // === Progression ===
    /// Score needed per level
    pub points_per_level: u64,
    /// Spawn speed multiplier added per level
    pub level_speed_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            accel: 0.95,
            friction: 0.84,
            max_velocity: 9.5,
            tilt_step: 0.025,
            tilt_limit: 0.15,
            tilt_decay: 0.88,
            boundary_margin: 15.0,

            initial_speed: 4.0,
            speed_increment: 0.001,
            speed_cap: 18.0,
            spawn_chance: 0.02,
            spawn_margin: 25.0,
            despawn_margin: 100.0,

            dash_period: 80.0,

            points_per_level: 30,
            level_speed_step: 0.6,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the simulation's clamps
    pub fn validate(&self) -> Result<(), TuningError> {
        let unit_open = |field, value: f32| {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, value })
            }
        };
        let non_negative = |field, value: f32| {
            if value >= 0.0 {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, value })
            }
        };

        unit_open("friction", self.friction)?;
        unit_open("tilt_decay", self.tilt_decay)?;
        non_negative("accel", self.accel)?;
        non_negative("max_velocity", self.max_velocity)?;
        non_negative("tilt_limit", self.tilt_limit)?;
        non_negative("speed_increment", self.speed_increment)?;
        non_negative("boundary_margin", self.boundary_margin)?;
        non_negative("spawn_margin", self.spawn_margin)?;
        non_negative("despawn_margin", self.despawn_margin)?;
        non_negative("level_speed_step", self.level_speed_step)?;

        if self.initial_speed <= 0.0 {
            return Err(TuningError::OutOfRange {
                field: "initial_speed",
                value: self.initial_speed,
            });
        }
        if self.speed_cap < self.initial_speed {
            return Err(TuningError::OutOfRange {
                field: "speed_cap",
                value: self.speed_cap,
            });
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(TuningError::OutOfRange {
                field: "spawn_chance",
                value: self.spawn_chance as f32,
            });
        }
        if self.dash_period <= 0.0 {
            return Err(TuningError::OutOfRange {
                field: "dash_period",
                value: self.dash_period,
            });
        }
        if self.points_per_level == 0 {
            return Err(TuningError::OutOfRange {
                field: "points_per_level",
                value: 0.0,
            });
        }
        if GAME_WIDTH - CAR_WIDTH - 2.0 * self.boundary_margin < 0.0 {
            return Err(TuningError::OutOfRange {
                field: "boundary_margin",
                value: self.boundary_margin,
            });
        }
        if GAME_WIDTH - CONE_WIDTH - 2.0 * self.spawn_margin < 0.0 {
            return Err(TuningError::OutOfRange {
                field: "spawn_margin",
                value: self.spawn_margin,
            });
        }
        Ok(())
    }

    /// Leftmost x the car may occupy
    pub fn min_player_x(&self) -> f32 {
        self.boundary_margin
    }

    /// Rightmost x the car may occupy
    pub fn max_player_x(&self) -> f32 {
        GAME_WIDTH - CAR_WIDTH - self.boundary_margin
    }
}
