//! Per-frame simulation module
//!
//! All gameplay rules live here. This module must stay free of rendering
//! and platform dependencies:
//! - One tick per display frame (speeds are px/frame)
//! - Randomness comes only from the caller's RNG
//! - Cones are processed in spawn order

pub mod collision;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use level::{level_for_score, level_index, speed_multiplier};
pub use state::{Cone, ConeStatus, InputState, Player, SimState};
pub use tick::{StepDelta, TickInput, tick};
