//! Cone Crusher - A vertically scrolling lane arcade game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (inertial steering, cone spawning, collisions)
//! - `engine`: Run lifecycle around the simulation step
//! - `renderer`: Back-to-front scene painter and WebGPU pipeline
//! - `input`: Polled press-state flags for the two steering controls
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `tuning`: Data-driven game balance

pub mod commentary;
pub mod engine;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, RunObserver, RunState, RunTransition};
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Stage (canvas) dimensions in CSS pixels
    pub const GAME_WIDTH: f32 = 400.0;
    pub const GAME_HEIGHT: f32 = 600.0;

    /// Player car size
    pub const CAR_WIDTH: f32 = 50.0;
    pub const CAR_HEIGHT: f32 = 80.0;
    /// Gap between the car's bottom edge and the stage bottom
    pub const CAR_BOTTOM_GAP: f32 = 40.0;
    /// Fixed vertical position of the car's top edge
    pub const CAR_Y: f32 = GAME_HEIGHT - CAR_HEIGHT - CAR_BOTTOM_GAP;

    /// Cone size
    pub const CONE_WIDTH: f32 = 40.0;
    pub const CONE_HEIGHT: f32 = 40.0;

    /// Lives at the start of every run
    pub const INITIAL_LIVES: u32 = 3;

    /// LocalStorage key for the leaderboard
    pub const HIGH_SCORES_KEY: &str = "cone_crusher_scores_v1";
    /// LocalStorage key for player preferences
    pub const SETTINGS_KEY: &str = "cone_crusher_settings";
}
