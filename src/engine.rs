//! Run lifecycle around the simulation tick
//!
//! `Engine` owns the simulation state and its RNG. `RunState` belongs to
//! the host; the engine only asks it to apply score/life deltas and tells
//! the observer when the run ends.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::INITIAL_LIVES;
use crate::sim::{InputState, SimState, StepDelta, TickInput, speed_multiplier, tick};
use crate::tuning::Tuning;

/// Score, lives and phase flags of the current run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    pub lives: u32,
    pub paused: bool,
    pub started: bool,
    pub game_over: bool,
}

impl Default for RunState {
    /// Menu state before the first run
    fn default() -> Self {
        Self {
            score: 0,
            lives: INITIAL_LIVES,
            paused: false,
            started: false,
            game_over: false,
        }
    }
}

/// Result of applying a tick's deltas to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTransition {
    /// Nothing changed
    Unchanged,
    /// Score or lives changed, run continues
    Progressed,
    /// Lives just reached zero
    GameOver { final_score: u64 },
}

impl RunState {
    /// Fresh run: full lives, zero score, running
    pub fn new_run() -> Self {
        Self {
            started: true,
            ..Self::default()
        }
    }

    /// Whether the simulation should advance this frame
    pub fn is_running(&self) -> bool {
        self.started && !self.paused && !self.game_over
    }

    /// Apply one tick's deltas. Reports `GameOver` at most once per run.
    pub fn apply(&mut self, delta: StepDelta) -> RunTransition {
        if delta.is_empty() {
            return RunTransition::Unchanged;
        }

        self.score += u64::from(delta.score_gained);
        self.lives = self.lives.saturating_sub(delta.lives_lost);

        if self.lives == 0 && !self.game_over {
            self.game_over = true;
            self.started = false;
            return RunTransition::GameOver {
                final_score: self.score,
            };
        }
        RunTransition::Progressed
    }

    /// Toggle pause while a run is in progress
    pub fn toggle_pause(&mut self) -> bool {
        if self.started && !self.game_over {
            self.paused = !self.paused;
        }
        self.paused
    }

    /// Back to the menu after a run
    pub fn reset_to_menu(&mut self) {
        *self = Self::default();
    }
}

/// Callbacks the engine raises toward the host
pub trait RunObserver {
    /// Score or lives changed
    fn on_progress(&mut self, run: &RunState);
    /// The run just ended; raised exactly once per run
    fn on_game_over(&mut self, final_score: u64);
}

/// Observer that ignores everything
impl RunObserver for () {
    fn on_progress(&mut self, _run: &RunState) {}
    fn on_game_over(&mut self, _final_score: u64) {}
}

/// Simulation plus the RNG that drives cone spawns
pub struct Engine {
    state: SimState,
    rng: Pcg32,
    tuning: Tuning,
}

impl Engine {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        log::info!("Engine created with seed: {}", seed);
        Self {
            state: SimState::new(&tuning),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        }
    }

    /// Start over for a new run
    pub fn reset(&mut self, seed: u64) {
        self.state = SimState::new(&self.tuning);
        self.rng = Pcg32::seed_from_u64(seed);
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Run one display frame: tick the simulation, push its deltas into
    /// `run`, and notify `observer`
    pub fn frame(
        &mut self,
        controls: InputState,
        run: &mut RunState,
        observer: &mut dyn RunObserver,
    ) -> StepDelta {
        let input = TickInput {
            controls,
            halted: !run.is_running(),
            spawn_speed_multiplier: speed_multiplier(run.score, &self.tuning),
        };
        let delta = tick(&mut self.state, &input, &self.tuning, &mut self.rng);

        match run.apply(delta) {
            RunTransition::Unchanged => {}
            RunTransition::Progressed => observer.on_progress(run),
            RunTransition::GameOver { final_score } => {
                log::info!("Game over with score {}", final_score);
                observer.on_progress(run);
                observer.on_game_over(final_score);
            }
        }
        delta
    }
}
