//! Per-frame simulation tick
//!
//! Advances the car, the road and every cone by one display frame. Speeds
//! are in pixels per frame, so the game runs at the refresh rate.

use glam::Vec2;
use rand::Rng;

use super::state::{ConeStatus, InputState, SimState};
use crate::consts::*;
use crate::tuning::Tuning;

/// Inputs for a single tick
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Steering flags polled this frame
    pub controls: InputState,
    /// Paused or game over: the tick does nothing
    pub halted: bool,
    /// Level multiplier applied to the spawn-time speed of new cones
    pub spawn_speed_multiplier: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            controls: InputState::NONE,
            halted: false,
            spawn_speed_multiplier: 1.0,
        }
    }
}

/// Score and life changes produced by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepDelta {
    pub score_gained: u32,
    pub lives_lost: u32,
}

impl StepDelta {
    pub fn is_empty(&self) -> bool {
        self.score_gained == 0 && self.lives_lost == 0
    }
}

/// Advance the simulation by one frame
pub fn tick<R: Rng + ?Sized>(
    state: &mut SimState,
    input: &TickInput,
    tuning: &Tuning,
    rng: &mut R,
) -> StepDelta {
    if input.halted {
        return StepDelta::default();
    }

    state.frame += 1;

    steer(state, &input.controls, tuning);

    // Road scroll and spawns use this frame's speed, before the increment
    let speed = state.speed;
    state.road_offset = (state.road_offset + speed) % tuning.dash_period;
    state.speed = (speed + tuning.speed_increment).min(tuning.speed_cap);

    if rng.random::<f64>() < tuning.spawn_chance {
        let lane = GAME_WIDTH - CONE_WIDTH - 2.0 * tuning.spawn_margin;
        let x = tuning.spawn_margin + rng.random::<f32>() * lane;
        let cone_speed = speed * input.spawn_speed_multiplier;
        state.spawn_cone(Vec2::new(x, -CONE_HEIGHT), cone_speed);
    }

    advance_cones(state, tuning)
}

/// Inertial steering: accelerate while held, coast on friction otherwise
fn steer(state: &mut SimState, controls: &InputState, tuning: &Tuning) {
    let player = &mut state.player;

    if controls.left {
        player.vel_x -= tuning.accel;
        player.tilt = (player.tilt - tuning.tilt_step).max(-tuning.tilt_limit);
    } else if controls.right {
        player.vel_x += tuning.accel;
        player.tilt = (player.tilt + tuning.tilt_step).min(tuning.tilt_limit);
    } else {
        player.vel_x *= tuning.friction;
        player.tilt *= tuning.tilt_decay;
    }

    player.vel_x = player.vel_x.clamp(-tuning.max_velocity, tuning.max_velocity);
    player.pos.x += player.vel_x;

    // Walls are inelastic
    let (min_x, max_x) = (tuning.min_player_x(), tuning.max_player_x());
    if player.pos.x < min_x {
        player.pos.x = min_x;
        player.vel_x = 0.0;
    }
    if player.pos.x > max_x {
        player.pos.x = max_x;
        player.vel_x = 0.0;
    }
}

/// Move every cone and resolve hits/misses against the car, in spawn order
fn advance_cones(state: &mut SimState, tuning: &Tuning) -> StepDelta {
    let car = state.player.bounds();
    let car_bottom = state.player.bottom();
    let mut delta = StepDelta::default();

    state.cones.retain_mut(|cone| {
        let next_y = cone.pos.y + cone.speed();

        if cone.is_resolved() {
            cone.pos.y = next_y;
            return next_y < GAME_HEIGHT + tuning.despawn_margin;
        }

        // Hit test uses the cone's box before it moves this frame
        if car.overlaps(&cone.bounds()) {
            delta.score_gained += 1;
            cone.status = ConeStatus::Hit;
            cone.pos.y = next_y;
            return true;
        }

        if next_y > car_bottom {
            delta.lives_lost += 1;
            cone.status = ConeStatus::Missed;
            cone.pos.y = next_y;
            return true;
        }

        if next_y > GAME_HEIGHT {
            return false;
        }

        cone.pos.y = next_y;
        true
    });

    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Cone;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn no_spawns() -> Tuning {
        Tuning {
            spawn_chance: 0.0,
            ..Tuning::default()
        }
    }

    fn run_input(controls: InputState) -> TickInput {
        TickInput {
            controls,
            ..Default::default()
        }
    }

    #[test]
    fn test_halted_tick_is_a_no_op() {
        let tuning = Tuning {
            spawn_chance: 1.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        state.spawn_cone(Vec2::new(180.0, 100.0), 4.0);

        let input = TickInput {
            controls: InputState::RIGHT,
            halted: true,
            ..Default::default()
        };
        let delta = tick(&mut state, &input, &tuning, &mut rng);

        assert!(delta.is_empty());
        assert_eq!(state.frame, 0);
        assert_eq!(state.cones.len(), 1);
        assert_eq!(state.cones[0].pos.y, 100.0);
        assert_eq!(state.player.pos.x, 175.0);
        assert_eq!(state.speed, tuning.initial_speed);
    }

    #[test]
    fn test_holding_right_accelerates_and_tilts() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);

        tick(&mut state, &run_input(InputState::RIGHT), &tuning, &mut rng);
        assert!((state.player.velocity() - 0.95).abs() < 1e-6);
        assert!((state.player.tilt - 0.025).abs() < 1e-6);
        assert!((state.player.pos.x - 175.95).abs() < 1e-4);

        for _ in 0..20 {
            tick(&mut state, &run_input(InputState::RIGHT), &tuning, &mut rng);
        }
        assert!(state.player.velocity() <= tuning.max_velocity);
        assert!((state.player.tilt - tuning.tilt_limit).abs() < 1e-6);
    }

    #[test]
    fn test_left_wins_when_both_held() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        let both = InputState {
            left: true,
            right: true,
        };
        tick(&mut state, &run_input(both), &tuning, &mut rng);
        assert!(state.player.velocity() < 0.0);
    }

    #[test]
    fn test_release_decays_velocity_and_tilt() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        for _ in 0..5 {
            tick(&mut state, &run_input(InputState::LEFT), &tuning, &mut rng);
        }
        let vel = state.player.velocity();
        let tilt = state.player.tilt;

        tick(&mut state, &run_input(InputState::NONE), &tuning, &mut rng);
        assert!((state.player.velocity() - vel * tuning.friction).abs() < 1e-5);
        assert!((state.player.tilt - tilt * tuning.tilt_decay).abs() < 1e-6);
    }

    #[test]
    fn test_wall_clamp_zeroes_velocity() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        for _ in 0..60 {
            tick(&mut state, &run_input(InputState::LEFT), &tuning, &mut rng);
        }
        assert_eq!(state.player.pos.x, tuning.min_player_x());
        // Still holding left: pushed into the wall, clamped again
        tick(&mut state, &run_input(InputState::LEFT), &tuning, &mut rng);
        assert_eq!(state.player.velocity(), 0.0);
    }

    #[test]
    fn test_road_offset_wraps_at_dash_period() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        for _ in 0..25 {
            tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        }
        assert!(state.road_offset >= 0.0 && state.road_offset < tuning.dash_period);
        // 25 frames at ~4 px has wrapped once
        assert!(state.road_offset < 30.0);
    }

    #[test]
    fn test_speed_increments_up_to_cap() {
        let tuning = Tuning {
            speed_increment: 1.0,
            speed_cap: 6.5,
            ..no_spawns()
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        assert_eq!(state.speed, 5.0);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        }
        assert_eq!(state.speed, 6.5);
    }

    #[test]
    fn test_spawn_uses_pre_increment_speed_times_multiplier() {
        let tuning = Tuning {
            spawn_chance: 1.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(9);
        let mut state = SimState::new(&tuning);
        let input = TickInput {
            spawn_speed_multiplier: 1.6,
            ..Default::default()
        };
        tick(&mut state, &input, &tuning, &mut rng);

        assert_eq!(state.cones.len(), 1);
        let cone = &state.cones[0];
        assert!((cone.speed() - 4.0 * 1.6).abs() < 1e-5);
        // Spawned above the stage and advanced once in the same frame
        assert!((cone.pos.y - (-CONE_HEIGHT + cone.speed())).abs() < 1e-4);
        assert!(cone.pos.x >= tuning.spawn_margin);
        assert!(cone.pos.x <= GAME_WIDTH - CONE_WIDTH - tuning.spawn_margin);
    }

    #[test]
    fn test_at_most_one_spawn_per_tick() {
        let tuning = Tuning {
            spawn_chance: 1.0,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = SimState::new(&tuning);
        for n in 1..=10 {
            tick(&mut state, &TickInput::default(), &tuning, &mut rng);
            assert_eq!(state.cones.len(), n);
        }
    }

    #[test]
    fn test_cone_above_car_is_hit() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        let id = state.spawn_cone(Vec2::new(180.0, 0.0), 4.0);

        let mut scored = None;
        for frame in 0..200 {
            let delta = tick(&mut state, &TickInput::default(), &tuning, &mut rng);
            assert_eq!(delta.lives_lost, 0);
            if delta.score_gained > 0 {
                scored = Some((frame, delta));
                break;
            }
        }

        let (_, delta) = scored.expect("cone should reach the car");
        assert_eq!(delta.score_gained, 1);
        let cone = state.cones.iter().find(|c| c.id == id).unwrap();
        assert!(cone.hit());
        assert!(!cone.missed());
    }

    #[test]
    fn test_cone_dodged_is_missed() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        let id = state.spawn_cone(Vec2::new(300.0, 0.0), 4.0);

        let mut missed_at = None;
        for frame in 0..300 {
            let delta = tick(&mut state, &run_input(InputState::LEFT), &tuning, &mut rng);
            assert_eq!(delta.score_gained, 0);
            if delta.lives_lost > 0 {
                assert_eq!(delta.lives_lost, 1);
                missed_at = Some(frame);
                break;
            }
        }

        assert!(missed_at.is_some());
        let cone = state.cones.iter().find(|c| c.id == id).unwrap();
        assert!(cone.missed());
        assert!(cone.pos.y > state.player.bottom());
    }

    #[test]
    fn test_resolved_cone_falls_then_despawns() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        let mut cone = Cone::new(99, Vec2::new(300.0, 680.0), 8.0);
        cone.status = ConeStatus::Missed;
        state.cones.push(cone);

        let delta = tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        assert!(delta.is_empty());
        assert_eq!(state.cones[0].pos.y, 688.0);

        tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        assert_eq!(state.cones[0].pos.y, 696.0);
        tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        assert!(state.cones.is_empty());
    }

    #[test]
    fn test_cone_order_is_stable() {
        let tuning = no_spawns();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = SimState::new(&tuning);
        let ids: Vec<u32> = (0..4)
            .map(|i| state.spawn_cone(Vec2::new(30.0 + i as f32 * 80.0, -40.0), 4.0 + i as f32))
            .collect();
        tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        let after: Vec<u32> = state.cones.iter().map(|c| c.id).collect();
        assert_eq!(after, ids);
    }

    fn arb_controls() -> impl Strategy<Value = Vec<(bool, bool)>> {
        prop::collection::vec((any::<bool>(), any::<bool>()), 1..600)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_run_invariants_hold(seed in any::<u64>(), controls in arb_controls()) {
            let tuning = Tuning {
                spawn_chance: 0.1,
                speed_increment: 0.05,
                ..Tuning::default()
            };
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = SimState::new(&tuning);
            let mut spawn_speeds = std::collections::HashMap::new();
            let mut resolved = std::collections::HashMap::new();

            for (left, right) in controls {
                let before = state.speed;
                let input = TickInput {
                    controls: InputState { left, right },
                    ..Default::default()
                };
                let _delta = tick(&mut state, &input, &tuning, &mut rng);

                // Car stays inside the lane
                prop_assert!(state.player.pos.x >= tuning.min_player_x());
                prop_assert!(state.player.pos.x <= tuning.max_player_x());
                prop_assert!(state.player.velocity().abs() <= tuning.max_velocity);

                // Global speed never decreases, never passes the cap
                prop_assert!(state.speed >= before);
                prop_assert!(state.speed <= tuning.speed_cap);

                for cone in &state.cones {
                    let speed = *spawn_speeds.entry(cone.id).or_insert(cone.speed());
                    prop_assert_eq!(speed, cone.speed());

                    if let Some(status) = resolved.get(&cone.id) {
                        prop_assert_eq!(*status, cone.status);
                    } else if cone.is_resolved() {
                        resolved.insert(cone.id, cone.status);
                    }
                }
            }
        }
    }
}
