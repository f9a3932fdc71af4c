//! Score-derived difficulty tiers

use crate::tuning::Tuning;

/// Zero-based level index for a score
pub fn level_index(score: u64, tuning: &Tuning) -> u64 {
    score / tuning.points_per_level
}

/// One-based level shown on the HUD
pub fn level_for_score(score: u64, tuning: &Tuning) -> u64 {
    level_index(score, tuning) + 1
}

/// Multiplier applied to a cone's fall speed when it spawns
pub fn speed_multiplier(score: u64, tuning: &Tuning) -> f32 {
    1.0 + level_index(score, tuning) as f32 * tuning.level_speed_step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_every_thirty_points() {
        let t = Tuning::default();
        assert_eq!(level_for_score(0, &t), 1);
        assert_eq!(level_for_score(29, &t), 1);
        assert_eq!(level_for_score(30, &t), 2);
        assert_eq!(level_for_score(95, &t), 4);
    }

    #[test]
    fn test_multiplier_steps() {
        let t = Tuning::default();
        assert_eq!(speed_multiplier(0, &t), 1.0);
        assert!((speed_multiplier(30, &t) - 1.6).abs() < 1e-6);
        assert!((speed_multiplier(61, &t) - 2.2).abs() < 1e-6);
    }
}
