//! Reward calculation.
//!
//! Pure, total-count-based mappings from a cumulative step count to the
//! derived metrics. Recomputing from a stored cumulative value always
//! reproduces the same outputs bit-for-bit.

/// Average step length in meters
pub const STEP_LENGTH_M: f64 = 0.7;

/// Steps required to earn one coin
pub const STEPS_PER_COIN: u64 = 1000;

/// Calories burned per step (kcal)
pub const CALORIES_PER_STEP: f64 = 0.04;

/// Distance walked in kilometers, rounded to 2 decimals
pub fn distance_km(steps: u64) -> f64 {
    round2(steps as f64 * STEP_LENGTH_M / 1000.0)
}

/// Coins earned for the given step count (integer floor)
pub fn coins(steps: u64) -> u64 {
    steps / STEPS_PER_COIN
}

/// Calories burned, rounded to the nearest whole kcal
pub fn calories(steps: u64) -> f64 {
    (steps as f64 * CALORIES_PER_STEP).round()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousand_steps() {
        assert_eq!(distance_km(1000), 0.70);
        assert_eq!(coins(1000), 1);
        assert_eq!(calories(1000), 40.0);
    }

    #[test]
    fn test_zero_steps() {
        assert_eq!(distance_km(0), 0.0);
        assert_eq!(coins(0), 0);
        assert_eq!(calories(0), 0.0);
    }

    #[test]
    fn test_coin_floor_semantics() {
        assert_eq!(coins(999), 0);
        assert_eq!(coins(1001), 1);
        assert_eq!(coins(2999), 2);
        assert_eq!(coins(3000), 3);
    }

    #[test]
    fn test_distance_rounding() {
        // 1250 steps * 0.7 m = 875 m = 0.875 km -> 0.88
        assert_eq!(distance_km(1250), 0.88);
        // 10 steps = 7 m -> 0.01 km
        assert_eq!(distance_km(10), 0.01);
    }

    #[test]
    fn test_deterministic_over_range() {
        for steps in (0..5000).step_by(37) {
            assert_eq!(coins(steps), steps / 1000);
            assert_eq!(calories(steps), (steps as f64 * 0.04).round());
            assert_eq!(distance_km(steps), distance_km(steps));
        }
    }
}
