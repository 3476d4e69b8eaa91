use std::time::Duration;

use crate::engine::difficulty::Difficulty;

/// Answers at or under this earn streak points.
pub const FAST_ANSWER_THRESHOLD: Duration = Duration::from_secs(5);

/// Points curve `ceil(max(streak - offset, 1) ^ exponent)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreakCurve {
    pub offset: u32,
    pub exponent: f64,
}

impl StreakCurve {
    pub fn points(&self, streak: u32) -> u32 {
        let base = streak.saturating_sub(self.offset).max(1) as f64;
        (base.powf(self.exponent).ceil() as u32).max(1)
    }
}

pub fn curve_for(difficulty: Difficulty) -> StreakCurve {
    let (offset, exponent) = match difficulty {
        Difficulty::Easy => (2, 0.35),
        Difficulty::Normal => (1, 0.43),
        Difficulty::Hard => (0, 0.5),
        Difficulty::Harder => (0, 0.6),
        Difficulty::Insane => (0, 0.7),
        Difficulty::Bonus => (0, 0.8),
        Difficulty::Timed30 => (0, 0.6),
        Difficulty::Timed60 => (0, 0.53),
        Difficulty::Timed120 => (0, 0.45),
    };
    StreakCurve { offset, exponent }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Award {
    pub points: u32,
    pub streak: u32,
}

/// Points for one correct answer. Slow answers still earn a point but break
/// the streak.
pub fn award(difficulty: Difficulty, elapsed: Duration, streak: u32) -> Award {
    if elapsed <= FAST_ANSWER_THRESHOLD {
        let streak = streak.saturating_add(1);
        Award {
            points: curve_for(difficulty).points(streak),
            streak,
        }
    } else {
        Award {
            points: 1,
            streak: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fast_answer_is_one_point() {
        let a = award(Difficulty::Hard, Duration::from_secs(2), 0);
        assert_eq!(a, Award { points: 1, streak: 1 });
    }

    #[test]
    fn test_slow_answer_resets_streak() {
        for d in Difficulty::ALL {
            let a = award(d, Duration::from_millis(5_001), 12);
            assert_eq!(a, Award { points: 1, streak: 0 });
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let a = award(Difficulty::Insane, Duration::from_secs(5), 3);
        assert_eq!(a.streak, 4);
    }

    #[test]
    fn test_fast_answers_grow_streak_and_never_drop_below_one() {
        for d in Difficulty::ALL {
            let mut streak = 0;
            for _ in 0..50 {
                let a = award(d, Duration::from_secs(1), streak);
                assert_eq!(a.streak, streak + 1);
                assert!(a.points >= 1);
                streak = a.streak;
            }
        }
    }

    #[test]
    fn test_curve_values() {
        // Bonus: ceil(4^0.8) = 4, ceil(9^0.8) = 6
        let c = curve_for(Difficulty::Bonus);
        assert_eq!(c.points(4), 4);
        assert_eq!(c.points(9), 6);
        // Hard: ceil(sqrt(8)) = 3, ceil(sqrt(10)) = 4
        let c = curve_for(Difficulty::Hard);
        assert_eq!(c.points(8), 3);
        assert_eq!(c.points(10), 4);
    }

    #[test]
    fn test_easy_offset_delays_bonus_points() {
        let c = curve_for(Difficulty::Easy);
        assert_eq!(c.points(1), 1);
        assert_eq!(c.points(3), 1);
        // max(4 - 2, 1)^0.35 = 2^0.35 = 1.27 -> 2
        assert_eq!(c.points(4), 2);
    }
}
