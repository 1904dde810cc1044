//! Combo tracking and the final point-award formula

use serde::{Deserialize, Serialize};

use crate::tuning::ComboTuning;

/// Combo chain state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combo {
    /// Consecutive hits inside the window (0 before the first hit)
    pub count: u32,
    pub multiplier: f64,
    /// Wall-clock time of the last registered hit
    pub last_hit_ms: Option<f64>,
    /// Highest count reached this session
    pub best: u32,
}

/// Outcome of [`Combo::register_hit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Award {
    pub points: u64,
    pub combo_count: u32,
    pub combo_multiplier: f64,
    /// Count just crossed a milestone boundary
    pub milestone: bool,
}

impl Default for Combo {
    fn default() -> Self {
        Self::new()
    }
}

impl Combo {
    pub fn new() -> Self {
        Self {
            count: 0,
            multiplier: 1.0,
            last_hit_ms: None,
            best: 0,
        }
    }

    /// Register a hit and compute its award.
    ///
    /// A hit more than `window_ms` after the previous one (or the first hit
    /// of a session) restarts the chain at count 1, multiplier 1. Hits inside
    /// the window extend the chain.
    pub fn register_hit(
        &mut self,
        base_points: u32,
        score_multiplier: f64,
        now_ms: f64,
        tuning: &ComboTuning,
    ) -> Award {
        let within_window = self
            .last_hit_ms
            .is_some_and(|last| now_ms - last <= tuning.window_ms);

        if within_window {
            self.count += 1;
            let steps = (self.count - 1) as f64;
            self.multiplier = (1.0 + steps * tuning.increment).min(tuning.max_multiplier);
        } else {
            self.count = 1;
            self.multiplier = 1.0;
        }
        self.last_hit_ms = Some(now_ms);
        self.best = self.best.max(self.count);

        let points = (base_points as f64 * score_multiplier * self.multiplier).round();
        let milestone = tuning.milestone_interval > 0
            && self.count > 1
            && self.count % tuning.milestone_interval == 0;

        Award {
            points: points.max(0.0) as u64,
            combo_count: self.count,
            combo_multiplier: self.multiplier,
            milestone,
        }
    }

    /// Whether the chain would still extend at `now_ms`
    pub fn is_live(&self, now_ms: f64, tuning: &ComboTuning) -> bool {
        self.last_hit_ms
            .is_some_and(|last| now_ms - last <= tuning.window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tuning() -> ComboTuning {
        ComboTuning {
            window_ms: 2000.0,
            increment: 0.5,
            max_multiplier: 5.0,
            milestone_interval: 5,
        }
    }

    #[test]
    fn test_multiplier_sequence_within_window() {
        let t = tuning();
        let mut combo = Combo::new();
        let m: Vec<f64> = [0.0, 500.0, 900.0]
            .iter()
            .map(|&now| combo.register_hit(10, 1.0, now, &t).combo_multiplier)
            .collect();
        assert_eq!(m, vec![1.0, 1.5, 2.0]);
        assert_eq!(combo.count, 3);
    }

    #[test]
    fn test_lapsed_window_resets_to_one() {
        let t = tuning();
        let mut combo = Combo::new();
        for now in [0.0, 500.0, 900.0] {
            combo.register_hit(10, 1.0, now, &t);
        }
        let award = combo.register_hit(10, 1.0, 3500.0, &t);
        assert_eq!(award.combo_count, 1);
        assert_eq!(award.combo_multiplier, 1.0);
        assert_eq!(award.points, 10);
        assert_eq!(combo.best, 3);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let t = tuning();
        let mut combo = Combo::new();
        combo.register_hit(10, 1.0, 1000.0, &t);
        let award = combo.register_hit(10, 1.0, 3000.0, &t);
        assert_eq!(award.combo_count, 2);
    }

    #[test]
    fn test_multiplier_is_capped() {
        let t = tuning();
        let mut combo = Combo::new();
        let mut last = 0.0;
        for i in 0..20 {
            last = combo.register_hit(10, 1.0, i as f64 * 100.0, &t).combo_multiplier;
        }
        assert_eq!(last, 5.0);
    }

    #[test]
    fn test_award_formula() {
        let t = tuning();
        let mut combo = Combo::new();
        // Fresh chain, no power-up
        assert_eq!(combo.register_hit(10, 1.0, 0.0, &t).points, 10);
        // Third hit in window: multiplier 2.0, score multiplier ×3
        combo.register_hit(10, 1.0, 100.0, &t);
        let award = combo.register_hit(10, 3.0, 200.0, &t);
        assert_eq!(award.combo_multiplier, 2.0);
        assert_eq!(award.points, 60);
    }

    #[test]
    fn test_award_rounds() {
        let t = tuning();
        let mut combo = Combo::new();
        combo.register_hit(15, 1.0, 0.0, &t);
        // 15 × 1.5 = 22.5 rounds away from zero
        assert_eq!(combo.register_hit(15, 1.0, 10.0, &t).points, 23);
    }

    #[test]
    fn test_milestones() {
        let t = tuning();
        let mut combo = Combo::new();
        let flags: Vec<bool> = (0..10)
            .map(|i| combo.register_hit(1, 1.0, i as f64 * 10.0, &t).milestone)
            .collect();
        assert_eq!(flags.iter().filter(|m| **m).count(), 2);
        assert!(flags[4] && flags[9]);
    }

    #[test]
    fn test_is_live() {
        let t = tuning();
        let mut combo = Combo::new();
        assert!(!combo.is_live(0.0, &t));
        combo.register_hit(1, 1.0, 0.0, &t);
        assert!(combo.is_live(1999.0, &t));
        assert!(!combo.is_live(2001.0, &t));
    }

    proptest! {
        #[test]
        fn prop_multiplier_non_decreasing_in_window(gaps in proptest::collection::vec(0.0f64..2000.0, 1..40)) {
            let t = tuning();
            let mut combo = Combo::new();
            let mut now = 0.0;
            let mut prev = combo.register_hit(10, 1.0, now, &t).combo_multiplier;
            for gap in gaps {
                now += gap;
                let m = combo.register_hit(10, 1.0, now, &t).combo_multiplier;
                prop_assert!(m >= prev);
                prop_assert!(m <= t.max_multiplier);
                prev = m;
            }
        }

        #[test]
        fn prop_lapse_always_resets(hits in 1usize..20, gap in 2000.001f64..100_000.0) {
            let t = tuning();
            let mut combo = Combo::new();
            for i in 0..hits {
                combo.register_hit(10, 1.0, i as f64 * 100.0, &t);
            }
            let last = (hits - 1) as f64 * 100.0;
            let award = combo.register_hit(10, 1.0, last + gap, &t);
            prop_assert_eq!(award.combo_multiplier, 1.0);
            prop_assert_eq!(award.combo_count, 1);
        }
    }
}
