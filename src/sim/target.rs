//! Wheel targets: one shared data struct, ten behaviours
//!
//! Shared state (slot angle, size, points, lifetime) lives on [`Target`];
//! everything a variant does differently is a match arm over [`Behavior`].
//! A target's world position is always derived from its slot angle and the
//! wheel's rotation. Speed targets are the exception: their angle is absolute
//! and advanced on its own so they lap the wheel.

use glam::Vec3;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::collision::{inverse_distance_pull, sphere_contains};
use super::state::Wheel;
use crate::tuning::Tuning;
use crate::{normalize_angle, wheel_point};

/// Target variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetKind {
    Standard,
    Gold,
    Speed,
    Bonus,
    Shrinking,
    Split,
    Mystery,
    Ghost,
    Magnetic,
    Explosive,
}

impl TargetKind {
    pub const ALL: [TargetKind; 10] = [
        TargetKind::Standard,
        TargetKind::Gold,
        TargetKind::Speed,
        TargetKind::Bonus,
        TargetKind::Shrinking,
        TargetKind::Split,
        TargetKind::Mystery,
        TargetKind::Ghost,
        TargetKind::Magnetic,
        TargetKind::Explosive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Standard => "Standard",
            TargetKind::Gold => "Gold",
            TargetKind::Speed => "Speed",
            TargetKind::Bonus => "Bonus",
            TargetKind::Shrinking => "Shrinking",
            TargetKind::Split => "Split",
            TargetKind::Mystery => "Mystery",
            TargetKind::Ghost => "Ghost",
            TargetKind::Magnetic => "Magnetic",
            TargetKind::Explosive => "Explosive",
        }
    }
}

/// One entry of the Mystery reward table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MysteryReward {
    /// Award exactly this many base points
    Points(u32),
    /// Grant a random power-up effect
    PowerUp,
    /// Spawn this many extra targets
    ExtraTargets(u32),
}

impl MysteryReward {
    /// Reveal text for the HUD
    pub fn describe(&self) -> String {
        match self {
            MysteryReward::Points(p) => format!("Mystery: +{p} points!"),
            MysteryReward::PowerUp => "Mystery: free power-up!".to_string(),
            MysteryReward::ExtraTargets(n) => format!("Mystery: {n} extra targets!"),
        }
    }
}

/// Per-variant state and parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Standard,
    /// Pulse is decorative only
    Gold { pulse_phase: f32 },
    Speed { multiplier: f32 },
    Bonus,
    Shrinking {
        misses: u32,
        max_misses: u32,
        min_size: f32,
        max_size: f32,
        ratio: f32,
        min_points: u32,
        max_points: u32,
    },
    Split {
        depth: u32,
        max_depth: u32,
        angle_offset: f32,
        child_size: f32,
    },
    Mystery { rewards: Vec<MysteryReward> },
    Ghost {
        phase: f32,
        visible_secs: f32,
        invisible_secs: f32,
    },
    Magnetic { range: f32, strength: f32 },
    Explosive { radius: f32, chain_probability: f32 },
}

impl Behavior {
    pub fn kind(&self) -> TargetKind {
        match self {
            Behavior::Standard => TargetKind::Standard,
            Behavior::Gold { .. } => TargetKind::Gold,
            Behavior::Speed { .. } => TargetKind::Speed,
            Behavior::Bonus => TargetKind::Bonus,
            Behavior::Shrinking { .. } => TargetKind::Shrinking,
            Behavior::Split { .. } => TargetKind::Split,
            Behavior::Mystery { .. } => TargetKind::Mystery,
            Behavior::Ghost { .. } => TargetKind::Ghost,
            Behavior::Magnetic { .. } => TargetKind::Magnetic,
            Behavior::Explosive { .. } => TargetKind::Explosive,
        }
    }

    fn from_tuning(kind: TargetKind, tuning: &Tuning) -> Self {
        let t = &tuning.targets;
        match kind {
            TargetKind::Standard => Behavior::Standard,
            TargetKind::Gold => Behavior::Gold { pulse_phase: 0.0 },
            TargetKind::Speed => Behavior::Speed {
                multiplier: t.speed_multiplier,
            },
            TargetKind::Bonus => Behavior::Bonus,
            TargetKind::Shrinking => Behavior::Shrinking {
                misses: 0,
                max_misses: t.shrink.max_misses,
                min_size: t.shrink.min_size,
                max_size: t.shrink.max_size,
                ratio: t.shrink.ratio,
                min_points: t.shrink.min_points,
                max_points: t.shrink.max_points,
            },
            TargetKind::Split => Behavior::Split {
                depth: 0,
                max_depth: t.split.max_depth,
                angle_offset: t.split.angle_offset,
                child_size: t.split.child_size,
            },
            TargetKind::Mystery => Behavior::Mystery {
                rewards: tuning.mystery_rewards.clone(),
            },
            TargetKind::Ghost => Behavior::Ghost {
                phase: 0.0,
                visible_secs: t.ghost_visible_secs,
                invisible_secs: t.ghost_invisible_secs,
            },
            TargetKind::Magnetic => Behavior::Magnetic {
                range: t.magnet_range,
                strength: t.magnet_strength,
            },
            TargetKind::Explosive => Behavior::Explosive {
                radius: t.explosion_radius,
                chain_probability: t.explosion_chain,
            },
        }
    }
}

/// What a hit asks the orchestrator to do beyond scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialEffect {
    /// Spawn two children at these wheel slots
    Split {
        child_angles: [f32; 2],
        depth: u32,
        size: f32,
    },
    Mystery(MysteryReward),
    Explosion {
        origin: Vec3,
        radius: f32,
        chain_probability: f32,
    },
}

/// Result of [`Target::on_hit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub points: u32,
    pub special: Option<SpecialEffect>,
}

/// Linear points-for-size curve of a shrinking target (smaller pays more)
fn shrink_points(size: f32, min_size: f32, max_size: f32, min_points: u32, max_points: u32) -> u32 {
    let span = max_size - min_size;
    let t = if span > f32::EPSILON {
        ((size - min_size) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let points = max_points as f32 - (max_points as f32 - min_points as f32) * t;
    points.round() as u32
}

/// A target riding the wheel
#[derive(Debug, Clone)]
pub struct Target {
    pub id: u32,
    pub behavior: Behavior,
    /// Wheel-relative slot angle (absolute world angle for Speed)
    pub angle: f32,
    pub ring_radius: f32,
    /// Collision radius
    pub size: f32,
    pub points: u32,
    pub active: bool,
    pub spawned_at_ms: f64,
    pub lifetime_ms: Option<f64>,
    /// World position as of the last update, derived from angle + wheel rotation
    pub pos: Vec3,
}

impl Target {
    /// Create a target of `kind` at wheel slot `angle`
    pub fn spawn(id: u32, kind: TargetKind, angle: f32, wheel: &Wheel, now_ms: f64, tuning: &Tuning) -> Self {
        let variant = tuning.targets.variants.get(kind);
        let behavior = Behavior::from_tuning(kind, tuning);

        let (size, points) = match &behavior {
            Behavior::Shrinking {
                max_size,
                min_size,
                min_points,
                max_points,
                ..
            } => (
                *max_size,
                shrink_points(*max_size, *min_size, *max_size, *min_points, *max_points),
            ),
            _ => (variant.size, variant.points),
        };

        // Speed targets carry an absolute angle
        let angle = match behavior {
            Behavior::Speed { .. } => normalize_angle(angle + wheel.rotation),
            _ => normalize_angle(angle),
        };

        let mut target = Self {
            id,
            behavior,
            angle,
            ring_radius: wheel.ring_radius,
            size,
            points,
            active: true,
            spawned_at_ms: now_ms,
            lifetime_ms: variant.lifetime_ms,
            pos: Vec3::ZERO,
        };
        target.pos = target.world_position(wheel);
        target
    }

    /// Turn a freshly spawned Split target into a child of the given depth
    pub fn with_split_depth(mut self, child_depth: u32, child_size: f32) -> Self {
        if let Behavior::Split { depth, .. } = &mut self.behavior {
            *depth = child_depth;
            self.size = child_size;
        }
        self
    }

    pub fn kind(&self) -> TargetKind {
        self.behavior.kind()
    }

    /// World position as a pure function of the slot angle and the wheel
    pub fn world_position(&self, wheel: &Wheel) -> Vec3 {
        let theta = match self.behavior {
            Behavior::Speed { .. } => self.angle,
            _ => self.angle + wheel.rotation,
        };
        wheel_point(wheel.center, self.ring_radius, theta)
    }

    /// Where the target will be `secs` from now if the wheel keeps its speed
    pub fn predicted_position(&self, wheel: &Wheel, secs: f32) -> Vec3 {
        let theta = match self.behavior {
            Behavior::Speed { multiplier } => self.angle + wheel.angular_velocity * multiplier * secs,
            _ => self.angle + wheel.rotation + wheel.angular_velocity * secs,
        };
        wheel_point(wheel.center, self.ring_radius, theta)
    }

    /// Slot angle measured in the wheel's frame
    pub fn wheel_slot(&self, wheel: &Wheel) -> f32 {
        match self.behavior {
            Behavior::Speed { .. } => normalize_angle(self.angle - wheel.rotation),
            _ => self.angle,
        }
    }

    /// Lifetime has run out at `now_ms`
    pub fn is_expired(&self, now_ms: f64) -> bool {
        self.lifetime_ms
            .is_some_and(|lifetime| now_ms - self.spawned_at_ms >= lifetime)
    }

    /// Ghosts are hittable only during the visible part of their cycle
    pub fn is_visible(&self) -> bool {
        match self.behavior {
            Behavior::Ghost {
                phase, visible_secs, ..
            } => phase < visible_secs,
            _ => true,
        }
    }

    /// Decorative pulse in [0, 1] for Gold targets
    pub fn pulse(&self) -> f32 {
        match self.behavior {
            Behavior::Gold { pulse_phase } => 0.5 + 0.5 * pulse_phase.sin(),
            _ => 0.0,
        }
    }

    /// Advance per-variant state and refresh the derived position.
    ///
    /// Lifetime expiry deactivates the target; the caller notices via `active`.
    pub fn update(&mut self, dt: f32, wheel: &Wheel, now_ms: f64) {
        if !self.active {
            return;
        }
        if self.is_expired(now_ms) {
            self.active = false;
            return;
        }

        match &mut self.behavior {
            Behavior::Gold { pulse_phase } => {
                *pulse_phase = (*pulse_phase + dt * 4.0) % std::f32::consts::TAU;
            }
            Behavior::Speed { multiplier } => {
                self.angle = normalize_angle(self.angle + wheel.angular_velocity * *multiplier * dt);
            }
            Behavior::Ghost {
                phase,
                visible_secs,
                invisible_secs,
            } => {
                let cycle = *visible_secs + *invisible_secs;
                *phase = (*phase + dt) % cycle;
            }
            _ => {}
        }

        self.pos = self.world_position(wheel);
    }

    /// Whether `point` hits this target
    pub fn check_collision(&self, point: Vec3) -> bool {
        self.check_collision_padded(point, 0.0)
    }

    /// Collision with an enlarged radius (explosive arrows)
    pub fn check_collision_padded(&self, point: Vec3, padding: f32) -> bool {
        if !self.active || !self.is_visible() {
            return false;
        }
        sphere_contains(self.pos, self.size + padding, point)
    }

    /// Resolve a hit. The target is consumed either way.
    pub fn on_hit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> HitResult {
        self.active = false;
        let mut points = self.points;

        let special = match &self.behavior {
            Behavior::Split {
                depth,
                max_depth,
                angle_offset,
                child_size,
            } if depth < max_depth => Some(SpecialEffect::Split {
                child_angles: [
                    normalize_angle(self.angle - angle_offset),
                    normalize_angle(self.angle + angle_offset),
                ],
                depth: depth + 1,
                size: self.size * child_size,
            }),
            Behavior::Mystery { rewards } => rewards.choose(rng).map(|reward| {
                if let MysteryReward::Points(p) = reward {
                    points = *p;
                }
                SpecialEffect::Mystery(*reward)
            }),
            Behavior::Explosive {
                radius,
                chain_probability,
            } => Some(SpecialEffect::Explosion {
                origin: self.pos,
                radius: *radius,
                chain_probability: *chain_probability,
            }),
            _ => None,
        };

        HitResult { points, special }
    }

    /// An arrow crossed the scoring band without hitting anything.
    ///
    /// Only Shrinking targets react: they shrink, re-price, and deplete.
    pub fn on_miss(&mut self) {
        if !self.active {
            return;
        }
        if let Behavior::Shrinking {
            misses,
            max_misses,
            min_size,
            max_size,
            ratio,
            min_points,
            max_points,
        } = &mut self.behavior
        {
            *misses += 1;
            self.size *= *ratio;
            self.points = shrink_points(self.size, *min_size, *max_size, *min_points, *max_points);
            if *misses >= *max_misses || self.size < *min_size {
                self.active = false;
            }
        }
    }

    /// Steering force a Magnetic target applies to an arrow at `arrow_pos`
    pub fn magnetic_force(&self, arrow_pos: Vec3) -> Option<Vec3> {
        match self.behavior {
            Behavior::Magnetic { range, strength } if self.active => {
                inverse_distance_pull(self.pos, arrow_pos, self.size, range, strength)
            }
            _ => None,
        }
    }

    /// Remove from play without scoring
    pub fn dispose(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn wheel() -> Wheel {
        Wheel::new(&Tuning::default())
    }

    fn spawn(kind: TargetKind, angle: f32) -> Target {
        Target::spawn(1, kind, angle, &wheel(), 0.0, &Tuning::default())
    }

    #[test]
    fn test_world_position_follows_wheel_without_touching_angle() {
        let mut w = wheel();
        let mut t = spawn(TargetKind::Standard, 0.3);
        w.rotation = 1.2;
        t.update(0.016, &w, 0.0);
        assert_eq!(t.angle, 0.3);
        let expected = wheel_point(w.center, w.ring_radius, 1.5);
        assert!((t.pos - expected).length() < 1e-5);
    }

    #[test]
    fn test_speed_target_laps_the_wheel() {
        let mut w = wheel();
        let mut fast = spawn(TargetKind::Speed, 0.0);
        let mut slow = spawn(TargetKind::Standard, 0.0);
        let dt = 0.1;
        for _ in 0..5 {
            w.advance(dt);
            fast.update(dt, &w, 0.0);
            slow.update(dt, &w, 0.0);
        }
        // Slow target moved with the wheel only (0.25 rad); fast one 2.5× that
        let slow_theta = w.rotation;
        let fast_theta = fast.angle;
        assert!((slow_theta - 0.25).abs() < 1e-4);
        assert!((fast_theta - 0.625).abs() < 1e-4);
        assert!((fast.wheel_slot(&w) - 0.375).abs() < 1e-4);
    }

    #[test]
    fn test_prediction_matches_update() {
        let mut w = wheel();
        let mut t = spawn(TargetKind::Speed, 1.0);
        let predicted = t.predicted_position(&w, 0.5);
        w.advance(0.5);
        t.update(0.5, &w, 0.0);
        assert!((t.pos - predicted).length() < 1e-4);
    }

    #[test]
    fn test_lifetime_expiry() {
        let w = wheel();
        let mut bonus = spawn(TargetKind::Bonus, 0.0);
        bonus.update(0.016, &w, 2999.0);
        assert!(bonus.active);
        bonus.update(0.016, &w, 3000.0);
        assert!(!bonus.active);

        let mut standard = spawn(TargetKind::Standard, 0.0);
        standard.update(0.016, &w, 1.0e9);
        assert!(standard.active);
    }

    #[test]
    fn test_shrinking_depletes_after_max_misses() {
        let mut t = spawn(TargetKind::Shrinking, 0.0);
        let start_points = t.points;
        for _ in 0..4 {
            t.on_miss();
            assert!(t.active);
        }
        assert!(t.points > start_points);
        t.on_miss();
        assert!(!t.active);
        assert!(!t.check_collision(t.pos));
    }

    #[test]
    fn test_shrinking_points_interpolate() {
        let mut t = spawn(TargetKind::Shrinking, 0.0);
        assert_eq!(t.points, 10);
        t.on_miss();
        // size 0.9 → 0.72: t = 0.7, points = 40 - 30 × 0.7 = 19
        assert!((t.size - 0.72).abs() < 1e-5);
        assert_eq!(t.points, 19);
    }

    #[test]
    fn test_miss_ignored_by_other_variants() {
        let mut t = spawn(TargetKind::Standard, 0.0);
        let size = t.size;
        t.on_miss();
        assert!(t.active);
        assert_eq!(t.size, size);
    }

    #[test]
    fn test_split_below_max_depth_yields_two_children() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut t = spawn(TargetKind::Split, 1.0);
        let result = t.on_hit(&mut rng);
        assert!(!t.active);
        match result.special {
            Some(SpecialEffect::Split {
                child_angles,
                depth,
                size,
            }) => {
                assert!((child_angles[0] - 0.7).abs() < 1e-5);
                assert!((child_angles[1] - 1.3).abs() < 1e-5);
                assert_eq!(depth, 1);
                assert!((size - 0.6 * 0.7).abs() < 1e-5);
            }
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_split_at_max_depth_is_plain() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut t = spawn(TargetKind::Split, 1.0).with_split_depth(2, 0.3);
        let result = t.on_hit(&mut rng);
        assert_eq!(result.points, 15);
        assert!(result.special.is_none());
    }

    #[test]
    fn test_mystery_draws_from_table() {
        let mut rng = Pcg32::seed_from_u64(7);
        let tuning = Tuning::default();
        for _ in 0..50 {
            let mut t = spawn(TargetKind::Mystery, 0.0);
            let result = t.on_hit(&mut rng);
            match result.special {
                Some(SpecialEffect::Mystery(reward)) => {
                    assert!(tuning.mystery_rewards.contains(&reward));
                    if let MysteryReward::Points(p) = reward {
                        assert_eq!(result.points, p);
                    } else {
                        assert_eq!(result.points, 15);
                    }
                }
                other => panic!("expected mystery, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_mystery_empty_table_is_plain() {
        let mut tuning = Tuning::default();
        tuning.mystery_rewards.clear();
        let mut t = Target::spawn(1, TargetKind::Mystery, 0.0, &wheel(), 0.0, &tuning);
        let result = t.on_hit(&mut Pcg32::seed_from_u64(3));
        assert_eq!(result.points, 15);
        assert!(result.special.is_none());
    }

    #[test]
    fn test_ghost_invisible_phase_blocks_collision() {
        let w = wheel();
        let mut t = spawn(TargetKind::Ghost, 0.0);
        assert!(t.check_collision(t.pos));
        // Into the invisible part of the cycle
        t.update(2.5, &w, 0.0);
        assert!(!t.is_visible());
        assert!(!t.check_collision(t.pos));
        assert!(!t.check_collision_padded(t.pos, 10.0));
        // Wrap back to visible
        t.update(1.2, &w, 0.0);
        assert!(t.is_visible());
        assert!(t.check_collision(t.pos));
        assert!(!t.check_collision(t.pos + Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_explosive_hit_reports_blast() {
        let mut t = spawn(TargetKind::Explosive, 0.0);
        let result = t.on_hit(&mut Pcg32::seed_from_u64(1));
        assert!(matches!(
            result.special,
            Some(SpecialEffect::Explosion { radius, chain_probability, .. })
                if radius == 3.0 && chain_probability == 0.5
        ));
    }

    #[test]
    fn test_magnetic_force_range() {
        let t = spawn(TargetKind::Magnetic, 0.0);
        assert!(t.magnetic_force(t.pos + Vec3::new(0.0, 0.0, 0.5)).is_none());
        assert!(t.magnetic_force(t.pos + Vec3::new(0.0, 0.0, 6.5)).is_none());
        let f = t.magnetic_force(t.pos + Vec3::new(0.0, 0.0, 2.0)).unwrap();
        assert!(f.z < 0.0);
        assert!((f.length() - 2.0).abs() < 1e-4);
        assert!(spawn(TargetKind::Standard, 0.0).magnetic_force(t.pos + Vec3::Z).is_none());
    }

    #[test]
    fn test_dispose() {
        let mut t = spawn(TargetKind::Gold, 0.0);
        t.dispose();
        assert!(!t.check_collision(t.pos));
    }

    proptest! {
        #[test]
        fn prop_magnetic_force_decreases_with_distance(a in 0.61f32..5.9, b in 0.61f32..5.9) {
            prop_assume!((a - b).abs() > 1e-3);
            let t = spawn(TargetKind::Magnetic, 0.0);
            let (near, far) = if a < b { (a, b) } else { (b, a) };
            let f_near = t.magnetic_force(t.pos + Vec3::new(near, 0.0, 0.0)).unwrap().length();
            let f_far = t.magnetic_force(t.pos + Vec3::new(far, 0.0, 0.0)).unwrap().length();
            prop_assert!(f_near > f_far);
        }

        #[test]
        fn prop_position_is_pure_function_of_rotation(angle in -3.1f32..3.1, rotation in -20.0f32..20.0) {
            let mut w = wheel();
            let mut t = spawn(TargetKind::Standard, angle);
            w.rotation = rotation;
            t.update(0.0, &w, 0.0);
            prop_assert_eq!(t.angle, normalize_angle(angle));
            let expected = wheel_point(w.center, w.ring_radius, normalize_angle(angle) + rotation);
            prop_assert!((t.pos - expected).length() < 1e-3);
        }
    }
}
