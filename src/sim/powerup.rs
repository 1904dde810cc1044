//! Power-up pickups and the timed effect ledger
//!
//! Collecting a pickup appends an [`Effect`] to the ledger. Effects are never
//! merged: two score-multiplier pickups are two entries with their own
//! expiry. Global modifiers are read from the ledger, so a kind stays in
//! force while any entry of that kind is live.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::IntervalTimer;
use super::collision::sphere_contains;
use super::state::IdAllocator;
use crate::tuning::PowerUpTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    RapidFire,
    ExplosiveArrows,
    ScoreMultiplier,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::RapidFire,
        PowerUpKind::ExplosiveArrows,
        PowerUpKind::ScoreMultiplier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::RapidFire => "Rapid Fire",
            PowerUpKind::ExplosiveArrows => "Explosive Arrows",
            PowerUpKind::ScoreMultiplier => "Score Multiplier",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// A collectible floating in the field
#[derive(Debug, Clone, Serialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec3,
    pub active: bool,
}

/// One ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Effect {
    pub kind: PowerUpKind,
    pub started_at_ms: f64,
    pub duration_ms: f64,
}

impl Effect {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.started_at_ms >= self.duration_ms
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.duration_ms - (now_ms - self.started_at_ms)).max(0.0)
    }
}

/// HUD row for an active effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PowerUps {
    pub pickups: Vec<Pickup>,
    pub effects: Vec<Effect>,
    spawn_timer: IntervalTimer,
}

impl PowerUps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval-gated, probabilistic, capped pickup spawn
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        ids: &mut IdAllocator,
        now_ms: f64,
        rng: &mut R,
        tuning: &PowerUpTuning,
    ) -> Option<PowerUpKind> {
        if !self.spawn_timer.poll(now_ms, tuning.spawn_interval_ms) {
            return None;
        }
        if self.active_pickups() >= tuning.max_pickups {
            return None;
        }
        if !rng.random_bool(tuning.spawn_chance.clamp(0.0, 1.0)) {
            return None;
        }

        let kind = PowerUpKind::random(rng);
        let (lo, hi) = (tuning.spawn_min, tuning.spawn_max.max(tuning.spawn_min));
        let pos = Vec3::new(
            lerp(lo.x, hi.x, rng.random::<f32>()),
            lerp(lo.y, hi.y, rng.random::<f32>()),
            lerp(lo.z, hi.z, rng.random::<f32>()),
        );
        self.pickups.push(Pickup {
            id: ids.next(),
            kind,
            pos,
            active: true,
        });
        log::debug!("Spawned {} pickup at {pos}", kind.as_str());
        Some(kind)
    }

    /// Float active pickups toward the lane point level with them, so the
    /// player still has to walk over to collect one
    pub fn update(&mut self, dt: f32, player_center: Vec3, tuning: &PowerUpTuning) {
        let step = tuning.drift_speed * dt.max(0.0);
        for pickup in self.pickups.iter_mut().filter(|p| p.active) {
            let lane_point = Vec3::new(pickup.pos.x, player_center.y, player_center.z);
            pickup.pos = move_toward(pickup.pos, lane_point, step);
        }
    }

    pub fn active_pickups(&self) -> usize {
        self.pickups.iter().filter(|p| p.active).count()
    }

    /// First active pickup whose sphere contains `point`
    pub fn pickup_at(&self, point: Vec3, radius: f32) -> Option<usize> {
        self.pickups
            .iter()
            .position(|p| p.active && sphere_contains(p.pos, radius, point))
    }

    /// Take a pickup out of play, returning its kind
    pub fn collect(&mut self, index: usize) -> Option<PowerUpKind> {
        let pickup = self.pickups.get_mut(index)?;
        if !pickup.active {
            return None;
        }
        pickup.active = false;
        Some(pickup.kind)
    }

    /// Append a new ledger entry
    pub fn activate(&mut self, kind: PowerUpKind, now_ms: f64, tuning: &PowerUpTuning) -> Effect {
        let effect = Effect {
            kind,
            started_at_ms: now_ms,
            duration_ms: tuning.duration_ms(kind),
        };
        self.effects.push(effect);
        log::info!(
            "{} active for {:.1}s ({} ledger entries)",
            kind.as_str(),
            effect.duration_ms / 1000.0,
            self.effects.len()
        );
        effect
    }

    /// Drop expired entries, returning their kinds in ledger order
    pub fn tick(&mut self, now_ms: f64) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        self.effects.retain(|effect| {
            if effect.is_expired(now_ms) {
                expired.push(effect.kind);
                false
            } else {
                true
            }
        });
        for kind in &expired {
            log::info!("{} expired", kind.as_str());
        }
        self.pickups.retain(|p| p.active);
        expired
    }

    pub fn has_active(&self, kind: PowerUpKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    /// Fire cooldown scale (rapid-fire < 1)
    pub fn cooldown_multiplier(&self, tuning: &PowerUpTuning) -> f64 {
        if self.has_active(PowerUpKind::RapidFire) {
            tuning.rapid_fire_fraction
        } else {
            1.0
        }
    }

    pub fn score_multiplier(&self, tuning: &PowerUpTuning) -> f64 {
        if self.has_active(PowerUpKind::ScoreMultiplier) {
            tuning.score_multiplier
        } else {
            1.0
        }
    }

    pub fn explosive_arrows(&self) -> bool {
        self.has_active(PowerUpKind::ExplosiveArrows)
    }

    /// Live ledger entries with their remaining time
    pub fn active_summary(&self, now_ms: f64) -> Vec<ActivePowerUp> {
        self.effects
            .iter()
            .map(|e| ActivePowerUp {
                kind: e.kind,
                remaining_ms: e.remaining_ms(now_ms),
            })
            .collect()
    }
}

fn move_toward(from: Vec3, to: Vec3, step: f32) -> Vec3 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= step || dist <= f32::EPSILON {
        to
    } else {
        from + delta * (step / dist)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn tuning() -> PowerUpTuning {
        PowerUpTuning::default()
    }

    #[test]
    fn test_effect_expiry_reverts_modifier() {
        let t = tuning();
        let mut p = PowerUps::new();
        p.activate(PowerUpKind::ScoreMultiplier, 1000.0, &t);
        assert_eq!(p.score_multiplier(&t), 3.0);
        assert!(p.tick(10999.0).is_empty());
        assert_eq!(p.tick(11000.0), vec![PowerUpKind::ScoreMultiplier]);
        assert_eq!(p.score_multiplier(&t), 1.0);
        assert!(!p.has_active(PowerUpKind::ScoreMultiplier));
    }

    #[test]
    fn test_same_kind_entries_expire_independently() {
        let t = tuning();
        let mut p = PowerUps::new();
        p.activate(PowerUpKind::RapidFire, 0.0, &t);
        p.activate(PowerUpKind::RapidFire, 5000.0, &t);
        assert_eq!(p.effects.len(), 2);

        assert_eq!(p.tick(8000.0), vec![PowerUpKind::RapidFire]);
        // Second entry keeps rapid-fire on
        assert_eq!(p.cooldown_multiplier(&t), 0.4);
        assert_eq!(p.tick(13000.0), vec![PowerUpKind::RapidFire]);
        assert_eq!(p.cooldown_multiplier(&t), 1.0);
    }

    #[test]
    fn test_explosive_flag() {
        let t = tuning();
        let mut p = PowerUps::new();
        assert!(!p.explosive_arrows());
        p.activate(PowerUpKind::ExplosiveArrows, 0.0, &t);
        assert!(p.explosive_arrows());
    }

    #[test]
    fn test_active_summary_remaining() {
        let t = tuning();
        let mut p = PowerUps::new();
        p.activate(PowerUpKind::ExplosiveArrows, 1000.0, &t);
        let summary = p.active_summary(3000.0);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].remaining_ms, 4000.0);
    }

    #[test]
    fn test_spawn_respects_interval_and_cap() {
        let t = PowerUpTuning {
            spawn_chance: 1.0,
            ..tuning()
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = IdAllocator::default();
        let mut p = PowerUps::new();

        // First poll arms the timer
        assert!(p.try_spawn(&mut ids, 0.0, &mut rng, &t).is_none());
        assert!(p.try_spawn(&mut ids, 100.0, &mut rng, &t).is_none());
        assert!(p.try_spawn(&mut ids, 8000.0, &mut rng, &t).is_some());
        assert!(p.try_spawn(&mut ids, 16000.0, &mut rng, &t).is_some());
        // Capped at two
        assert!(p.try_spawn(&mut ids, 24000.0, &mut rng, &t).is_none());
        assert_eq!(p.active_pickups(), 2);

        for pickup in &p.pickups {
            assert!(pickup.pos.cmpge(t.spawn_min).all());
            assert!(pickup.pos.cmple(t.spawn_max).all());
        }
    }

    #[test]
    fn test_zero_chance_never_spawns() {
        let t = PowerUpTuning {
            spawn_chance: 0.0,
            ..tuning()
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = IdAllocator::default();
        let mut p = PowerUps::new();
        for i in 0..20 {
            assert!(p.try_spawn(&mut ids, i as f64 * 8000.0, &mut rng, &t).is_none());
        }
    }

    #[test]
    fn test_pickups_drift_onto_lane_and_hold_x() {
        let t = tuning();
        let player = Vec3::new(0.0, 1.0, 0.0);
        let mut p = PowerUps::new();
        p.pickups.push(Pickup {
            id: 1,
            kind: PowerUpKind::ScoreMultiplier,
            pos: Vec3::new(-4.0, 5.0, -15.0),
            active: true,
        });

        p.update(1.0, player, &t);
        let pos = p.pickups[0].pos;
        assert_eq!(pos.x, -4.0);
        assert!((pos.distance(Vec3::new(-4.0, 5.0, -15.0)) - t.drift_speed).abs() < 1e-4);

        for _ in 0..30 {
            p.update(1.0, player, &t);
        }
        assert_eq!(p.pickups[0].pos, Vec3::new(-4.0, 1.0, 0.0));
    }

    #[test]
    fn test_collect_once() {
        let mut p = PowerUps::new();
        p.pickups.push(Pickup {
            id: 1,
            kind: PowerUpKind::RapidFire,
            pos: Vec3::new(0.0, 2.0, -10.0),
            active: true,
        });
        let idx = p.pickup_at(Vec3::new(0.3, 2.0, -10.0), 0.8).unwrap();
        assert_eq!(p.collect(idx), Some(PowerUpKind::RapidFire));
        assert_eq!(p.collect(idx), None);
        assert!(p.pickup_at(Vec3::new(0.3, 2.0, -10.0), 0.8).is_none());
    }
}
