//! Game state and core simulation types
//!
//! Everything a frame reads or writes lives on [`GameState`]. Presentation
//! reads the public fields and [`GameState::hud`]; it never mutates them.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arrow::ArrowPool;
use super::clock::IntervalTimer;
use super::combo::Combo;
use super::events::GameEvent;
use super::obstacle::Obstacles;
use super::powerup::{ActivePowerUp, PowerUps};
use super::target::Target;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Physics and spawns frozen
    Paused,
}

/// The rotating wheel targets ride on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wheel {
    pub center: Vec3,
    pub ring_radius: f32,
    /// Outer edge of the scoring band
    pub band_radius: f32,
    /// Accumulated rotation (radians, unwrapped)
    pub rotation: f32,
    pub angular_velocity: f32,
    /// Angular velocity factor applied per hit
    pub speedup: f32,
}

impl Wheel {
    pub fn new(tuning: &Tuning) -> Self {
        let w = &tuning.wheel;
        Self {
            center: w.center,
            ring_radius: w.ring_radius,
            band_radius: w.ring_radius + w.band_margin,
            rotation: 0.0,
            angular_velocity: w.angular_velocity,
            speedup: w.speedup_per_hit,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.rotation += self.angular_velocity * dt;
    }

    /// Spin faster after a hit (no cap)
    pub fn speed_up(&mut self) {
        self.angular_velocity *= self.speedup;
    }

    /// Whether a point on the wheel plane lies inside the scoring band
    pub fn in_band(&self, point: Vec3) -> bool {
        let offset = Vec2::new(point.x - self.center.x, point.y - self.center.y);
        offset.length() <= self.band_radius
    }
}

/// The archer, walking a lane along x at z = 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Feet position
    pub pos: Vec3,
    /// World point the bow is aimed at
    pub aim: Vec3,
    body_height: f32,
    bow_height: f32,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec3::ZERO,
            aim: tuning.wheel.center,
            body_height: tuning.player.body_height,
            bow_height: tuning.player.bow_height,
        }
    }

    /// Body centre used for contact tests
    pub fn center(&self) -> Vec3 {
        self.pos + Vec3::Y * self.body_height
    }

    /// Arrow release point
    pub fn bow(&self) -> Vec3 {
        self.pos + Vec3::Y * self.bow_height
    }

    /// Move along the lane, clamped to its half-width
    pub fn move_along(&mut self, axis: f32, speed: f32, dt: f32, half_width: f32) {
        let axis = axis.clamp(-1.0, 1.0);
        self.pos.x = (self.pos.x + axis * speed * dt).clamp(-half_width, half_width);
    }
}

/// Monotonic entity ids shared by targets, pickups and obstacles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Running totals for the session summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub shots_fired: u32,
    /// Targets struck directly by an arrow
    pub hits: u32,
    pub misses: u32,
    pub best_combo: u32,
    /// Targets destroyed by explosions
    pub chain_kills: u32,
    pub targets_expired: u32,
    pub obstacles_hit: u32,
    pub power_ups_collected: u32,
}

impl SessionStats {
    /// Direct hits per shot (0 before the first shot)
    pub fn accuracy(&self) -> f64 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits as f64 / self.shots_fired as f64
        }
    }
}

/// What the HUD shows for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub combo_count: u32,
    pub combo_multiplier: f64,
    /// Next hit would extend the combo
    pub combo_live: bool,
    pub power_ups: Vec<ActivePowerUp>,
    pub stunned: bool,
    pub paused: bool,
    pub targets: usize,
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    pub wheel: Wheel,
    pub arrows: ArrowPool,
    /// Targets on the wheel (sorted by id between ticks)
    pub targets: Vec<Target>,
    pub power_ups: PowerUps,
    pub obstacles: Obstacles,
    pub combo: Combo,
    pub score: u64,
    pub stats: SessionStats,
    pub ids: IdAllocator,
    pub target_timer: IntervalTimer,
    /// Wall-clock time of the last shot
    pub last_fire_ms: Option<f64>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            player: Player::new(&tuning),
            wheel: Wheel::new(&tuning),
            arrows: ArrowPool::new(),
            targets: Vec::new(),
            power_ups: PowerUps::new(),
            obstacles: Obstacles::new(),
            combo: Combo::new(),
            score: 0,
            stats: SessionStats::default(),
            ids: IdAllocator::default(),
            target_timer: IntervalTimer::default(),
            last_fire_ms: None,
            events: Vec::new(),
            tuning,
        }
    }

    /// Queue an outbound event
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand queued events to presentation
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn active_targets(&self) -> usize {
        self.targets.iter().filter(|t| t.active).count()
    }

    /// Cooldown (scaled by rapid-fire) has elapsed and the player isn't stunned
    pub fn can_fire(&self, now_ms: f64) -> bool {
        if self.obstacles.stun.is_stunned(now_ms) {
            return false;
        }
        let cooldown = self.tuning.arrows.fire_cooldown_ms
            * self.power_ups.cooldown_multiplier(&self.tuning.power_ups);
        self.last_fire_ms
            .is_none_or(|last| now_ms - last >= cooldown)
    }

    /// Deduct points, flooring the score at zero
    pub fn apply_penalty(&mut self, penalty: u64) {
        self.score = self.score.saturating_sub(penalty);
    }

    pub fn hud(&self, now_ms: f64) -> HudSnapshot {
        HudSnapshot {
            score: self.score,
            combo_count: self.combo.count,
            combo_multiplier: self.combo.multiplier,
            combo_live: self.combo.is_live(now_ms, &self.tuning.combo),
            power_ups: self.power_ups.active_summary(now_ms),
            stunned: self.obstacles.stun.is_stunned(now_ms),
            paused: self.phase == GamePhase::Paused,
            targets: self.active_targets(),
        }
    }

    /// Keep entity lists sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.targets.sort_by_key(|t| t.id);
        self.power_ups.pickups.sort_by_key(|p| p.id);
        self.obstacles.list.sort_by_key(|o| o.id);
    }
}
