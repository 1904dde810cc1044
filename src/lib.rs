//! Wheel Archer - gameplay simulation core for a rotating-wheel archery game
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (targets, arrows, power-ups, obstacles, scoring)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use sim::{GameEvent, GameState, HudSnapshot, Session, TickInput, tick};
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Downward acceleration applied to arrows and rocks (units/s²)
    pub const GRAVITY: f32 = 9.8;

    /// Wheel centre in world space; the wheel lies in the XY plane at this Z
    pub const WHEEL_CENTER: [f32; 3] = [0.0, 6.0, -25.0];
    /// Ring radius targets sit on (distance from wheel centre)
    pub const WHEEL_RING_RADIUS: f32 = 4.0;
    /// Extra radius beyond the ring that still counts as the scoring band
    pub const WHEEL_BAND_MARGIN: f32 = 1.5;
    /// Initial wheel angular velocity (radians per second)
    pub const WHEEL_ANGULAR_VELOCITY: f32 = 0.5;
    /// Multiplicative wheel speed-up applied on every hit (uncapped)
    pub const WHEEL_SPEEDUP_PER_HIT: f32 = 1.02;

    /// Player movement speed along the lane (units/s)
    pub const PLAYER_SPEED: f32 = 8.0;
    /// Player lane half-width (x is clamped to ±this)
    pub const PLAYER_LANE_HALF_WIDTH: f32 = 10.0;
    /// Player collision radius
    pub const PLAYER_RADIUS: f32 = 0.5;
    /// Height of the player's body centre above the ground
    pub const PLAYER_BODY_HEIGHT: f32 = 1.0;
    /// Height arrows are released from
    pub const BOW_HEIGHT: f32 = 1.5;

    /// Arrow launch speed (units/s)
    pub const ARROW_SPEED: f32 = 40.0;
    /// Base cooldown between shots (ms)
    pub const FIRE_COOLDOWN_MS: f64 = 500.0;
    /// Explosive arrows get this much extra hit radius
    pub const EXPLOSIVE_ARROW_HIT_BONUS: f32 = 0.5;
    /// Blast radius of an explosive arrow impact
    pub const EXPLOSIVE_ARROW_RADIUS: f32 = 3.0;
    /// Chain probability of an explosive arrow impact
    pub const EXPLOSIVE_ARROW_CHAIN: f32 = 0.5;
    /// Arrows beyond these bounds are parked
    pub const ARROW_BOUND_X: f32 = 60.0;
    pub const ARROW_BOUND_Y_MIN: f32 = -5.0;
    pub const ARROW_BOUND_Y_MAX: f32 = 60.0;
    pub const ARROW_BOUND_Z_MIN: f32 = -60.0;
    pub const ARROW_BOUND_Z_MAX: f32 = 20.0;

    /// Target spawn policy
    pub const MAX_TARGETS: usize = 8;
    pub const MIN_ANGULAR_SEPARATION: f32 = 0.5;
    pub const SPAWN_ATTEMPTS: u32 = 10;
    pub const TARGET_SPAWN_INTERVAL_MS: f64 = 1500.0;
    /// Default target collision radius
    pub const TARGET_SIZE: f32 = 0.6;

    /// Speed target angular velocity multiplier (relative to the wheel)
    pub const SPEED_MULTIPLIER: f32 = 2.5;
    /// Shrinking target parameters
    pub const SHRINK_MAX_SIZE: f32 = 0.9;
    pub const SHRINK_MIN_SIZE: f32 = 0.3;
    pub const SHRINK_RATIO: f32 = 0.8;
    pub const SHRINK_MAX_MISSES: u32 = 5;
    pub const SHRINK_MIN_POINTS: u32 = 10;
    pub const SHRINK_MAX_POINTS: u32 = 40;
    /// Split target parameters
    pub const SPLIT_MAX_DEPTH: u32 = 2;
    pub const SPLIT_ANGLE_OFFSET: f32 = 0.3;
    pub const SPLIT_CHILD_SIZE: f32 = 0.7;
    /// Ghost duty cycle (seconds)
    pub const GHOST_VISIBLE_SECS: f32 = 2.0;
    pub const GHOST_INVISIBLE_SECS: f32 = 1.5;
    /// Magnetic pull
    pub const MAGNET_RANGE: f32 = 6.0;
    pub const MAGNET_STRENGTH: f32 = 4.0;
    /// Explosive target blast
    pub const EXPLOSION_RADIUS: f32 = 3.0;
    pub const EXPLOSION_CHAIN: f32 = 0.5;

    /// Power-ups
    pub const POWERUP_SPAWN_INTERVAL_MS: f64 = 8000.0;
    pub const POWERUP_SPAWN_CHANCE: f64 = 0.5;
    pub const MAX_PICKUPS: usize = 2;
    pub const PICKUP_RADIUS: f32 = 0.8;
    /// Pickups float toward the lane at this speed (units/s)
    pub const PICKUP_DRIFT_SPEED: f32 = 1.5;
    pub const RAPID_FIRE_DURATION_MS: f64 = 8000.0;
    pub const RAPID_FIRE_FRACTION: f64 = 0.4;
    pub const EXPLOSIVE_ARROWS_DURATION_MS: f64 = 6000.0;
    pub const SCORE_MULTIPLIER_DURATION_MS: f64 = 10000.0;
    pub const SCORE_MULTIPLIER: f64 = 3.0;

    /// Obstacles
    pub const OBSTACLE_SPAWN_INTERVAL_MS: f64 = 4000.0;
    pub const ROCK_MIN_DISTANCE: f32 = 15.0;
    pub const ROCK_MAX_DISTANCE: f32 = 25.0;
    pub const ROCK_SPEED: f32 = 12.0;
    pub const ROCK_AIM_VARIANCE: f32 = 0.15;
    pub const ROCK_SPAWN_HEIGHT: f32 = 4.0;
    pub const ROCK_RADIUS: f32 = 0.7;
    pub const TREE_SPAWN_RADIUS: f32 = 6.0;
    pub const TREE_MIN_OFFSET: f32 = 2.0;
    pub const TREE_RADIUS: f32 = 0.9;
    pub const TREE_LIFETIME_SECS: f32 = 12.0;
    pub const BIRD_RADIUS: f32 = 0.5;
    pub const BIRD_SPEED: f32 = 6.0;
    pub const BIRD_SPAWN_OFFSET: f32 = 25.0;
    pub const BIRD_HEIGHT: f32 = 1.5;
    pub const BIRD_WAVE_AMPLITUDE: f32 = 0.8;
    pub const BIRD_WAVE_FREQUENCY: f32 = 2.0;
    pub const OBSTACLE_DESPAWN_DISTANCE: f32 = 40.0;
    pub const OBSTACLE_WARNING_DISTANCE: f32 = 6.0;
    pub const OBSTACLE_PENALTY: u64 = 15;
    pub const STUN_DURATION_MS: f64 = 1500.0;
    pub const STUN_SPEED_FRACTION: f32 = 0.3;

    /// Combo
    pub const COMBO_WINDOW_MS: f64 = 2000.0;
    pub const COMBO_INCREMENT: f64 = 0.5;
    pub const MAX_COMBO_MULTIPLIER: f64 = 5.0;
    pub const COMBO_MILESTONE_INTERVAL: u32 = 5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Shortest unsigned angular distance between two angles, in [0, π]
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Point on a wheel lying in the XY plane at `center.z`
#[inline]
pub fn wheel_point(center: Vec3, r: f32, theta: f32) -> Vec3 {
    center + Vec3::new(r * theta.cos(), r * theta.sin(), 0.0)
}
