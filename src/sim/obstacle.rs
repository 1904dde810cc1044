//! Hazards that interrupt the archer: flying rocks, trees and bird flocks
//!
//! Obstacles only ever interact with the player. Contact costs points and
//! starts a stun window; getting close without touching raises a one-shot
//! warning.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::IntervalTimer;
use super::collision::{horizontal_distance, spheres_overlap};
use super::spawn::weighted_pick;
use super::state::IdAllocator;
use crate::tuning::ObstacleTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Tree,
    Bird,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Rock => "Rock",
            ObstacleKind::Tree => "Tree",
            ObstacleKind::Bird => "Bird",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec3,
    pub vel: Vec3,
    pub radius: f32,
    pub active: bool,
    /// Bird wave state
    pub base_height: f32,
    pub wave_phase: f32,
    pub age: f32,
    /// Warning already raised for this obstacle
    pub warned: bool,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec3, vel: Vec3, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel,
            radius,
            active: true,
            base_height: pos.y,
            wave_phase: 0.0,
            age: 0.0,
            warned: false,
        }
    }

    /// Contact distance metric: trees are tall, so only ground distance matters
    fn distance_to(&self, player_center: Vec3) -> f32 {
        match self.kind {
            ObstacleKind::Tree => horizontal_distance(self.pos, player_center),
            _ => self.pos.distance(player_center),
        }
    }

    pub fn check_collision(&self, player_center: Vec3, player_radius: f32) -> bool {
        if !self.active {
            return false;
        }
        match self.kind {
            ObstacleKind::Tree => self.distance_to(player_center) <= self.radius + player_radius,
            _ => spheres_overlap(self.pos, self.radius, player_center, player_radius),
        }
    }

    /// Within warning range but not yet touching
    pub fn is_incoming(&self, player_center: Vec3, player_radius: f32, warning_distance: f32) -> bool {
        self.active
            && !self.check_collision(player_center, player_radius)
            && self.distance_to(player_center) <= warning_distance
    }

    fn update(&mut self, dt: f32, gravity: f32, tuning: &ObstacleTuning) {
        match self.kind {
            ObstacleKind::Rock => {
                self.pos += self.vel * dt;
                self.vel.y -= gravity * dt;
                if self.pos.y < -1.0 {
                    self.active = false;
                }
            }
            ObstacleKind::Tree => {
                self.age += dt;
                if self.age >= tuning.tree_lifetime {
                    self.active = false;
                }
            }
            ObstacleKind::Bird => {
                self.age += dt;
                self.pos.x += self.vel.x * dt;
                self.pos.z += self.vel.z * dt;
                self.pos.y = self.base_height
                    + tuning.bird_wave_amplitude
                        * (self.age * tuning.bird_wave_frequency + self.wave_phase).sin();
            }
        }
    }
}

/// Reduced-control window after an obstacle hit
#[derive(Debug, Clone, Copy, Default)]
pub struct Stun {
    until_ms: Option<f64>,
}

impl Stun {
    pub fn start(&mut self, now_ms: f64, duration_ms: f64) {
        self.until_ms = Some(now_ms + duration_ms);
    }

    pub fn is_stunned(&self, now_ms: f64) -> bool {
        self.until_ms.is_some_and(|until| now_ms < until)
    }

    /// Movement speed factor at `now_ms`
    pub fn speed_factor(&self, now_ms: f64, stunned_fraction: f32) -> f32 {
        if self.is_stunned(now_ms) {
            stunned_fraction
        } else {
            1.0
        }
    }
}

/// What happened between the player and the obstacle field this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactReport {
    pub collisions: Vec<ObstacleKind>,
    pub warnings: Vec<ObstacleKind>,
}

#[derive(Debug, Clone, Default)]
pub struct Obstacles {
    pub list: Vec<Obstacle>,
    pub stun: Stun,
    spawn_timer: IntervalTimer,
}

impl Obstacles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a weighted-random obstacle if the interval has elapsed
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        ids: &mut IdAllocator,
        player_center: Vec3,
        gravity: f32,
        now_ms: f64,
        rng: &mut R,
        tuning: &ObstacleTuning,
    ) -> Option<ObstacleKind> {
        if !self.spawn_timer.poll(now_ms, tuning.spawn_interval_ms) {
            return None;
        }
        let kind = weighted_pick(&tuning.weights(), rng)?;
        self.spawn(kind, ids, player_center, gravity, rng, tuning);
        Some(kind)
    }

    /// Spawn one obstacle (a whole flock for birds)
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        kind: ObstacleKind,
        ids: &mut IdAllocator,
        player_center: Vec3,
        gravity: f32,
        rng: &mut R,
        tuning: &ObstacleTuning,
    ) {
        let radius = tuning.radius(kind);
        match kind {
            ObstacleKind::Rock => {
                let heading = rng.random_range(0.0..std::f32::consts::TAU);
                let dist = sample(rng, tuning.rock_min_distance, tuning.rock_max_distance);
                let pos = Vec3::new(
                    player_center.x + heading.cos() * dist,
                    tuning.rock_spawn_height,
                    player_center.z + heading.sin() * dist,
                );
                let yaw = sample(rng, -tuning.rock_aim_variance, tuning.rock_aim_variance);
                let vel = ballistic_velocity(pos, player_center, tuning.rock_speed, gravity, yaw);
                self.list.push(Obstacle::new(ids.next(), kind, pos, vel, radius));
            }
            ObstacleKind::Tree => {
                let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let offset = sample(rng, tuning.tree_min_offset, tuning.tree_spawn_radius);
                let pos = Vec3::new(player_center.x + side * offset, 0.0, player_center.z);
                self.list.push(Obstacle::new(ids.next(), kind, pos, Vec3::ZERO, radius));
            }
            ObstacleKind::Bird => {
                let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                let flock = rng.random_range(1..=3);
                let vel = Vec3::new(-side * tuning.bird_speed, 0.0, 0.0);
                for i in 0..flock {
                    let pos = Vec3::new(
                        player_center.x + side * (tuning.bird_spawn_offset + i as f32 * 1.5),
                        tuning.bird_height + sample(rng, -0.3, 0.3),
                        player_center.z + sample(rng, -0.5, 0.5),
                    );
                    let mut bird = Obstacle::new(ids.next(), kind, pos, vel, radius);
                    bird.wave_phase = rng.random_range(0.0..std::f32::consts::TAU);
                    self.list.push(bird);
                }
            }
        }
        log::debug!("Spawned {} obstacle", kind.as_str());
    }

    /// Advance motion and drop obstacles that strayed too far
    pub fn update(&mut self, dt: f32, player_center: Vec3, gravity: f32, tuning: &ObstacleTuning) {
        for obstacle in self.list.iter_mut().filter(|o| o.active) {
            obstacle.update(dt, gravity, tuning);
            if obstacle.pos.distance(player_center) > tuning.despawn_distance {
                obstacle.active = false;
            }
        }
        self.list.retain(|o| o.active);
    }

    /// Resolve player contacts: collisions deactivate the obstacle and start
    /// the stun window; near misses raise a single warning each.
    pub fn resolve_contacts(
        &mut self,
        player_center: Vec3,
        player_radius: f32,
        now_ms: f64,
        tuning: &ObstacleTuning,
    ) -> ContactReport {
        let mut report = ContactReport::default();
        for obstacle in self.list.iter_mut().filter(|o| o.active) {
            if obstacle.check_collision(player_center, player_radius) {
                obstacle.active = false;
                report.collisions.push(obstacle.kind);
            } else if !obstacle.warned
                && obstacle.is_incoming(player_center, player_radius, tuning.warning_distance)
            {
                obstacle.warned = true;
                report.warnings.push(obstacle.kind);
            }
        }
        if !report.collisions.is_empty() {
            self.stun.start(now_ms, tuning.stun_duration_ms);
            log::info!(
                "Player stunned until {:.0}ms by {:?}",
                now_ms + tuning.stun_duration_ms,
                report.collisions
            );
        }
        self.list.retain(|o| o.active);
        report
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

/// Launch velocity that carries a projectile from `from` to `to` under
/// gravity at the given horizontal speed, with the heading yawed by `yaw`.
pub fn ballistic_velocity(from: Vec3, to: Vec3, horizontal_speed: f32, gravity: f32, yaw: f32) -> Vec3 {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    let ground = (dx * dx + dz * dz).sqrt();
    if ground <= f32::EPSILON || horizontal_speed <= 0.0 {
        return Vec3::ZERO;
    }
    let (sin, cos) = yaw.sin_cos();
    let (hx, hz) = (dx / ground, dz / ground);
    let dir_x = hx * cos - hz * sin;
    let dir_z = hx * sin + hz * cos;

    let flight_time = ground / horizontal_speed;
    let vy = (to.y - from.y + 0.5 * gravity * flight_time * flight_time) / flight_time;
    Vec3::new(dir_x * horizontal_speed, vy, dir_z * horizontal_speed)
}
