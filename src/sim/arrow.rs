//! Arrow pool and ballistic integration
//!
//! Arrows live in a growable arena. Deactivated arrows are parked off-stage
//! and their slot goes on a free list; the next launch reuses it. The pool
//! never shrinks.

use glam::{Quat, Vec3};

use super::collision::within_bounds;

/// Where parked arrows wait for reuse
pub const PARKED_POS: Vec3 = Vec3::new(0.0, -1000.0, 0.0);

/// Index into the arrow pool
pub type ArrowId = usize;

#[derive(Debug, Clone)]
pub struct Arrow {
    pub pos: Vec3,
    /// Position before the last integration step
    pub prev_pos: Vec3,
    pub vel: Vec3,
    /// Rendering only
    pub orientation: Quat,
    pub active: bool,
    pub explosive: bool,
}

impl Arrow {
    fn parked() -> Self {
        Self {
            pos: PARKED_POS,
            prev_pos: PARKED_POS,
            vel: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            active: false,
            explosive: false,
        }
    }

    /// Variable-step Euler: position first, then gravity on velocity
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        self.prev_pos = self.pos;
        self.pos += self.vel * dt;
        self.vel.y -= gravity * dt;
        self.orient();
    }

    fn orient(&mut self) {
        if let Some(dir) = self.vel.try_normalize() {
            self.orientation = Quat::from_rotation_arc(Vec3::NEG_Z, dir);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArrowPool {
    arrows: Vec<Arrow>,
    free: Vec<ArrowId>,
}

impl ArrowPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire an arrow from `origin` toward `aim` at `speed`
    pub fn launch(&mut self, origin: Vec3, aim: Vec3, explosive: bool, speed: f32) -> ArrowId {
        let dir = (aim - origin).try_normalize().unwrap_or(Vec3::NEG_Z);
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                self.arrows.push(Arrow::parked());
                self.arrows.len() - 1
            }
        };

        let arrow = &mut self.arrows[id];
        arrow.pos = origin;
        arrow.prev_pos = origin;
        arrow.vel = dir * speed;
        arrow.active = true;
        arrow.explosive = explosive;
        arrow.orient();
        id
    }

    /// Park an arrow for reuse (no-op if already parked)
    pub fn deactivate(&mut self, id: ArrowId) {
        let Some(arrow) = self.arrows.get_mut(id) else {
            return;
        };
        if !arrow.active {
            return;
        }
        *arrow = Arrow::parked();
        self.free.push(id);
    }

    /// Integrate every active arrow and park the ones that left the bounds
    pub fn integrate(&mut self, dt: f32, gravity: f32, bounds_min: Vec3, bounds_max: Vec3) {
        let mut out_of_bounds = Vec::new();
        for (id, arrow) in self.arrows.iter_mut().enumerate() {
            if !arrow.active {
                continue;
            }
            arrow.integrate(dt, gravity);
            if !within_bounds(arrow.pos, bounds_min, bounds_max) {
                out_of_bounds.push(id);
            }
        }
        for id in out_of_bounds {
            self.deactivate(id);
        }
    }

    pub fn get(&self, id: ArrowId) -> Option<&Arrow> {
        self.arrows.get(id)
    }

    pub fn get_mut(&mut self, id: ArrowId) -> Option<&mut Arrow> {
        self.arrows.get_mut(id)
    }

    /// Ids of currently active arrows
    pub fn active_ids(&self) -> Vec<ArrowId> {
        self.arrows
            .iter()
            .enumerate()
            .filter(|(_, a)| a.active)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.arrows.iter().filter(|a| a.active).count()
    }

    /// Total slots ever allocated
    pub fn capacity(&self) -> usize {
        self.arrows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS_MIN: Vec3 = Vec3::new(-50.0, -5.0, -50.0);
    const BOUNDS_MAX: Vec3 = Vec3::new(50.0, 50.0, 50.0);

    #[test]
    fn test_launch_sets_velocity_toward_aim() {
        let mut pool = ArrowPool::new();
        let id = pool.launch(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), false, 40.0);
        let arrow = pool.get(id).unwrap();
        assert!(arrow.active);
        assert!((arrow.vel - Vec3::new(0.0, 0.0, -40.0)).length() < 1e-4);
    }

    #[test]
    fn test_degenerate_aim_fires_forward() {
        let mut pool = ArrowPool::new();
        let id = pool.launch(Vec3::ONE, Vec3::ONE, false, 10.0);
        assert!((pool.get(id).unwrap().vel - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4);
    }

    #[test]
    fn test_integrate_applies_gravity_after_position() {
        let mut arrow = Arrow::parked();
        arrow.active = true;
        arrow.pos = Vec3::ZERO;
        arrow.vel = Vec3::new(0.0, 10.0, -20.0);
        arrow.integrate(0.5, 10.0);
        assert!((arrow.pos - Vec3::new(0.0, 5.0, -10.0)).length() < 1e-5);
        assert!((arrow.vel - Vec3::new(0.0, 5.0, -20.0)).length() < 1e-5);
        assert_eq!(arrow.prev_pos, Vec3::ZERO);
    }

    #[test]
    fn test_pool_reuses_parked_slots() {
        let mut pool = ArrowPool::new();
        let a = pool.launch(Vec3::ZERO, Vec3::NEG_Z, false, 10.0);
        let b = pool.launch(Vec3::ZERO, Vec3::NEG_Z, true, 10.0);
        assert_eq!(pool.capacity(), 2);

        pool.deactivate(a);
        assert_eq!(pool.get(a).unwrap().pos, PARKED_POS);
        assert_eq!(pool.active_count(), 1);

        let c = pool.launch(Vec3::ZERO, Vec3::NEG_Z, false, 10.0);
        assert_eq!(c, a);
        assert_eq!(pool.capacity(), 2);
        assert!(pool.get(b).unwrap().explosive);
        assert!(!pool.get(c).unwrap().explosive);
    }

    #[test]
    fn test_double_deactivate_does_not_duplicate_free_slot() {
        let mut pool = ArrowPool::new();
        let a = pool.launch(Vec3::ZERO, Vec3::NEG_Z, false, 10.0);
        pool.deactivate(a);
        pool.deactivate(a);
        let b = pool.launch(Vec3::ZERO, Vec3::NEG_Z, false, 10.0);
        let c = pool.launch(Vec3::ZERO, Vec3::NEG_Z, false, 10.0);
        assert_ne!(b, c);
    }

    #[test]
    fn test_out_of_bounds_arrows_are_parked() {
        let mut pool = ArrowPool::new();
        let id = pool.launch(Vec3::ZERO, Vec3::NEG_Z, false, 100.0);
        pool.integrate(0.4, 0.0, BOUNDS_MIN, BOUNDS_MAX);
        assert!(pool.get(id).unwrap().active);
        pool.integrate(0.2, 0.0, BOUNDS_MIN, BOUNDS_MAX);
        assert!(!pool.get(id).unwrap().active);
        assert_eq!(pool.capacity(), 1);
    }
}
