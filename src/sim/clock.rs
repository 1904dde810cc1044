//! The two time bases the simulation runs on
//!
//! Physics, wheel rotation and animation phases integrate the per-frame
//! delta from [`SimClock`]. Power-up expiry, stun windows, target lifetimes
//! and spawn intervals are measured against a [`WallClock`]. The two are
//! independent: a slow frame advances wall-clock timers by real
//! time but physics by whatever delta the scheduler passes in.

use std::cell::Cell;
use std::time::Instant;

/// Source of wall-clock milliseconds
pub trait WallClock {
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven wall clock for tests and headless runs
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl WallClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: WallClock + ?Sized> WallClock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Variable-step simulation clock fed by the frame scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    delta: f32,
    elapsed: f32,
    frames: u64,
}

impl SimClock {
    /// Record one frame's delta (seconds)
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.delta = dt;
        self.elapsed += dt;
        self.frames += 1;
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Wall-clock interval gate for spawn cycles
///
/// The first poll only arms the timer, so intervals count from the first
/// frame rather than from the epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalTimer {
    last_ms: Option<f64>,
}

impl IntervalTimer {
    /// True (and re-armed) when `interval_ms` has passed since the last firing
    pub fn poll(&mut self, now_ms: f64, interval_ms: f64) -> bool {
        match self.last_ms {
            None => {
                self.last_ms = Some(now_ms);
                false
            }
            Some(last) if now_ms - last >= interval_ms => {
                self.last_ms = Some(now_ms);
                true
            }
            Some(_) => false,
        }
    }

    /// Restart the interval from `now_ms`
    pub fn reset(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100.0);
        assert_eq!(clock.now_ms(), 100.0);
        clock.advance(16.5);
        assert_eq!(clock.now_ms(), 116.5);
        clock.set(0.0);
        assert_eq!(clock.now_ms(), 0.0);
    }

    #[test]
    fn test_sim_clock_accumulates() {
        let mut clock = SimClock::default();
        clock.advance(0.016);
        clock.advance(0.034);
        assert!((clock.delta_seconds() - 0.034).abs() < 1e-6);
        assert!((clock.elapsed_seconds() - 0.05).abs() < 1e-6);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn test_sim_clock_ignores_negative_delta() {
        let mut clock = SimClock::default();
        clock.advance(-1.0);
        assert_eq!(clock.delta_seconds(), 0.0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
    }

    #[test]
    fn test_interval_timer_arms_on_first_poll() {
        let mut timer = IntervalTimer::default();
        assert!(!timer.poll(5000.0, 1000.0));
        assert!(!timer.poll(5999.0, 1000.0));
        assert!(timer.poll(6000.0, 1000.0));
        assert!(!timer.poll(6500.0, 1000.0));
        timer.reset(6800.0);
        assert!(!timer.poll(7500.0, 1000.0));
        assert!(timer.poll(7800.0, 1000.0));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
