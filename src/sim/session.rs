//! Frame driver pairing the game state with its two clocks

use super::clock::{SimClock, WallClock};
use super::events::GameEvent;
use super::state::{GameState, HudSnapshot};
use super::tick::{TickInput, tick};

/// A running game: state, wall clock for timers, sim clock for physics
#[derive(Debug)]
pub struct Session<C: WallClock> {
    pub state: GameState,
    pub clock: C,
    pub sim: SimClock,
}

impl<C: WallClock> Session<C> {
    pub fn new(state: GameState, clock: C) -> Self {
        Self {
            state,
            clock,
            sim: SimClock::default(),
        }
    }

    /// Run one frame of `dt` seconds and return the events it produced
    pub fn frame(&mut self, input: &TickInput, dt: f32) -> Vec<GameEvent> {
        self.sim.advance(dt);
        let now_ms = self.clock.now_ms();
        tick(&mut self.state, input, self.sim.delta_seconds(), now_ms);
        self.state.drain_events()
    }

    pub fn hud(&self) -> HudSnapshot {
        self.state.hud(self.clock.now_ms())
    }
}
