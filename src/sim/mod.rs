//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - Variable timestep physics, wall-clock timers
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod arrow;
pub mod clock;
pub mod collision;
pub mod combo;
pub mod events;
pub mod obstacle;
pub mod powerup;
pub mod session;
pub mod spawn;
pub mod state;
pub mod target;
pub mod tick;

pub use arrow::{Arrow, ArrowId, ArrowPool};
pub use clock::{IntervalTimer, ManualClock, SimClock, SystemClock, WallClock};
pub use combo::{Award, Combo};
pub use events::GameEvent;
pub use obstacle::{Obstacle, ObstacleKind, Obstacles, Stun};
pub use powerup::{ActivePowerUp, Effect, Pickup, PowerUpKind, PowerUps};
pub use session::Session;
pub use state::{GamePhase, GameState, HudSnapshot, IdAllocator, Player, SessionStats, Wheel};
pub use target::{Behavior, HitResult, MysteryReward, SpecialEffect, Target, TargetKind};
pub use tick::{TickInput, tick};
