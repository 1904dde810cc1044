//! Outbound notifications for the presentation layer
//!
//! Fire-and-forget: the simulation queues these during a tick and never
//! reads them back.

use serde::Serialize;

use super::obstacle::ObstacleKind;
use super::powerup::PowerUpKind;
use super::target::TargetKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    ArrowFired { explosive: bool },
    TargetSpawned { id: u32, kind: TargetKind },
    TargetHit { id: u32, kind: TargetKind, points: u64 },
    /// Lifetime ran out or a Shrinking target wore away
    TargetExpired { id: u32, kind: TargetKind },
    /// An arrow crossed the wheel without hitting anything
    Miss,
    ChainReaction { destroyed: u32 },
    MysteryRevealed { message: String },
    ComboMilestone { count: u32 },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    ObstacleWarning { kind: ObstacleKind },
    /// Presentation should shake the camera
    ObstacleCollision { kind: ObstacleKind, penalty: u64 },
}

impl GameEvent {
    /// HUD message text, if this event shows one
    pub fn message(&self) -> Option<String> {
        match self {
            GameEvent::TargetHit { kind, points, .. } => Some(format!("{} +{points}", kind.as_str())),
            GameEvent::MysteryRevealed { message } => Some(message.clone()),
            GameEvent::ComboMilestone { count } => Some(format!("{count}x combo!")),
            GameEvent::ChainReaction { destroyed } if *destroyed > 0 => {
                Some(format!("Chain reaction! {destroyed} destroyed"))
            }
            GameEvent::PowerUpCollected { kind } => Some(format!("{} activated!", kind.as_str())),
            GameEvent::PowerUpExpired { kind } => Some(format!("{} expired", kind.as_str())),
            GameEvent::ObstacleWarning { kind } => Some(format!("Incoming {}!", kind.as_str())),
            GameEvent::ObstacleCollision { kind, penalty } => {
                Some(format!("Hit by {}! -{penalty}", kind.as_str()))
            }
            _ => None,
        }
    }
}
