//! Phase machine and observable outputs of the simulation

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorId};
use super::physics::BodyState;

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Attract mode: ground scrolls, bird idles, no scoring
    Demo,
    /// Active gameplay
    Playing,
    /// Run ended; physics settles, nothing else moves forward
    GameOver,
}

/// Something the UI may want to react to. Drained by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    PoopDropped { poops_left: u32 },
    NpcHit { npc: ActorId, score: u32 },
    GameOver { score: u32 },
}

/// Snapshot of one registered actor for the view
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleActor {
    pub actor: Actor,
    pub body: BodyState,
    pub inherit_world_scroll: bool,
}
