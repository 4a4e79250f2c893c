//! Poop Patrol - simulation core of a side-scrolling bird game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics world, actors, abilities, spawning)
//! - `tuning`: Data-driven game balance
//!
//! The world is in meters with y pointing up. The bird stays at a fixed x
//! while the ground, NPCs and obstacles scroll left at the world scroll speed.

pub mod sim;
pub mod tuning;

pub use sim::{GameEvent, GameLogic, GamePhase};
pub use tuning::{Tuning, TuningError};

/// Frame loop constants for drivers of [`GameLogic`]
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}
