//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (by actor ID)
//! - No rendering or platform dependencies

pub mod abilities;
pub mod actor;
pub mod debug_draw;
pub mod ground;
pub mod logic;
pub mod physics;
pub mod registry;
pub mod spawner;
pub mod state;
pub mod tick;

pub use abilities::BirdAbilities;
pub use actor::{Actor, ActorId, ActorKind, BodyKind, Shape};
pub use debug_draw::{DebugColor, DebugDrawer, LogDrawer, RecordingDrawer};
pub use ground::GroundStrip;
pub use logic::GameLogic;
pub use physics::{BodyDesc, BodyHandle, BodyState, ContactStart, PhysicsWorld};
pub use registry::{ActorRegistry, Registration};
pub use spawner::{NPC_SKINS, SpawnKind, Spawner};
pub use state::{GameEvent, GamePhase, VisibleActor};
