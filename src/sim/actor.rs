//! Game-level actors
//!
//! Actors carry gameplay identity only. Their physical representation lives in
//! the physics world and is linked through the registry.

use std::fmt;

use rapier2d::prelude::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

/// Stable actor handle, issued once per actor and never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Actor category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// The playable bird
    Bird,
    /// Pedestrian walking along the ground, the poop target
    Npc,
    /// Column rising from the ground
    Obstacle,
    /// Fixed-width ground segment
    Ground,
    /// Projectile dropped by the bird
    Poop,
}

/// How the physics world should treat an actor's body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Integrated by the solver (gravity, contacts)
    Dynamic,
    /// Moved only by the velocity we assign
    Kinematic,
}

// Collision membership bits
const GROUP_GROUND: Group = Group::GROUP_1;
const GROUP_BIRD: Group = Group::GROUP_2;
const GROUP_POOP: Group = Group::GROUP_3;
const GROUP_OBSTACLE: Group = Group::GROUP_4;
const GROUP_NPC: Group = Group::GROUP_5;

impl ActorKind {
    pub fn body_kind(self) -> BodyKind {
        match self {
            ActorKind::Bird | ActorKind::Poop => BodyKind::Dynamic,
            ActorKind::Npc | ActorKind::Obstacle | ActorKind::Ground => BodyKind::Kinematic,
        }
    }

    /// Membership and filter bits. The bird never touches its own poop.
    pub fn collision_groups(self) -> InteractionGroups {
        match self {
            ActorKind::Bird => InteractionGroups::new(
                GROUP_BIRD,
                GROUP_GROUND | GROUP_OBSTACLE | GROUP_NPC,
            ),
            ActorKind::Poop => InteractionGroups::new(
                GROUP_POOP,
                GROUP_GROUND | GROUP_OBSTACLE | GROUP_NPC,
            ),
            ActorKind::Ground => InteractionGroups::new(GROUP_GROUND, GROUP_BIRD | GROUP_POOP),
            ActorKind::Obstacle => InteractionGroups::new(GROUP_OBSTACLE, GROUP_BIRD | GROUP_POOP),
            ActorKind::Npc => InteractionGroups::new(GROUP_NPC, GROUP_BIRD | GROUP_POOP),
        }
    }

    /// Touching an actor of this kind ends the run
    pub fn is_fatal_to_bird(self) -> bool {
        matches!(self, ActorKind::Ground | ActorKind::Obstacle | ActorKind::Npc)
    }

    /// Poop that touches this kind is used up
    pub fn absorbs_poop(self) -> bool {
        matches!(self, ActorKind::Ground | ActorKind::Obstacle | ActorKind::Npc)
    }
}

/// Collision shape in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { half_width: f32, half_height: f32 },
    Circle { radius: f32 },
}

impl Shape {
    #[inline]
    pub fn half_width(&self) -> f32 {
        match *self {
            Shape::Box { half_width, .. } => half_width,
            Shape::Circle { radius } => radius,
        }
    }

    #[inline]
    pub fn half_height(&self) -> f32 {
        match *self {
            Shape::Box { half_height, .. } => half_height,
            Shape::Circle { radius } => radius,
        }
    }
}

/// A game-level entity with a physical representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub shape: Shape,
    /// Visual variant, picked by the view per kind
    pub skin: u8,
}

impl Actor {
    pub fn new(id: ActorId, kind: ActorKind, shape: Shape) -> Self {
        Self {
            id,
            kind,
            shape,
            skin: 0,
        }
    }

    pub fn with_skin(mut self, skin: u8) -> Self {
        self.skin = skin;
        self
    }
}
