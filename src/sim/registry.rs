//! Actor ↔ body registry
//!
//! The single source of truth for which physical actors exist. Entries are
//! keyed by `ActorId` and iterate in id order so that every pass over the
//! registry is deterministic.

use std::collections::{BTreeMap, HashMap};

use rapier2d::prelude::ColliderHandle;

use super::actor::{Actor, ActorId};
use super::physics::BodyHandle;

/// One registered actor and the physics handles it owns
#[derive(Debug, Clone)]
pub struct Registration {
    pub actor: Actor,
    pub body: BodyHandle,
    pub collider: ColliderHandle,
    pub inherit_world_scroll: bool,
}

#[derive(Debug, Default)]
pub struct ActorRegistry {
    entries: BTreeMap<ActorId, Registration>,
    by_body: HashMap<BodyHandle, ActorId>,
    by_collider: HashMap<ColliderHandle, ActorId>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an actor.
    ///
    /// # Panics
    /// If the actor already has a body.
    pub fn insert(
        &mut self,
        actor: Actor,
        body: BodyHandle,
        collider: ColliderHandle,
        inherit_world_scroll: bool,
    ) {
        let id = actor.id;
        assert!(
            !self.entries.contains_key(&id),
            "{id} is already registered with a body"
        );
        self.by_body.insert(body, id);
        self.by_collider.insert(collider, id);
        self.entries.insert(
            id,
            Registration {
                actor,
                body,
                collider,
                inherit_world_scroll,
            },
        );
    }

    /// Unregister an actor, handing back its handles so the caller can destroy the body
    pub fn remove(&mut self, id: ActorId) -> Option<Registration> {
        let entry = self.entries.remove(&id)?;
        self.by_body.remove(&entry.body);
        self.by_collider.remove(&entry.collider);
        Some(entry)
    }

    pub fn get(&self, id: ActorId) -> Option<&Registration> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn body(&self, id: ActorId) -> Option<BodyHandle> {
        self.entries.get(&id).map(|e| e.body)
    }

    pub fn actor_for_body(&self, body: BodyHandle) -> Option<ActorId> {
        self.by_body.get(&body).copied()
    }

    pub fn actor_for_collider(&self, collider: ColliderHandle) -> Option<&Actor> {
        let id = self.by_collider.get(&collider)?;
        self.entries.get(id).map(|e| &e.actor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Registration)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// Bodies that follow the world scroll
    pub fn scrolling_bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.entries
            .values()
            .filter(|e| e.inherit_world_scroll)
            .map(|e| e.body)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
