//! Per-frame simulation update
//!
//! Ordering within a frame is fixed:
//! 1. scroll acceleration (playing only)
//! 2. bird abilities and flight
//! 3. physics step
//! 4. ground recycling
//! 5. spawning (playing only)
//! 6. contact resolution
//! 7. pruning of consumed and off-screen actors
//!
//! Spawns happen after the physics step, so a new actor is seen at its exact
//! spawn position until the next frame.

use glam::Vec2;

use super::actor::{ActorId, ActorKind};
use super::logic::GameLogic;
use super::physics::ContactStart;
use super::state::{GameEvent, GamePhase};

impl GameLogic {
    /// Advance the game by `dt` seconds.
    ///
    /// # Panics
    /// If called before [`GameLogic::init`].
    pub fn update(&mut self, dt: f32) {
        self.assert_initialized();

        if self.phase == GamePhase::Playing {
            self.accelerate_scroll(dt);
        }
        self.drive_bird(dt);

        let contacts = self.world.step(dt);

        self.recycle_ground();
        if self.phase == GamePhase::Playing {
            self.run_spawner(dt);
        }
        self.resolve_contacts(&contacts);
        self.prune();
    }

    fn accelerate_scroll(&mut self, dt: f32) {
        let headroom = self.tuning.max_scroll_speed - self.scroll_speed;
        if headroom > 0.0 {
            self.increase_scroll_speed((self.tuning.scroll_acceleration * dt).min(headroom));
        }
    }

    fn drive_bird(&mut self, dt: f32) {
        let Some(handle) = self.registry.body(self.bird) else {
            return;
        };
        match self.phase {
            GamePhase::Demo => {
                self.world
                    .set_translation(handle, self.tuning.bird_idle_position);
                self.world.set_linear_velocity(handle, Vec2::ZERO);
            }
            GamePhase::Playing => {
                self.abilities.advance(dt);
                let Some(state) = self.world.state(handle) else {
                    return;
                };
                let mut vy = state.linear_velocity.y;
                if self.abilities.is_flying() {
                    vy = (vy + self.tuning.flight_acceleration * dt)
                        .min(self.tuning.max_ascent_speed);
                }

                // Ceiling
                let ceiling = self.tuning.view_height - self.tuning.bird_radius;
                if state.position.y >= ceiling && vy > 0.0 {
                    vy = 0.0;
                    self.world
                        .set_translation(handle, Vec2::new(state.position.x, ceiling));
                }
                self.world.set_linear_velocity(handle, Vec2::new(0.0, vy));
            }
            // Gravity only
            GamePhase::GameOver => {}
        }
    }

    /// Move segments that left the screen to the far end of the strip
    fn recycle_ground(&mut self) {
        let registry = &self.registry;
        let world = &self.world;
        let moves = self.grounds.recycle(|id| {
            registry
                .body(id)
                .and_then(|h| world.state(h))
                .map(|s| s.position.x)
        });

        let y = self.tuning.ground_height / 2.0;
        for (id, x) in moves {
            if let Some(handle) = self.registry.body(id) {
                self.world.set_translation(handle, Vec2::new(x, y));
                log::trace!("Recycled ground {id} to x={x:.2}");
            }
        }
    }

    fn run_spawner(&mut self, dt: f32) {
        let x = self.tuning.view_width + self.tuning.spawn_margin;
        for kind in self.spawner.advance(dt) {
            self.spawn(kind, x);
        }
    }

    fn resolve_contacts(&mut self, contacts: &[ContactStart]) {
        for contact in contacts {
            let a = self
                .registry
                .actor_for_collider(contact.collider_a)
                .map(|a| (a.id, a.kind));
            let b = self
                .registry
                .actor_for_collider(contact.collider_b)
                .map(|a| (a.id, a.kind));
            let (Some(a), Some(b)) = (a, b) else {
                continue;
            };
            self.resolve_pair(a, b);
            self.resolve_pair(b, a);
        }
    }

    /// React to `subject` touching `other`. Called once per side of a contact.
    fn resolve_pair(&mut self, subject: (ActorId, ActorKind), other: (ActorId, ActorKind)) {
        let (id, kind) = subject;
        let (other_id, other_kind) = other;
        match kind {
            ActorKind::Bird if other_kind.is_fatal_to_bird() => {
                if self.phase == GamePhase::Playing {
                    self.game_over(other_id);
                }
            }
            ActorKind::Poop if other_kind == ActorKind::Npc => {
                if self.consumed.contains(&id) {
                    return;
                }
                self.consumed.insert(id);
                if self.phase == GamePhase::Playing && self.consumed.insert(other_id) {
                    self.score += 1;
                    self.events.push(GameEvent::NpcHit {
                        npc: other_id,
                        score: self.score,
                    });
                    log::info!("Hit {other_id}, score {}", self.score);
                }
            }
            ActorKind::Poop if other_kind.absorbs_poop() => {
                self.consumed.insert(id);
            }
            _ => {}
        }
    }

    fn game_over(&mut self, cause: ActorId) {
        log::info!("Bird hit {cause}, final score {}", self.score);
        self.abilities.stop_fly();
        self.set_scroll_speed(0.0);
        self.set_phase(GamePhase::GameOver);
        self.events.push(GameEvent::GameOver { score: self.score });
    }

    fn prune(&mut self) {
        let doomed: Vec<ActorId> = self
            .obstacles
            .iter()
            .chain(&self.poops)
            .copied()
            .filter(|&id| self.is_gone(id))
            .collect();
        if !doomed.is_empty() {
            self.obstacles.retain(|id| !doomed.contains(id));
            self.poops.retain(|id| !doomed.contains(id));
            for id in doomed {
                self.remove_from_world(id);
                log::trace!("Pruned {id}");
            }
        }
        self.consumed.clear();
    }

    /// Consumed, past the left margin, or below the bottom of the view
    fn is_gone(&self, id: ActorId) -> bool {
        if self.consumed.contains(&id) {
            return true;
        }
        let Some(entry) = self.registry.get(id) else {
            return true;
        };
        let Some(state) = self.world.state(entry.body) else {
            return true;
        };
        let shape = entry.actor.shape;
        state.position.x + shape.half_width() < -self.tuning.ground_offset
            || state.position.y + shape.half_height() < 0.0
    }
}
