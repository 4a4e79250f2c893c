//! Game logic
//!
//! Owns the physics world, every actor, and the registry linking them. Views
//! read snapshots through [`GameLogic::get_visible_actors`] and influence the
//! game only through the `request_*` methods.
//!
//! Lifecycle: construct with [`GameLogic::new`], call [`GameLogic::init`]
//! exactly once, then drive [`GameLogic::update`] once per frame. Every other
//! method panics if called before `init`.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use super::abilities::BirdAbilities;
use super::actor::{Actor, ActorId, ActorKind, Shape};
use super::debug_draw::DebugDrawer;
use super::ground::GroundStrip;
use super::physics::{BodyDesc, BodyHandle, BodyState, PhysicsWorld};
use super::registry::ActorRegistry;
use super::spawner::{SpawnKind, Spawner};
use super::state::{GameEvent, GamePhase, VisibleActor};
use crate::tuning::Tuning;

/// Gap between the bird's underside and a freshly dropped poop
const POOP_DROP_GAP: f32 = 0.05;

pub struct GameLogic {
    pub(super) tuning: Tuning,
    pub(super) initialized: bool,
    pub(super) phase: GamePhase,
    pub(super) world: PhysicsWorld,
    pub(super) registry: ActorRegistry,
    /// Effectively the bird's forward speed; scenery moves left at this rate
    pub(super) scroll_speed: f32,
    pub(super) bird: ActorId,
    pub(super) abilities: BirdAbilities,
    pub(super) score: u32,
    pub(super) grounds: GroundStrip,
    /// NPCs and obstacles in spawn order
    pub(super) obstacles: Vec<ActorId>,
    pub(super) poops: Vec<ActorId>,
    /// Marked during contact resolution, removed by the prune pass
    pub(super) consumed: BTreeSet<ActorId>,
    pub(super) spawner: Spawner,
    pub(super) debug_drawer: Option<Box<dyn DebugDrawer>>,
    pub(super) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameLogic {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            world: PhysicsWorld::new(Vec2::new(0.0, -tuning.gravity)),
            registry: ActorRegistry::new(),
            initialized: false,
            phase: GamePhase::Demo,
            scroll_speed: tuning.initial_scroll_speed,
            bird: ActorId(0),
            abilities: BirdAbilities::new(tuning.max_poops, tuning.poop_cooldown),
            score: 0,
            grounds: GroundStrip::new(tuning.ground_width, tuning.ground_offset),
            obstacles: Vec::new(),
            poops: Vec::new(),
            consumed: BTreeSet::new(),
            spawner: Spawner::new(&tuning),
            debug_drawer: None,
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Build the ground and the bird, then enter demo mode.
    ///
    /// # Panics
    /// On a second call, or if the tuning fails validation.
    pub fn init(&mut self) {
        assert!(!self.initialized, "GameLogic::init called twice");
        if let Err(e) = self.tuning.validate() {
            panic!("GameLogic::init: {e}");
        }
        self.initialized = true;

        let half_width = self.tuning.ground_width / 2.0;
        let half_height = self.tuning.ground_height / 2.0;
        for i in 0..self.tuning.ground_count {
            let ground = self.create_actor(
                ActorKind::Ground,
                Shape::Box {
                    half_width,
                    half_height,
                },
            );
            let x = self.grounds.initial_center_x(i);
            self.add_to_world(&ground, Vec2::new(x, half_height), true);
            self.grounds.push(ground.id);
        }

        let bird = self.create_actor(
            ActorKind::Bird,
            Shape::Circle {
                radius: self.tuning.bird_radius,
            },
        );
        self.add_to_world(&bird, self.tuning.bird_idle_position, false);
        self.bird = bird.id;

        log::info!(
            "Game logic initialized: {} ground segments, bird {}",
            self.grounds.len(),
            self.bird
        );
        self.to_demo();
    }

    #[inline]
    pub(super) fn assert_initialized(&self) {
        assert!(self.initialized, "GameLogic used before init()");
    }

    // === Registry ===

    /// Allocate a fresh actor. It has no body until passed to [`Self::add_to_world`].
    pub fn create_actor(&mut self, kind: ActorKind, shape: Shape) -> Actor {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        Actor::new(id, kind, shape)
    }

    /// Give `actor` a body at `position` and register the pair.
    ///
    /// Scroll-inheriting bodies start with the current world scroll velocity.
    ///
    /// # Panics
    /// If the actor is already registered.
    pub fn add_to_world(
        &mut self,
        actor: &Actor,
        position: Vec2,
        inherit_world_scroll: bool,
    ) -> BodyHandle {
        self.assert_initialized();
        assert!(
            !self.registry.contains(actor.id),
            "{} already has a body",
            actor.id
        );

        let velocity = if inherit_world_scroll {
            Vec2::new(-self.scroll_speed, 0.0)
        } else {
            Vec2::ZERO
        };
        let density = match actor.kind {
            ActorKind::Bird => self.tuning.bird_density,
            _ => 1.0,
        };
        let (body, collider) = self.world.create_body(&BodyDesc {
            kind: actor.kind,
            shape: actor.shape,
            position,
            velocity,
            density,
        });
        self.registry
            .insert(actor.clone(), body, collider, inherit_world_scroll);
        body
    }

    /// Unregister an actor and destroy its body. Returns false if it had none.
    pub fn remove_from_world(&mut self, id: ActorId) -> bool {
        self.assert_initialized();
        match self.registry.remove(id) {
            Some(entry) => {
                self.world.remove_body(entry.body);
                true
            }
            None => false,
        }
    }

    /// State of the actor's body, or `None` if it has no body
    pub fn get_body(&self, id: ActorId) -> Option<BodyState> {
        self.assert_initialized();
        self.registry.body(id).and_then(|h| self.world.state(h))
    }

    pub fn body_handle(&self, id: ActorId) -> Option<BodyHandle> {
        self.assert_initialized();
        self.registry.body(id)
    }

    /// Owned snapshot of every registered actor and its body
    pub fn get_visible_actors(&self) -> BTreeMap<ActorId, VisibleActor> {
        self.assert_initialized();
        self.registry
            .iter()
            .filter_map(|(id, entry)| {
                let body = self.world.state(entry.body)?;
                Some((
                    id,
                    VisibleActor {
                        actor: entry.actor.clone(),
                        body,
                        inherit_world_scroll: entry.inherit_world_scroll,
                    },
                ))
            })
            .collect()
    }

    /// Number of live bodies in the physics world
    pub fn body_count(&self) -> usize {
        self.world.body_count()
    }

    // === Queries ===

    pub fn phase(&self) -> GamePhase {
        self.assert_initialized();
        self.phase
    }

    pub fn scroll_speed(&self) -> f32 {
        self.assert_initialized();
        self.scroll_speed
    }

    pub fn num_poops_left(&self) -> u32 {
        self.assert_initialized();
        self.abilities.poops_left()
    }

    pub fn player_score(&self) -> u32 {
        self.assert_initialized();
        self.score
    }

    pub fn bird_id(&self) -> ActorId {
        self.assert_initialized();
        self.bird
    }

    pub fn is_bird_flying(&self) -> bool {
        self.assert_initialized();
        self.abilities.is_flying()
    }

    /// Ground segments, left to right
    pub fn ground_ids(&self) -> Vec<ActorId> {
        self.assert_initialized();
        self.grounds.ids().collect()
    }

    /// Live NPCs and obstacles, oldest first
    pub fn obstacle_ids(&self) -> &[ActorId] {
        self.assert_initialized();
        &self.obstacles
    }

    pub fn poop_ids(&self) -> &[ActorId] {
        self.assert_initialized();
        &self.poops
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Phase transitions ===

    /// Attract mode: keep the ground, drop everything else, park the bird
    pub fn to_demo(&mut self) {
        self.assert_initialized();
        self.clear_transients();
        self.set_scroll_speed(self.tuning.initial_scroll_speed);
        self.reset_bird(true);
        self.abilities.reset();
        self.spawner.reset();
        self.set_phase(GamePhase::Demo);
    }

    /// Start a fresh run
    pub fn to_playing(&mut self) {
        self.assert_initialized();
        self.clear_transients();
        self.set_scroll_speed(self.tuning.initial_scroll_speed);
        self.reset_bird(false);
        self.abilities.reset();
        self.score = 0;
        self.spawner.reset();
        self.set_phase(GamePhase::Playing);
    }

    pub(super) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged(phase));
    }

    /// Put the bird back at its idle position, at rest. A held bird ignores gravity.
    fn reset_bird(&mut self, hold: bool) {
        self.abilities.stop_fly();
        let Some(handle) = self.registry.body(self.bird) else {
            return;
        };
        self.world
            .set_translation(handle, self.tuning.bird_idle_position);
        self.world.set_linear_velocity(handle, Vec2::ZERO);
        self.world
            .set_gravity_scale(handle, if hold { 0.0 } else { 1.0 });
    }

    /// Remove every obstacle, NPC and poop
    fn clear_transients(&mut self) {
        let doomed: Vec<ActorId> = self.obstacles.drain(..).chain(self.poops.drain(..)).collect();
        for id in doomed {
            self.remove_from_world(id);
        }
        self.consumed.clear();
    }

    // === World scroll ===

    /// Add `amount` (may be negative) to the scroll speed and push the new
    /// velocity to every scroll-inheriting body. The bird is never touched.
    pub fn increase_scroll_speed(&mut self, amount: f32) {
        self.assert_initialized();
        self.set_scroll_speed(self.scroll_speed + amount);
    }

    pub(super) fn set_scroll_speed(&mut self, speed: f32) {
        self.scroll_speed = speed;
        let vx = -speed;
        let bird = self.registry.body(self.bird);
        for handle in self.registry.scrolling_bodies() {
            if Some(handle) == bird {
                continue;
            }
            self.world.set_horizontal_velocity(handle, vx);
        }
    }

    // === Spawning ===

    /// Place a spawned actor with its left edge at `x`, standing on the ground
    pub fn spawn(&mut self, kind: SpawnKind, x: f32) -> ActorId {
        self.assert_initialized();
        let ground_top = self.tuning.ground_top();
        let (actor, position) = match kind {
            SpawnKind::Npc { skin } => {
                let he = self.tuning.npc_half_extents;
                let actor = self
                    .create_actor(
                        ActorKind::Npc,
                        Shape::Box {
                            half_width: he.x,
                            half_height: he.y,
                        },
                    )
                    .with_skin(skin);
                (actor, Vec2::new(x + he.x, ground_top + he.y))
            }
            SpawnKind::Obstacle { height } => {
                let half_width = self.tuning.obstacle_width / 2.0;
                let actor = self.create_actor(
                    ActorKind::Obstacle,
                    Shape::Box {
                        half_width,
                        half_height: height / 2.0,
                    },
                );
                (actor, Vec2::new(x + half_width, ground_top + height / 2.0))
            }
        };
        self.add_to_world(&actor, position, true);
        self.obstacles.push(actor.id);
        log::debug!("Spawned {:?} {} at x={:.2}", actor.kind, actor.id, position.x);
        actor.id
    }

    // === Player requests ===

    /// Start applying lift. Ignored outside of play.
    pub fn request_bird_start_fly(&mut self) {
        self.assert_initialized();
        if self.phase == GamePhase::Playing {
            self.abilities.start_fly();
        } else {
            log::trace!("start fly ignored in {:?}", self.phase);
        }
    }

    pub fn request_bird_stop_fly(&mut self) {
        self.assert_initialized();
        self.abilities.stop_fly();
    }

    /// Drop a poop if one is available, the cooldown has passed and there is
    /// room above the ground. Otherwise nothing happens.
    pub fn request_bird_poop(&mut self) {
        self.assert_initialized();
        if self.phase != GamePhase::Playing {
            log::trace!("poop ignored in {:?}", self.phase);
            return;
        }
        let Some(bird) = self.get_body(self.bird) else {
            return;
        };
        let radius = self.tuning.poop_radius;
        let position =
            bird.position - Vec2::new(0.0, self.tuning.bird_radius + radius + POOP_DROP_GAP);
        if position.y - radius < self.tuning.ground_top() {
            log::trace!("poop ignored: no room below the bird");
            return;
        }
        if !self.abilities.try_poop() {
            log::trace!(
                "poop ignored: {} left, {:.2}s since last",
                self.abilities.poops_left(),
                self.abilities.time_since_last_poop()
            );
            return;
        }

        let poop = self.create_actor(ActorKind::Poop, Shape::Circle { radius });
        let handle = self.add_to_world(&poop, position, false);
        self.world.set_linear_velocity(
            handle,
            Vec2::new(0.0, -self.tuning.poop_downward_velocity),
        );
        self.poops.push(poop.id);

        let poops_left = self.abilities.poops_left();
        self.events.push(GameEvent::PoopDropped { poops_left });
        log::debug!("Poop {} dropped, {} left", poop.id, poops_left);
    }

    // === Debug draw ===

    pub fn set_debug_drawer(&mut self, drawer: Box<dyn DebugDrawer>) {
        self.debug_drawer = Some(drawer);
    }

    /// Send collider outlines to the installed drawer, if debug drawing is enabled
    pub fn debug_draw(&mut self) {
        self.assert_initialized();
        if !self.tuning.debug_draw {
            return;
        }
        if let Some(drawer) = self.debug_drawer.as_mut() {
            self.world.draw_shapes(drawer.as_mut());
        }
    }

    /// Report every collider to `drawer` regardless of the debug flag
    pub fn draw_shapes(&self, drawer: &mut dyn DebugDrawer) {
        self.assert_initialized();
        self.world.draw_shapes(drawer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::debug_draw::RecordingDrawer;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn logic() -> GameLogic {
        let mut logic = GameLogic::new(Tuning::default());
        logic.init();
        logic
    }

    #[test]
    fn test_init_builds_ground_and_bird() {
        let logic = logic();
        let t = Tuning::default();
        assert_eq!(logic.phase(), GamePhase::Demo);
        assert_eq!(logic.ground_ids().len(), t.ground_count);
        assert_eq!(logic.body_count(), t.ground_count + 1);
        let bird = logic.get_body(logic.bird_id()).unwrap();
        assert_eq!(bird.position, t.bird_idle_position);
    }

    #[test]
    #[should_panic(expected = "before init")]
    fn test_update_before_init_panics() {
        let mut logic = GameLogic::new(Tuning::default());
        logic.update(1.0 / 60.0);
    }

    #[test]
    #[should_panic(expected = "before init")]
    fn test_query_before_init_panics() {
        let logic = GameLogic::new(Tuning::default());
        logic.player_score();
    }

    #[test]
    #[should_panic(expected = "before init")]
    fn test_request_before_init_panics() {
        let mut logic = GameLogic::new(Tuning::default());
        logic.request_bird_poop();
    }

    #[test]
    #[should_panic(expected = "called twice")]
    fn test_double_init_panics() {
        let mut logic = logic();
        logic.init();
    }

    #[test]
    #[should_panic(expected = "already has a body")]
    fn test_double_registration_panics() {
        let mut logic = logic();
        let actor = logic.create_actor(ActorKind::Obstacle, Shape::Circle { radius: 1.0 });
        logic.add_to_world(&actor, Vec2::ZERO, true);
        logic.add_to_world(&actor, Vec2::ZERO, true);
    }

    #[test]
    fn test_missing_body_is_none() {
        let mut logic = logic();
        let actor = logic.create_actor(ActorKind::Npc, Shape::Circle { radius: 0.2 });
        assert!(logic.get_body(actor.id).is_none());
        assert!(logic.body_handle(actor.id).is_none());
        assert!(!logic.remove_from_world(actor.id));
    }

    #[test]
    fn test_remove_destroys_body() {
        let mut logic = logic();
        let before = logic.body_count();
        let actor = logic.create_actor(ActorKind::Npc, Shape::Circle { radius: 0.2 });
        let handle = logic.add_to_world(&actor, Vec2::new(3.0, 3.0), true);
        assert_eq!(logic.body_handle(actor.id), Some(handle));
        assert_eq!(logic.body_count(), before + 1);
        assert!(logic.remove_from_world(actor.id));
        assert_eq!(logic.body_count(), before);
        assert!(!logic.get_visible_actors().contains_key(&actor.id));
    }

    #[test]
    fn test_visible_actors_is_a_snapshot() {
        let mut logic = logic();
        let snapshot = logic.get_visible_actors();
        logic.update(0.1);
        let ground = logic.ground_ids()[0];
        let before = snapshot[&ground].body.position.x;
        let after = logic.get_body(ground).unwrap().position.x;
        assert!(after < before);
        assert_eq!(snapshot.len(), logic.get_visible_actors().len());
    }

    #[test]
    fn test_scroll_increase_reaches_every_inheriting_body() {
        let mut logic = logic();
        assert_eq!(logic.scroll_speed(), 5.0);
        logic.to_playing();
        logic.spawn(SpawnKind::Npc { skin: 0 }, 12.0);
        logic.spawn(SpawnKind::Obstacle { height: 2.0 }, 14.0);

        logic.increase_scroll_speed(1.0);

        let actors = logic.get_visible_actors();
        let mut inheriting = 0;
        for (id, v) in &actors {
            if v.inherit_world_scroll {
                inheriting += 1;
                assert_eq!(v.body.linear_velocity.x, -6.0, "{id}");
            }
        }
        assert_eq!(inheriting, logic.ground_ids().len() + 2);
        assert_eq!(actors[&logic.bird_id()].body.linear_velocity.x, 0.0);
    }

    #[test]
    fn test_negative_increase_slows_down() {
        let mut logic = logic();
        logic.increase_scroll_speed(-2.0);
        assert_eq!(logic.scroll_speed(), 3.0);
        let ground = logic.ground_ids()[0];
        assert_eq!(logic.get_body(ground).unwrap().linear_velocity.x, -3.0);
    }

    #[test]
    fn test_demo_ignores_abilities() {
        let mut logic = logic();
        logic.request_bird_start_fly();
        logic.request_bird_poop();
        assert!(!logic.is_bird_flying());
        assert!(logic.poop_ids().is_empty());
        assert_eq!(logic.num_poops_left(), Tuning::default().max_poops);
    }

    #[test]
    fn test_demo_then_playing_resets_counters() {
        let mut logic = logic();
        logic.to_playing();
        logic.request_bird_poop();
        logic.score = 4;
        logic.to_demo();
        logic.to_playing();
        assert_eq!(logic.player_score(), 0);
        assert_eq!(logic.num_poops_left(), Tuning::default().max_poops);
        assert!(logic.poop_ids().is_empty());
    }

    #[test]
    fn test_to_demo_keeps_ground_and_clears_obstacles() {
        let mut logic = logic();
        logic.to_playing();
        logic.spawn(SpawnKind::Npc { skin: 1 }, 10.0);
        logic.request_bird_poop();
        logic.to_demo();
        assert!(logic.obstacle_ids().is_empty());
        assert!(logic.poop_ids().is_empty());
        assert_eq!(logic.body_count(), Tuning::default().ground_count + 1);
        assert_eq!(logic.phase(), GamePhase::Demo);
    }

    #[test]
    fn test_poop_spawns_below_bird_moving_down() {
        let mut logic = logic();
        logic.to_playing();
        logic.request_bird_poop();
        assert_eq!(logic.poop_ids().len(), 1);
        let poop = logic.get_body(logic.poop_ids()[0]).unwrap();
        let bird = logic.get_body(logic.bird_id()).unwrap();
        assert!(poop.position.y < bird.position.y);
        assert_eq!(poop.position.x, bird.position.x);
        assert_eq!(poop.linear_velocity, Vec2::new(0.0, -4.0));
        assert!(logic
            .drain_events()
            .contains(&GameEvent::PoopDropped { poops_left: 2 }));
    }

    #[test]
    fn test_poop_needs_room_above_ground() {
        let mut logic = logic();
        logic.to_playing();
        let t = Tuning::default();
        let handle = logic.body_handle(logic.bird_id()).unwrap();
        logic
            .world
            .set_translation(handle, Vec2::new(t.bird_idle_position.x, t.ground_top() + 0.5));
        logic.drain_events();

        logic.request_bird_poop();
        assert!(logic.poop_ids().is_empty());
        assert_eq!(logic.num_poops_left(), t.max_poops);
        assert!(logic.drain_events().is_empty());

        // Just enough room: the poop's underside sits on the ground top
        let lowest = t.ground_top() + 2.0 * t.poop_radius + POOP_DROP_GAP + t.bird_radius + 0.01;
        logic
            .world
            .set_translation(handle, Vec2::new(t.bird_idle_position.x, lowest));
        logic.request_bird_poop();
        assert_eq!(logic.poop_ids().len(), 1);
        let poop = logic.get_body(logic.poop_ids()[0]).unwrap();
        assert!(poop.position.y - t.poop_radius >= t.ground_top());
    }

    #[test]
    fn test_spawn_stands_on_ground() {
        let mut logic = logic();
        let id = logic.spawn(SpawnKind::Obstacle { height: 3.0 }, 20.0);
        let body = logic.get_body(id).unwrap();
        let t = Tuning::default();
        assert_eq!(body.position.y, t.ground_top() + 1.5);
        assert_eq!(body.position.x, 20.0 + t.obstacle_width / 2.0);
        assert_eq!(body.linear_velocity.x, -t.initial_scroll_speed);
    }

    #[test]
    fn test_debug_draw_respects_flag() {
        struct Shared(Rc<RefCell<RecordingDrawer>>);
        impl DebugDrawer for Shared {
            fn draw_polygon(&mut self, v: &[Vec2], c: crate::sim::DebugColor) {
                self.0.borrow_mut().draw_polygon(v, c);
            }
            fn draw_circle(&mut self, p: Vec2, r: f32, c: crate::sim::DebugColor) {
                self.0.borrow_mut().draw_circle(p, r, c);
            }
        }

        let record = Rc::new(RefCell::new(RecordingDrawer::default()));
        let mut off = logic();
        off.set_debug_drawer(Box::new(Shared(record.clone())));
        off.debug_draw();
        assert_eq!(record.borrow().shape_count(), 0);

        let mut on = GameLogic::new(Tuning {
            debug_draw: true,
            ..Tuning::default()
        });
        on.init();
        on.set_debug_drawer(Box::new(Shared(record.clone())));
        on.debug_draw();
        let t = Tuning::default();
        assert_eq!(record.borrow().polygons.len(), t.ground_count);
        assert_eq!(record.borrow().circles.len(), 1);
        assert!(record.borrow().polygons.iter().all(|p| p.len() == 4));
    }

    #[test]
    fn test_draw_shapes_ignores_flag() {
        let logic = logic();
        let mut drawer = RecordingDrawer::default();
        logic.draw_shapes(&mut drawer);
        assert_eq!(drawer.shape_count(), Tuning::default().ground_count + 1);
    }
}
