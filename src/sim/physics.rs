//! Rigid-body world
//!
//! Thin ownership wrapper around rapier2d. Bodies and colliders live here and
//! nowhere else; callers hold handles. Public values cross the boundary as
//! `glam::Vec2`.

use glam::Vec2;
use rapier2d::prelude::*;

use super::actor::{ActorKind, BodyKind, Shape};
use super::debug_draw::{DebugColor, DebugDrawer};

/// Rapier's generational arena handle, stable for the lifetime of the body
pub type BodyHandle = RigidBodyHandle;

const DYNAMIC_COLOR: DebugColor = [0.9, 0.7, 0.7, 1.0];
const KINEMATIC_COLOR: DebugColor = [0.5, 0.5, 0.9, 1.0];
const FIXED_COLOR: DebugColor = [0.5, 0.9, 0.5, 1.0];

#[inline]
pub(crate) fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

#[inline]
pub(crate) fn from_vector(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Everything needed to build one body and its single collider
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub kind: ActorKind,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub density: f32,
}

/// Copy of a body's kinematic state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub handle: BodyHandle,
    pub position: Vec2,
    pub rotation: f32,
    pub linear_velocity: Vec2,
}

/// A pair of colliders that started touching during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactStart {
    pub collider_a: ColliderHandle,
    pub collider_b: ColliderHandle,
}

pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: to_vector(gravity),
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Insert a body with one collider matching `desc.shape`
    pub fn create_body(&mut self, desc: &BodyDesc) -> (BodyHandle, ColliderHandle) {
        let builder = match desc.kind.body_kind() {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_velocity_based(),
        };
        let mut builder = builder
            .translation(to_vector(desc.position))
            .linvel(to_vector(desc.velocity))
            .lock_rotations();
        match desc.kind {
            // The bird only ever moves vertically
            ActorKind::Bird => builder = builder.enabled_translations(false, true),
            ActorKind::Poop => builder = builder.ccd_enabled(true),
            _ => {}
        }
        let body = self.bodies.insert(builder.build());

        let collider = match desc.shape {
            Shape::Box {
                half_width,
                half_height,
            } => ColliderBuilder::cuboid(half_width, half_height),
            Shape::Circle { radius } => ColliderBuilder::ball(radius),
        }
        .density(desc.density)
        .friction(0.0)
        .restitution(0.0)
        .collision_groups(desc.kind.collision_groups())
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        (body, collider)
    }

    /// Remove a body together with its colliders
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn state(&self, handle: BodyHandle) -> Option<BodyState> {
        self.bodies.get(handle).map(|rb| BodyState {
            handle,
            position: from_vector(rb.translation()),
            rotation: rb.rotation().angle(),
            linear_velocity: from_vector(rb.linvel()),
        })
    }

    pub fn set_translation(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_translation(to_vector(position), true);
        }
    }

    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_linvel(to_vector(velocity), true);
        }
    }

    /// Overwrite only the x component of the velocity
    pub fn set_horizontal_velocity(&mut self, handle: BodyHandle, vx: f32) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            let vy = rb.linvel().y;
            rb.set_linvel(vector![vx, vy], true);
        }
    }

    pub fn set_gravity_scale(&mut self, handle: BodyHandle, scale: f32) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_gravity_scale(scale, true);
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Returns the contacts that started during this step, in a stable order.
    pub fn step(&mut self, dt: f32) -> Vec<ContactStart> {
        if dt <= 0.0 {
            return Vec::new();
        }
        self.integration_params.dt = dt;

        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        let mut started = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(a, b, _) = event {
                started.push(ContactStart {
                    collider_a: a,
                    collider_b: b,
                });
            }
        }
        // Channel delivery order is not guaranteed
        started.sort_by_key(|c| {
            let (a, b) = (c.collider_a.into_raw_parts(), c.collider_b.into_raw_parts());
            (a.min(b), a.max(b))
        });
        started
    }

    /// Report the geometry of every collider to `drawer`. Read-only.
    pub fn draw_shapes(&self, drawer: &mut dyn DebugDrawer) {
        for (_, collider) in self.colliders.iter() {
            let color = collider
                .parent()
                .and_then(|h| self.bodies.get(h))
                .map(|rb| match rb.body_type() {
                    RigidBodyType::Dynamic => DYNAMIC_COLOR,
                    RigidBodyType::Fixed => FIXED_COLOR,
                    _ => KINEMATIC_COLOR,
                })
                .unwrap_or(FIXED_COLOR);
            let iso = collider.position();

            if let Some(cuboid) = collider.shape().as_cuboid() {
                let he = cuboid.half_extents;
                let corners = [
                    point![-he.x, -he.y],
                    point![he.x, -he.y],
                    point![he.x, he.y],
                    point![-he.x, he.y],
                ];
                let vertices: Vec<Vec2> = corners
                    .iter()
                    .map(|p| {
                        let w = iso.transform_point(p);
                        Vec2::new(w.x, w.y)
                    })
                    .collect();
                drawer.draw_polygon(&vertices, color);
            } else if let Some(ball) = collider.shape().as_ball() {
                let center = from_vector(&iso.translation.vector);
                drawer.draw_circle(center, ball.radius, color);
            }
        }
    }
}
