//! Debug drawing sink
//!
//! The logic keeps exclusive ownership of the physics world and only lends the
//! collider geometry to a drawer, once per draw cycle.

use glam::Vec2;

/// RGBA, components in 0..=1
pub type DebugColor = [f32; 4];

/// Receives collider outlines in world space (meters)
pub trait DebugDrawer {
    /// Closed polygon, counter-clockwise
    fn draw_polygon(&mut self, vertices: &[Vec2], color: DebugColor);

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: DebugColor);
}

/// Drawer that records every call, handy for tooling and tests
#[derive(Debug, Default, Clone)]
pub struct RecordingDrawer {
    pub polygons: Vec<Vec<Vec2>>,
    pub circles: Vec<(Vec2, f32)>,
}

impl RecordingDrawer {
    pub fn shape_count(&self) -> usize {
        self.polygons.len() + self.circles.len()
    }
}

impl DebugDrawer for RecordingDrawer {
    fn draw_polygon(&mut self, vertices: &[Vec2], _color: DebugColor) {
        self.polygons.push(vertices.to_vec());
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, _color: DebugColor) {
        self.circles.push((center, radius));
    }
}

/// Drawer that writes one log line per shape at `trace` level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDrawer;

impl DebugDrawer for LogDrawer {
    fn draw_polygon(&mut self, vertices: &[Vec2], _color: DebugColor) {
        log::trace!("polygon {:?}", vertices);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, _color: DebugColor) {
        log::trace!("circle at {:?} r={}", center, radius);
    }
}
