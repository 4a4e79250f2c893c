//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. Defaults are the shipped
//! values; a JSON file can override any subset of them.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a tuning file could not be used
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Game balance. All distances in meters, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Spawner RNG seed
    pub seed: u64,
    /// Report collider outlines to the debug drawer
    pub debug_draw: bool,

    // === World ===
    pub view_width: f32,
    pub view_height: f32,
    /// Downward acceleration (positive number)
    pub gravity: f32,

    // === Scroll ===
    pub initial_scroll_speed: f32,
    /// Speed gained per second while playing
    pub scroll_acceleration: f32,
    pub max_scroll_speed: f32,

    // === Bird ===
    pub bird_radius: f32,
    /// Where the bird waits in demo mode and restarts from
    pub bird_idle_position: Vec2,
    pub bird_density: f32,
    /// Upward acceleration while flying, on top of gravity
    pub flight_acceleration: f32,
    pub max_ascent_speed: f32,

    // === Poop ===
    pub max_poops: u32,
    /// Minimum time between drops, also the refill interval
    pub poop_cooldown: f32,
    pub poop_radius: f32,
    pub poop_downward_velocity: f32,

    // === Ground ===
    pub ground_count: usize,
    pub ground_width: f32,
    pub ground_height: f32,
    /// Horizontal margin past the left edge before a segment is recycled
    pub ground_offset: f32,

    // === Spawner ===
    pub spawn_interval_min: f32,
    pub spawn_interval_max: f32,
    /// Distance beyond the right edge where new actors appear
    pub spawn_margin: f32,
    /// Probability that a spawn is an NPC rather than an obstacle
    pub npc_chance: f32,
    pub npc_half_extents: Vec2,
    pub obstacle_width: f32,
    pub obstacle_height_min: f32,
    pub obstacle_height_max: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0x5eed_b1bd,
            debug_draw: false,

            view_width: 16.0,
            view_height: 9.0,
            gravity: 19.6,

            initial_scroll_speed: 5.0,
            scroll_acceleration: 0.1,
            max_scroll_speed: 12.0,

            bird_radius: 0.4,
            bird_idle_position: Vec2::new(4.0, 5.0),
            bird_density: 1.0,
            flight_acceleration: 45.0,
            max_ascent_speed: 6.0,

            max_poops: 3,
            poop_cooldown: 1.0,
            poop_radius: 0.15,
            poop_downward_velocity: 4.0,

            ground_count: 7,
            ground_width: 4.0,
            ground_height: 1.0,
            ground_offset: 1.0,

            spawn_interval_min: 1.5,
            spawn_interval_max: 3.0,
            spawn_margin: 2.0,
            npc_chance: 0.6,
            npc_half_extents: Vec2::new(0.25, 0.45),
            obstacle_width: 0.8,
            obstacle_height_min: 1.5,
            obstacle_height_max: 4.0,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Y of the ground's top surface (ground bottom sits at y = 0)
    #[inline]
    pub fn ground_top(&self) -> f32 {
        self.ground_height
    }

    /// Total length of the ground strip
    #[inline]
    pub fn ground_span(&self) -> f32 {
        self.ground_count as f32 * self.ground_width
    }

    /// Shortest strip that still covers the view plus margin on both sides
    /// right after a recycle
    pub fn required_ground_span(&self) -> f32 {
        self.view_width + 2.0 * self.ground_offset + self.ground_width
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: String| Err(TuningError::Invalid(msg));

        if self.view_width <= 0.0 || self.view_height <= 0.0 {
            return invalid(format!(
                "view must be positive, got {}x{}",
                self.view_width, self.view_height
            ));
        }
        if self.ground_width <= 0.0 || self.ground_height <= 0.0 {
            return invalid("ground segments must have positive size".into());
        }
        if self.ground_offset < 0.0 {
            return invalid(format!("ground_offset {} is negative", self.ground_offset));
        }
        if self.ground_span() < self.required_ground_span() {
            return invalid(format!(
                "{} ground segments of {}m span {}m, need at least {}m",
                self.ground_count,
                self.ground_width,
                self.ground_span(),
                self.required_ground_span()
            ));
        }
        if self.poop_cooldown <= 0.0 {
            return invalid("poop_cooldown must be positive".into());
        }
        if self.bird_radius <= 0.0 || self.poop_radius <= 0.0 {
            return invalid("bird and poop radii must be positive".into());
        }
        if self.bird_idle_position.y - self.bird_radius <= self.ground_top() {
            return invalid("bird idle position is inside the ground".into());
        }
        if self.spawn_interval_min <= 0.0 || self.spawn_interval_max < self.spawn_interval_min {
            return invalid(format!(
                "spawn interval {}..{} is not a positive range",
                self.spawn_interval_min, self.spawn_interval_max
            ));
        }
        if !(0.0..=1.0).contains(&self.npc_chance) {
            return invalid(format!("npc_chance {} outside 0..=1", self.npc_chance));
        }
        if self.obstacle_height_max < self.obstacle_height_min || self.obstacle_height_min <= 0.0 {
            return invalid("obstacle height range is empty".into());
        }
        if self.max_scroll_speed < self.initial_scroll_speed {
            return invalid("max_scroll_speed is below initial_scroll_speed".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Tuning::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "max_poops": 5, "debug_draw": true }"#).unwrap();
        assert_eq!(t.max_poops, 5);
        assert!(t.debug_draw);
        assert_eq!(t.ground_count, Tuning::default().ground_count);
    }

    #[test]
    fn test_json_round_trip() {
        let t = Tuning::default();
        let back = Tuning::from_json(&t.to_json().unwrap()).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn test_too_little_ground_is_rejected() {
        let err = Tuning::from_json(r#"{ "ground_count": 2 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_bad_json_is_a_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
        assert!(err.to_string().starts_with("failed to read tuning file"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_message_names_the_problem() {
        let err = Tuning::from_json(r#"{ "npc_chance": 2.0 }"#).unwrap_err();
        assert_eq!(err.to_string(), "invalid tuning: npc_chance 2 outside 0..=1");
        assert!(std::error::Error::source(&err).is_none());
    }
}
