//! Obstacle / NPC spawning
//!
//! Time-based producer with a randomized interval. It only decides *what* to
//! spawn; the logic places the body.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::tuning::Tuning;

/// What the spawner asked for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnKind {
    /// Pedestrian with a visual variant
    Npc { skin: u8 },
    /// Column rising from the ground, `height` meters tall
    Obstacle { height: f32 },
}

/// Number of NPC skins the view knows about
pub const NPC_SKINS: u8 = 4;

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    timer: f32,
    next_interval: f32,
    interval_min: f32,
    interval_max: f32,
    npc_chance: f64,
    obstacle_height_min: f32,
    obstacle_height_max: f32,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        let mut spawner = Self {
            rng: Pcg32::seed_from_u64(tuning.seed),
            timer: 0.0,
            next_interval: tuning.spawn_interval_max,
            interval_min: tuning.spawn_interval_min,
            interval_max: tuning.spawn_interval_max,
            npc_chance: tuning.npc_chance as f64,
            obstacle_height_min: tuning.obstacle_height_min,
            obstacle_height_max: tuning.obstacle_height_max,
        };
        spawner.next_interval = spawner.roll_interval();
        spawner
    }

    /// Restart the countdown. The random stream keeps going.
    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.next_interval = self.roll_interval();
    }

    /// Seconds until the next spawn
    pub fn time_to_next(&self) -> f32 {
        (self.next_interval - self.timer).max(0.0)
    }

    /// Advance by `dt`, returning everything that became due
    pub fn advance(&mut self, dt: f32) -> Vec<SpawnKind> {
        let mut due = Vec::new();
        self.timer += dt;
        while self.timer >= self.next_interval {
            self.timer -= self.next_interval;
            self.next_interval = self.roll_interval();
            due.push(self.roll_kind());
        }
        due
    }

    fn roll_interval(&mut self) -> f32 {
        if self.interval_max > self.interval_min {
            self.rng.random_range(self.interval_min..self.interval_max)
        } else {
            self.interval_min
        }
    }

    fn roll_kind(&mut self) -> SpawnKind {
        if self.rng.random_bool(self.npc_chance) {
            SpawnKind::Npc {
                skin: self.rng.random_range(0..NPC_SKINS),
            }
        } else {
            let height = if self.obstacle_height_max > self.obstacle_height_min {
                self.rng
                    .random_range(self.obstacle_height_min..self.obstacle_height_max)
            } else {
                self.obstacle_height_min
            };
            SpawnKind::Obstacle { height }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> Tuning {
        Tuning {
            spawn_interval_min: 1.0,
            spawn_interval_max: 2.0,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_nothing_before_first_interval() {
        let mut s = Spawner::new(&tuning());
        assert!(s.advance(0.99).is_empty());
    }

    #[test]
    fn test_cadence_stays_within_bounds() {
        let mut s = Spawner::new(&tuning());
        let mut count = 0;
        for _ in 0..600 {
            count += s.advance(0.1).len();
        }
        // 60 seconds at one spawn per 1..2 seconds
        assert!((30..=60).contains(&count), "spawned {count}");
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Spawner::new(&tuning());
        let mut b = Spawner::new(&tuning());
        for _ in 0..200 {
            assert_eq!(a.advance(0.05), b.advance(0.05));
        }
    }

    #[test]
    fn test_fixed_interval_and_npc_only() {
        let t = Tuning {
            spawn_interval_min: 0.5,
            spawn_interval_max: 0.5,
            npc_chance: 1.0,
            ..Tuning::default()
        };
        let mut s = Spawner::new(&t);
        let due = s.advance(1.0);
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|k| matches!(k, SpawnKind::Npc { skin } if *skin < NPC_SKINS)));
    }

    #[test]
    fn test_obstacle_heights_respect_range() {
        let t = Tuning {
            spawn_interval_min: 0.1,
            spawn_interval_max: 0.1,
            npc_chance: 0.0,
            ..Tuning::default()
        };
        let mut s = Spawner::new(&t);
        for kind in s.advance(5.0) {
            let SpawnKind::Obstacle { height } = kind else {
                panic!("expected obstacle");
            };
            assert!(height >= t.obstacle_height_min && height < t.obstacle_height_max);
        }
    }

    #[test]
    fn test_reset_restarts_countdown() {
        let mut s = Spawner::new(&tuning());
        s.advance(0.9);
        s.reset();
        assert!(s.time_to_next() >= 1.0);
    }
}
