//! Player ability gating
//!
//! Flight is a held flag. Poops are a finite supply with a cooldown between
//! drops, refilled one at a time on the same interval.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdAbilities {
    flying: bool,
    /// Seconds since the last successful drop
    time_since_last_poop: f32,
    /// Seconds accumulated toward the next refill
    refill_timer: f32,
    poops_left: u32,
    max_poops: u32,
    cooldown: f32,
}

impl BirdAbilities {
    pub fn new(max_poops: u32, cooldown: f32) -> Self {
        Self {
            flying: false,
            // First drop is allowed immediately
            time_since_last_poop: cooldown,
            refill_timer: 0.0,
            poops_left: max_poops,
            max_poops,
            cooldown,
        }
    }

    /// Back to a full supply, not flying
    pub fn reset(&mut self) {
        *self = Self::new(self.max_poops, self.cooldown);
    }

    pub fn start_fly(&mut self) {
        self.flying = true;
    }

    pub fn stop_fly(&mut self) {
        self.flying = false;
    }

    #[inline]
    pub fn is_flying(&self) -> bool {
        self.flying
    }

    #[inline]
    pub fn poops_left(&self) -> u32 {
        self.poops_left
    }

    #[inline]
    pub fn time_since_last_poop(&self) -> f32 {
        self.time_since_last_poop
    }

    pub fn can_poop(&self) -> bool {
        self.poops_left > 0 && self.time_since_last_poop >= self.cooldown
    }

    /// Consume one poop if allowed. Returns whether it happened.
    pub fn try_poop(&mut self) -> bool {
        if !self.can_poop() {
            return false;
        }
        if self.poops_left == self.max_poops {
            self.refill_timer = 0.0;
        }
        self.poops_left -= 1;
        self.time_since_last_poop = 0.0;
        true
    }

    /// Advance timers, refilling one poop per elapsed cooldown
    pub fn advance(&mut self, dt: f32) {
        self.time_since_last_poop += dt;

        if self.poops_left >= self.max_poops {
            self.refill_timer = 0.0;
            return;
        }
        self.refill_timer += dt;
        while self.refill_timer >= self.cooldown && self.poops_left < self.max_poops {
            self.refill_timer -= self.cooldown;
            self.poops_left += 1;
        }
        if self.poops_left >= self.max_poops {
            self.refill_timer = 0.0;
        }
    }
}
