//! Cooldown-gated trigger shared by every armed combatant.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub cooldown: f32,
    pub next_fire_at: f64,
}

impl Weapon {
    pub fn new(cooldown: f32, first_shot_at: f64) -> Self {
        Self { cooldown: cooldown.max(0.0), next_fire_at: first_shot_at }
    }

    #[inline]
    pub fn ready(&self, now: f64) -> bool {
        now >= self.next_fire_at
    }

    /// Fire if ready and rearm one cooldown from `now`.
    pub fn try_fire(&mut self, now: f64) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.next_fire_at = now + f64::from(self.cooldown);
        true
    }
}
