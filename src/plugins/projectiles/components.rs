use bevy::prelude::*;

use crate::plugins::combat::Faction;

/// A shot in flight. Travels at constant velocity along `direction`.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub faction: Faction,
    pub damage: u32,
    /// Unit vector.
    pub direction: Vec2,
    pub speed: f32,
    pub spawned_at: f64,
    pub ttl: f32,
}

impl Projectile {
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    #[inline]
    pub fn age(&self, now: f64) -> f64 {
        now - self.spawned_at
    }

    #[inline]
    pub fn expired(&self, now: f64) -> bool {
        self.age(now) >= f64::from(self.ttl)
    }
}
