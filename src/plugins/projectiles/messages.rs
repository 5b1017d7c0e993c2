//! Buffered spawn requests.
//!
//! Shooters only describe intent; `spawn::spawn_projectiles` is the single
//! consumer that turns a request into an entity.

use bevy::prelude::*;

use crate::plugins::combat::Faction;

#[derive(Message, Clone, Debug, PartialEq)]
pub struct SpawnProjectile {
    pub faction: Faction,
    pub pos: Vec2,
    /// Travel direction; normalised by the consumer.
    pub dir: Vec2,
    /// Projectile archetype id in the catalog.
    pub archetype: String,
}
