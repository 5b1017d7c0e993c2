//! Projectiles plugin: message-based spawning, hit delivery and expiry.
//!
//! ```text
//! FixedUpdate (SimSet::Spawn)
//!   shooters ──SpawnProjectile──► spawn_projectiles ──► Projectile bodies
//!
//! (physics step: avian moves bodies, emits CollisionStart)
//!
//! FixedPostUpdate
//!   ResolveSet::Collide  resolve_projectile_hits ──► DamageRequest + PendingDespawn
//!   ResolveSet::Expire   expire_projectiles (ttl / vertical bounds) ──► PendingDespawn
//!
//! PostUpdate
//!   combat::despawn_marked
//! ```
//!
//! A projectile deals damage at most once: the hit, the collision filter
//! reset and the removal marker are written by the same system call.

pub mod collision;
pub mod components;
pub mod expiry;
pub mod messages;
pub mod spawn;
pub mod weapon;

use bevy::prelude::*;

use crate::common::sets::{ResolveSet, SimSet};

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<messages::SpawnProjectile>();

        app.add_systems(FixedUpdate, spawn::spawn_projectiles.in_set(SimSet::Spawn));

        app.add_systems(
            FixedPostUpdate,
            (
                collision::resolve_projectile_hits.in_set(ResolveSet::Collide),
                expiry::expire_projectiles.in_set(ResolveSet::Expire),
            ),
        );
    }
}
