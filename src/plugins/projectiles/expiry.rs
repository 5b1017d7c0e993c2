//! Projectile expiry: time-to-live and vertical bounds.
//!
//! Runs after hit resolution, so a projectile that lands a hit on its last
//! tick still delivers it.

use bevy::prelude::*;

use super::components::Projectile;
use crate::common::clock::SimClock;
use crate::common::tunables::Tunables;
use crate::plugins::combat::PendingDespawn;
use crate::plugins::world::PlayBounds;

pub fn expire_projectiles(
    mut commands: Commands,
    clock: Res<SimClock>,
    bounds: Res<PlayBounds>,
    tunables: Res<Tunables>,
    q: Query<(Entity, &Projectile, &Transform), Without<PendingDespawn>>,
) {
    for (e, projectile, tf) in &q {
        if projectile.expired(clock.now)
            || bounds.outside_vertical(tf.translation.truncate(), tunables.projectile_margin)
        {
            commands.entity(e).try_insert(PendingDespawn);
        }
    }
}
