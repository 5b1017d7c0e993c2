use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::components::Projectile;
use crate::plugins::combat::{DamageKind, DamageRequest, Faction, Health, PendingDespawn};
use crate::plugins::physics::contact_owners;

/// Deliver projectile hits.
///
/// A projectile is spent by the first live opposing combatant it touches,
/// even an invincible one (the damage request is then ignored downstream).
/// Spent projectiles stop colliding at once and are removed in `PostUpdate`.
pub fn resolve_projectile_hits(
    mut commands: Commands,
    mut started: MessageReader<CollisionStart>,
    // Live projectiles only; spent ones carry PendingDespawn
    mut q_projectiles: Query<
        (&Projectile, &mut CollisionLayers, &mut LinearVelocity),
        Without<PendingDespawn>,
    >,
    q_targets: Query<(&Faction, &Health)>,
    mut requests: MessageWriter<DamageRequest>,
    // Per-tick dedupe
    mut spent: Local<HashSet<Entity>>,
) {
    spent.clear();

    for ev in started.read() {
        let (a, b) = contact_owners(ev);

        let pa = q_projectiles.contains(a);
        let pb = q_projectiles.contains(b);
        if !(pa ^ pb) {
            continue; // exactly one side must be a live projectile
        }
        let (shot, other) = if pa { (a, b) } else { (b, a) };

        if spent.contains(&shot) {
            continue;
        }

        let Ok((faction, health)) = q_targets.get(other) else {
            continue;
        };
        let Ok((projectile, mut layers, mut vel)) = q_projectiles.get_mut(shot) else {
            continue;
        };

        if !projectile.faction.opposes(*faction) || !health.is_alive() {
            continue;
        }

        requests.write(DamageRequest { target: other, kind: DamageKind::Hit(projectile.damage) });

        spent.insert(shot);
        layers.filters = LayerMask::NONE;
        vel.0 = Vec2::ZERO;
        commands.entity(shot).try_insert(PendingDespawn);
    }
}
