//! Body contacts between the player and hostile combatants.
//!
//! - Player × Enemy: the player takes one point, the enemy is destroyed.
//! - Player × Boss: the player takes one point.
//!
//! Nothing happens while the player is invincible.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::{DamageKind, DamageRequest, Faction, Health};
use crate::plugins::physics::contact_owners;

pub const CONTACT_DAMAGE: u32 = 1;

pub fn resolve_body_contacts(
    mut started: MessageReader<CollisionStart>,
    q: Query<(&Faction, &Health)>,
    mut requests: MessageWriter<DamageRequest>,
    // Per-tick dedupe of (player, other)
    mut seen: Local<HashSet<(Entity, Entity)>>,
) {
    seen.clear();

    for ev in started.read() {
        let (a, b) = contact_owners(ev);
        let (Ok(qa), Ok(qb)) = (q.get(a), q.get(b)) else {
            continue;
        };

        let ((player, (_, player_hp)), (other, (other_faction, other_hp))) =
            match (*qa.0, *qb.0) {
                (Faction::Player, f) if f.is_hostile() => ((a, qa), (b, qb)),
                (f, Faction::Player) if f.is_hostile() => ((b, qb), (a, qa)),
                _ => continue,
            };

        if !seen.insert((player, other)) {
            continue;
        }
        if !player_hp.is_alive() || !other_hp.is_alive() || player_hp.is_invincible() {
            continue;
        }

        requests.write(DamageRequest { target: player, kind: DamageKind::Hit(CONTACT_DAMAGE) });
        if *other_faction == Faction::Enemy {
            requests.write(DamageRequest { target: other, kind: DamageKind::Contact });
        }
    }
}
