//! Spawn consumer: turn `SpawnProjectile` requests into bodies.
//!
//! Projectiles are dynamic sensors: they report overlaps but never push
//! anything. Membership/filter per faction:
//! - player shots: PlayerBullet → Enemy
//! - hostile shots: EnemyBullet → Player

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use super::components::Projectile;
use super::messages::SpawnProjectile;
use crate::common::clock::SimClock;
use crate::common::config::GameConfig;
use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::plugins::combat::Faction;

#[inline]
pub fn projectile_layers(faction: Faction) -> CollisionLayers {
    match faction {
        Faction::Player => CollisionLayers::new(Layer::PlayerBullet, [Layer::Enemy]),
        Faction::Enemy | Faction::Boss => CollisionLayers::new(Layer::EnemyBullet, [Layer::Player]),
    }
}

fn tint(faction: Faction) -> Color {
    match faction {
        Faction::Player => Color::srgb(0.55, 0.95, 1.0),
        Faction::Enemy => Color::srgb(1.0, 0.45, 0.3),
        Faction::Boss => Color::srgb(1.0, 0.2, 0.7),
    }
}

pub fn spawn_projectiles(
    mut commands: Commands,
    mut reader: MessageReader<SpawnProjectile>,
    clock: Res<SimClock>,
    config: Res<GameConfig>,
) {
    for req in reader.read() {
        let Some(arch) = config.catalog.projectile(&req.archetype) else {
            warn!("unknown projectile archetype '{}'", req.archetype);
            continue;
        };
        let Some(direction) = req.dir.try_normalize() else {
            debug!("projectile request with zero direction dropped");
            continue;
        };

        let projectile = Projectile {
            faction: req.faction,
            damage: arch.damage,
            direction,
            speed: arch.speed,
            spawned_at: clock.now,
            ttl: arch.ttl,
        };
        let vel = projectile.velocity();

        commands.spawn((
            Name::new("Projectile"),
            projectile,
            Sprite::from_color(tint(req.faction), Vec2::splat(arch.radius * 2.0)),
            Transform::from_translation(req.pos.extend(2.0)),
            RigidBody::Dynamic,
            Collider::circle(arch.radius),
            Sensor,
            CollisionEventsEnabled,
            projectile_layers(req.faction),
            LinearVelocity(vel),
            LockedAxes::ROTATION_LOCKED,
            DespawnOnExit(GameState::GameOver),
        ));
    }
}
