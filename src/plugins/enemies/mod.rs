//! Enemies plugin: the spawn factory and the enemy weapon.
//!
//! The orchestrator and the boss never build entities themselves. They write
//! `SpawnCombatant { archetype, pos }` and `spawn_combatants` resolves the
//! archetype against the catalog:
//!
//! ```text
//! Orchestrator / Boss ──SpawnCombatant──► spawn_combatants ──► Enemy | Boss entity
//! ```
//!
//! Enemies enter from above the screen, patrol once inside, and shoot at the
//! player's current position while patrolling.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::SimClock;
use crate::common::config::{EnemyArchetype, GameConfig};
use crate::common::layers::Layer;
use crate::common::rng::SimRng;
use crate::common::sets::SimSet;
use crate::common::state::GameState;
use crate::plugins::boss;
use crate::plugins::combat::{CombatProfile, Faction, Health};
use crate::plugins::movement::EnemyMover;
use crate::plugins::player::Player;
use crate::plugins::projectiles::messages::SpawnProjectile;
use crate::plugins::projectiles::weapon::Weapon;
use crate::plugins::session::Presentation;

/// Earliest first shot after spawning.
const FIRST_SHOT_MIN: f32 = 0.5;

/// Blink period of the short hit flash.
pub const FLASH_INTERVAL: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Archetype {
    Enemy(String),
    Boss(String),
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct SpawnCombatant {
    pub archetype: Archetype,
    pub pos: Vec2,
}

#[derive(Component)]
pub struct Enemy;

/// Projectile archetype an enemy fires.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct EnemyGun {
    pub projectile: String,
}

/// Live hostile combatants collide with the player and player shots.
#[inline]
pub fn hostile_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::PlayerBullet])
}

pub fn plugin(app: &mut App) {
    app.add_message::<SpawnCombatant>()
        .add_systems(FixedUpdate, spawn_combatants.in_set(SimSet::Spawn))
        .add_systems(FixedUpdate, enemy_fire.in_set(SimSet::Fire));
}

pub fn spawn_combatants(
    mut commands: Commands,
    mut reader: MessageReader<SpawnCombatant>,
    config: Res<GameConfig>,
    clock: Res<SimClock>,
    mut rng: ResMut<SimRng>,
) {
    for req in reader.read() {
        match &req.archetype {
            Archetype::Enemy(name) => {
                let Some(arch) = config.catalog.enemy(name) else {
                    warn!("cannot spawn unknown enemy '{name}'");
                    continue;
                };
                let first_shot = clock.now + f64::from(rng.between(FIRST_SHOT_MIN, arch.shoot_cooldown));
                spawn_enemy(&mut commands, name, arch, req.pos, first_shot);
            }
            Archetype::Boss(name) => {
                let Some(arch) = config.catalog.boss(name) else {
                    warn!("cannot spawn unknown boss '{name}'");
                    continue;
                };
                boss::spawn_boss(&mut commands, name, arch, req.pos, clock.now);
            }
        }
    }
}

fn spawn_enemy(
    commands: &mut Commands,
    name: &str,
    arch: &EnemyArchetype,
    pos: Vec2,
    first_shot_at: f64,
) -> Entity {
    let mut e = commands.spawn((
        Name::new(format!("Enemy:{name}")),
        Enemy,
        Faction::Enemy,
        Health::new(arch.max_hp),
        CombatProfile {
            invincibility: arch.invincibility,
            blink_interval: FLASH_INTERVAL,
            death_delay: arch.death_delay,
            score: arch.score,
            sounds: arch.sounds.clone(),
        },
        EnemyMover::new(arch.speed, arch.retarget_interval, arch.wander_range, pos),
        Sprite::from_color(Color::srgb(0.9, 0.25, 0.25), Vec2::splat(arch.radius * 2.0)),
        Transform::from_translation(pos.extend(1.0)),
        (
            RigidBody::Dynamic,
            Collider::circle(arch.radius),
            Sensor,
            CollisionEventsEnabled,
            hostile_layers(),
            LinearVelocity::ZERO,
            LockedAxes::ROTATION_LOCKED,
        ),
        DespawnOnExit(GameState::GameOver),
    ));
    if let Some(projectile) = &arch.projectile {
        e.insert((
            EnemyGun { projectile: projectile.clone() },
            Weapon::new(arch.shoot_cooldown, first_shot_at),
        ));
    }
    e.id()
}

/// Single aimed shot per cooldown, only while patrolling and while a live
/// player exists.
fn enemy_fire(
    clock: Res<SimClock>,
    q_player: Query<(&Transform, &Health), With<Player>>,
    mut q: Query<
        (&Transform, &Health, &EnemyMover, &EnemyGun, &CombatProfile, &mut Weapon),
        With<Enemy>,
    >,
    mut shots: MessageWriter<SpawnProjectile>,
    mut presentation: MessageWriter<Presentation>,
) {
    let Ok((player_tf, player_hp)) = q_player.single() else {
        return;
    };
    if !player_hp.is_alive() {
        return;
    }
    let target = player_tf.translation.truncate();

    for (tf, health, mover, gun, profile, mut weapon) in &mut q {
        if !health.is_alive() || !mover.is_patrolling() {
            continue;
        }
        if !weapon.try_fire(clock.now) {
            continue;
        }
        let pos = tf.translation.truncate();
        shots.write(SpawnProjectile {
            faction: Faction::Enemy,
            pos,
            dir: target - pos,
            archetype: gun.projectile.clone(),
        });
        presentation.write_batch(Presentation::sound(profile.sounds.shoot.as_ref()));
    }
}
