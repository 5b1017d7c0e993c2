//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, write the `PlayerInput` resource
//! - FixedUpdate (Steer): clamped velocity on the kinematic body
//! - FixedUpdate (Fire): continuous fire while the trigger is held
//!
//! While invincible after a hit the ship is frozen: no movement, no fire.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::SimClock;
use crate::common::config::{GameConfig, WeaponTier};
use crate::common::layers::Layer;
use crate::common::sets::SimSet;
use crate::common::state::GameState;
use crate::plugins::combat::{CombatProfile, Faction, Health};
use crate::plugins::projectiles::messages::SpawnProjectile;
use crate::plugins::projectiles::weapon::Weapon;
use crate::plugins::session::Presentation;
use crate::plugins::world::PlayBounds;

/// Distance from the bottom edge at spawn.
const SPAWN_OFFSET: f32 = 1.5;

#[derive(Component)]
pub struct Player;

#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub shooting_held: bool,
}

/// Index into the configured weapon tiers. Only ever goes up.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayerWeapon {
    tier: usize,
}

impl PlayerWeapon {
    #[inline]
    pub fn tier(&self) -> usize {
        self.tier
    }

    /// Step up one tier; saturates at the top. Returns true if it changed.
    pub fn upgrade(&mut self, tier_count: usize) -> bool {
        if self.tier + 1 >= tier_count {
            return false;
        }
        self.tier += 1;
        true
    }

    pub fn current<'a>(&self, tiers: &'a [WeaponTier]) -> Option<&'a WeaponTier> {
        tiers.get(self.tier).or_else(|| tiers.last())
    }
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(FixedUpdate, apply_movement.in_set(SimSet::Steer))
        .add_systems(FixedUpdate, fire.in_set(SimSet::Fire));
}

fn spawn(mut commands: Commands, config: Res<GameConfig>, bounds: Res<PlayBounds>) {
    let arch = &config.catalog.player;
    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::Enemy, Layer::EnemyBullet, Layer::Pickup],
    );

    commands.spawn((
        Name::new("Player"),
        Player,
        Faction::Player,
        Health::new(arch.max_lives),
        CombatProfile {
            invincibility: arch.invincibility,
            blink_interval: arch.blink_interval,
            death_delay: arch.death_delay,
            score: 0,
            sounds: arch.sounds.clone(),
        },
        PlayerWeapon::default(),
        Weapon::new(arch.shoot_delay, 0.0),
        Sprite::from_color(Color::srgb(0.2, 0.75, 0.9), Vec2::splat(arch.radius * 2.0)),
        Transform::from_xyz(0.0, -bounds.half_height + SPAWN_OFFSET, 1.0),
        RigidBody::Kinematic,
        Collider::circle(arch.radius),
        CollisionEventsEnabled,
        layers,
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::GameOver),
    ));
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else { return };
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
    input.shooting_held = keys.pressed(KeyCode::Space);
}

/// Velocity that moves by `axis * speed * dt` without leaving the play area.
pub fn clamped_velocity(pos: Vec2, axis: Vec2, speed: f32, dt: f32, bounds: &PlayBounds) -> Vec2 {
    if dt <= 0.0 {
        return Vec2::ZERO;
    }
    let next = bounds.clamp(pos + axis * speed * dt);
    (next - pos) / dt
}

fn apply_movement(
    clock: Res<SimClock>,
    config: Res<GameConfig>,
    bounds: Res<PlayBounds>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&Transform, &Health, &mut LinearVelocity), With<Player>>,
) {
    let Ok((tf, health, mut vel)) = q_player.single_mut() else {
        return;
    };
    if !health.is_alive() || health.is_invincible() {
        vel.0 = Vec2::ZERO;
        return;
    }
    vel.0 = clamped_velocity(
        tf.translation.truncate(),
        input.move_axis,
        config.catalog.player.speed,
        clock.dt,
        &bounds,
    );
}

/// Unit directions for one trigger pull: `shots` spread evenly across
/// `spread_deg`, centred on straight up.
pub fn fan_directions(shots: u32, spread_deg: f32) -> Vec<Vec2> {
    let n = shots.max(1);
    if n == 1 {
        return vec![Vec2::Y];
    }
    let spread = spread_deg.to_radians();
    let step = spread / (n - 1) as f32;
    (0..n)
        .map(|i| Vec2::from_angle(-0.5 * spread + step * i as f32).rotate(Vec2::Y))
        .collect()
}

fn fire(
    clock: Res<SimClock>,
    config: Res<GameConfig>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&Transform, &Health, &PlayerWeapon, &mut Weapon), With<Player>>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut presentation: MessageWriter<Presentation>,
) {
    if !input.shooting_held {
        return;
    }
    let Ok((tf, health, player_weapon, mut weapon)) = q_player.single_mut() else {
        return;
    };
    if !health.is_alive() || health.is_invincible() {
        return;
    }
    let arch = &config.catalog.player;
    let Some(tier) = player_weapon.current(&arch.weapon_tiers) else {
        return;
    };
    if !weapon.try_fire(clock.now) {
        return;
    }

    let pos = tf.translation.truncate() + Vec2::Y * arch.radius;
    for dir in fan_directions(tier.shots, tier.spread_deg) {
        shots.write(SpawnProjectile {
            faction: Faction::Player,
            pos,
            dir,
            archetype: tier.projectile.clone(),
        });
    }
    presentation.write_batch(Presentation::sound(arch.sounds.shoot.as_ref()));
}

#[cfg(test)]
mod tests;
