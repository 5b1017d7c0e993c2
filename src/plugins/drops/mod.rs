//! Drop economy: at most one pickup per wave.
//!
//! ```text
//! Died(Enemy, Killed) ──► gate free? ──► DropItem ──lifetime──► DropBlink
//!                                           │                     │ blink_time
//!                          player overlap   ▼                     ▼
//!                          PickupCollected ──► upgrade        DropExpire ──► removed
//! ```
//!
//! The gate is claimed before the death reaches the orchestrator, so a wave's
//! last kill still spends that wave's token.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::SimClock;
use crate::common::config::{DropArchetype, GameConfig};
use crate::common::layers::Layer;
use crate::common::scheduler::{Scheduler, TimedAction, TimerElapsed};
use crate::common::sets::{ResolveSet, SimSet};
use crate::common::state::GameState;
use crate::plugins::combat::{self, DeathCause, Died, Faction, Health, PendingDespawn};
use crate::plugins::physics::contact_owners;
use crate::plugins::player::{Player, PlayerWeapon};
use crate::plugins::presentation::start_blink;
use crate::plugins::session::{GameSession, Presentation};

#[derive(Component, Debug, Clone, PartialEq)]
pub struct DropItem {
    pub blink_time: f32,
    pub blink_interval: f32,
    pub pickup_sound: Option<String>,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupCollected {
    pub drop: Entity,
    pub player: Entity,
}

pub fn plugin(app: &mut App) {
    app.add_message::<PickupCollected>()
        .add_systems(FixedUpdate, drop_timers.in_set(SimSet::Timers))
        .add_systems(
            FixedPostUpdate,
            (
                detect_pickups.in_set(ResolveSet::Collide),
                collect_pickups.in_set(ResolveSet::Damage),
                spawn_drop_on_death
                    .in_set(ResolveSet::Deaths)
                    .before(combat::resolve_deaths),
            ),
        );
}

pub fn spawn_drop(commands: &mut Commands, arch: &DropArchetype, pos: Vec2) -> Entity {
    commands
        .spawn((
            Name::new("Drop"),
            DropItem {
                blink_time: arch.blink_time,
                blink_interval: arch.blink_interval,
                pickup_sound: arch.pickup_sound.clone(),
            },
            Sprite::from_color(Color::srgb(0.95, 0.85, 0.2), Vec2::splat(arch.radius * 2.0)),
            Transform::from_translation(pos.extend(0.5)),
            Visibility::Visible,
            // Dynamic: kinematic-vs-static pairs report no collisions.
            RigidBody::Dynamic,
            Collider::circle(arch.radius),
            Sensor,
            CollisionEventsEnabled,
            CollisionLayers::new(Layer::Pickup, [Layer::Player]),
            LinearVelocity::ZERO,
            LockedAxes::ROTATION_LOCKED,
            DespawnOnExit(GameState::GameOver),
        ))
        .id()
}

fn spawn_drop_on_death(
    mut commands: Commands,
    mut deaths: MessageReader<Died>,
    clock: Res<SimClock>,
    config: Res<GameConfig>,
    mut session: ResMut<GameSession>,
    mut scheduler: ResMut<Scheduler>,
) {
    for death in deaths.read() {
        if death.faction != Faction::Enemy || death.cause != DeathCause::Killed {
            continue;
        }
        let Some(arch) = config.catalog.drop.as_ref() else {
            debug!("no drop archetype configured");
            continue;
        };
        if !session.try_claim_drop() {
            continue;
        }

        let e = spawn_drop(&mut commands, arch, death.pos);
        scheduler.schedule_after(clock.now, arch.lifetime, e, TimedAction::DropBlink);
        debug!("drop spawned at {:?}", death.pos);
    }
}

fn drop_timers(
    mut commands: Commands,
    mut timers: MessageReader<TimerElapsed>,
    clock: Res<SimClock>,
    mut scheduler: ResMut<Scheduler>,
    q: Query<&DropItem, Without<PendingDespawn>>,
) {
    for t in timers.read() {
        let Ok(item) = q.get(t.owner) else {
            continue;
        };
        match t.action {
            TimedAction::DropBlink => {
                start_blink(&mut commands, t.owner, item.blink_interval);
                scheduler.schedule_after(clock.now, item.blink_time, t.owner, TimedAction::DropExpire);
            }
            TimedAction::DropExpire => {
                commands.entity(t.owner).try_insert(PendingDespawn);
            }
            _ => {}
        }
    }
}

/// Player overlaps drop. One collection per drop per tick.
fn detect_pickups(
    mut collisions: MessageReader<CollisionStart>,
    q_drops: Query<(), (With<DropItem>, Without<PendingDespawn>)>,
    q_player: Query<(), With<Player>>,
    mut collected: MessageWriter<PickupCollected>,
) {
    let mut taken = HashSet::new();

    for ev in collisions.read() {
        let (a, b) = contact_owners(ev);
        let (drop, player) = if q_drops.contains(a) && q_player.contains(b) {
            (a, b)
        } else if q_drops.contains(b) && q_player.contains(a) {
            (b, a)
        } else {
            continue;
        };
        if taken.insert(drop) {
            collected.write(PickupCollected { drop, player });
        }
    }
}

fn collect_pickups(
    mut commands: Commands,
    mut pickups: MessageReader<PickupCollected>,
    config: Res<GameConfig>,
    session: Res<GameSession>,
    mut scheduler: ResMut<Scheduler>,
    mut q_drops: Query<(&DropItem, &mut CollisionLayers), Without<PendingDespawn>>,
    mut q_player: Query<(&Health, &mut PlayerWeapon), With<Player>>,
    mut presentation: MessageWriter<Presentation>,
) {
    if session.is_game_over() {
        return;
    }
    let tiers = config.catalog.player.weapon_tiers.len();

    for pickup in pickups.read() {
        let Ok((item, mut layers)) = q_drops.get_mut(pickup.drop) else {
            continue;
        };
        let Ok((health, mut weapon)) = q_player.get_mut(pickup.player) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        if weapon.upgrade(tiers) {
            info!("Weapon upgraded to tier {}", weapon.tier());
        } else {
            debug!("weapon already at top tier");
        }
        presentation.write_batch(Presentation::sound(item.pickup_sound.as_ref()));

        scheduler.cancel_owner(pickup.drop);
        layers.filters = LayerMask::NONE;
        commands.entity(pickup.drop).try_insert(PendingDespawn);
    }
}
