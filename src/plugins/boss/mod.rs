//! Boss plugin: volleys, reinforcements and the end-of-level hand-off.
//!
//! ```text
//! Fire     cooldown elapsed ──► VolleyShot{mount i} at now + i * volley_delay
//! Timers   VolleyShot       ──► one shell straight down from mount i
//! Fire     reinforcement interval ──► SpawnCombatant per listed archetype (counted)
//! Deaths   Died(Boss)       ──► BossDefeatNotice at now + notify_delay
//! Timers   BossDefeatNotice ──► orchestrator, cleanup sweep, CutSceneTriggered
//! ```
//!
//! The notice is always delayed, with or without death effects configured.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::clock::SimClock;
use crate::common::config::BossArchetype;
use crate::common::rng::SimRng;
use crate::common::scheduler::{Scheduler, TimedAction, TimerElapsed};
use crate::common::sets::{ResolveSet, SimSet};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::combat::{self, CombatProfile, DeathCause, Died, Faction, Health};
use crate::plugins::enemies::{Archetype, Enemy, FLASH_INTERVAL, SpawnCombatant, hostile_layers};
use crate::plugins::levels::Orchestrator;
use crate::plugins::movement::BossMover;
use crate::plugins::projectiles::messages::SpawnProjectile;
use crate::plugins::projectiles::weapon::Weapon;
use crate::plugins::session::hooks::{CutSceneTriggered, WaveCleared};
use crate::plugins::session::{GameSession, Presentation};
use crate::plugins::world::{PlayBounds, WAYPOINT_INSET};

/// Scene handed to the scene collaborator after the boss falls.
pub const CUTSCENE: &str = "boss_cutscene";

/// Reinforcements appear around the boss, this far below it.
const REINFORCEMENT_DROP: f32 = 1.0;
const REINFORCEMENT_SPREAD: f32 = 1.5;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Boss {
    /// Gun offsets relative to the boss centre.
    pub mounts: Vec<Vec2>,
    pub volley_delay: f32,
    pub projectile: Option<String>,
    pub reinforcements: Vec<String>,
    pub reinforcement_interval: f32,
    pub max_reinforcements: u32,
    pub reinforcements_spawned: u32,
    pub next_reinforcement_at: f64,
    pub notify_delay: f32,
}

impl Boss {
    fn from_archetype(arch: &BossArchetype, now: f64) -> Self {
        Self {
            mounts: arch.mounts.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
            volley_delay: arch.volley_delay,
            projectile: arch.projectile.clone(),
            reinforcements: arch.reinforcements.clone(),
            reinforcement_interval: arch.reinforcement_interval,
            max_reinforcements: arch.max_reinforcements,
            reinforcements_spawned: 0,
            next_reinforcement_at: now + f64::from(arch.reinforcement_interval),
            notify_delay: arch.notify_delay,
        }
    }
}

/// Fixed top-centre entry point.
#[inline]
pub fn spawn_point(bounds: &PlayBounds) -> Vec2 {
    Vec2::new(0.0, bounds.half_height - WAYPOINT_INSET)
}

pub fn spawn_boss(
    commands: &mut Commands,
    name: &str,
    arch: &BossArchetype,
    pos: Vec2,
    now: f64,
) -> Entity {
    commands
        .spawn((
            Name::new(format!("Boss:{name}")),
            Boss::from_archetype(arch, now),
            Faction::Boss,
            Health::new(arch.max_hp),
            CombatProfile {
                invincibility: arch.invincibility,
                blink_interval: FLASH_INTERVAL,
                death_delay: arch.death_delay,
                score: arch.score,
                sounds: arch.sounds.clone(),
            },
            BossMover::new(arch.speed, arch.retarget_interval, pos),
            Weapon::new(arch.shoot_cooldown, now + f64::from(arch.first_shot_delay)),
            Sprite::from_color(Color::srgb(0.75, 0.2, 0.85), Vec2::splat(arch.radius * 2.0)),
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
        ))
        .id()
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        (
            (volley_shot_on_timer, defeat_notice_on_timer).in_set(SimSet::Timers),
            (start_volley, spawn_reinforcements).in_set(SimSet::Fire),
        ),
    )
    .add_systems(
        FixedPostUpdate,
        on_boss_died
            .in_set(ResolveSet::Deaths)
            .after(combat::resolve_deaths),
    );
}

/// Cooldown elapsed: schedule one shot per mount, `volley_delay` apart.
fn start_volley(
    clock: Res<SimClock>,
    mut scheduler: ResMut<Scheduler>,
    mut q: Query<(Entity, &Boss, &Health, &mut Weapon)>,
) {
    for (e, boss, health, mut weapon) in &mut q {
        if !health.is_alive() || boss.projectile.is_none() || boss.mounts.is_empty() {
            continue;
        }
        if !weapon.try_fire(clock.now) {
            continue;
        }
        for mount in 0..boss.mounts.len() {
            let delay = boss.volley_delay * mount as f32;
            scheduler.schedule_after(clock.now, delay, e, TimedAction::VolleyShot { mount });
        }
    }
}

fn volley_shot_on_timer(
    mut timers: MessageReader<TimerElapsed>,
    q: Query<(&Boss, &Health, &CombatProfile, &Transform)>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut presentation: MessageWriter<Presentation>,
) {
    for t in timers.read() {
        let TimedAction::VolleyShot { mount } = t.action else {
            continue;
        };
        let Ok((boss, health, profile, tf)) = q.get(t.owner) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }
        let (Some(offset), Some(projectile)) = (boss.mounts.get(mount), &boss.projectile) else {
            continue;
        };

        shots.write(SpawnProjectile {
            faction: Faction::Boss,
            pos: tf.translation.truncate() + *offset,
            dir: Vec2::NEG_Y,
            archetype: projectile.clone(),
        });
        presentation.write_batch(Presentation::sound(profile.sounds.shoot.as_ref()));
    }
}

fn spawn_reinforcements(
    clock: Res<SimClock>,
    mut rng: ResMut<SimRng>,
    mut session: ResMut<GameSession>,
    mut q: Query<(&mut Boss, &Health, &Transform)>,
    mut spawns: MessageWriter<SpawnCombatant>,
) {
    for (mut boss, health, tf) in &mut q {
        if !health.is_alive() || clock.now < boss.next_reinforcement_at {
            continue;
        }
        boss.next_reinforcement_at = clock.now + f64::from(boss.reinforcement_interval);

        let boss = &mut *boss;
        for name in &boss.reinforcements {
            if boss.reinforcements_spawned >= boss.max_reinforcements {
                break;
            }
            if !session.register_enemy() {
                break;
            }

            let pos = tf.translation.truncate()
                + Vec2::new(rng.spread(REINFORCEMENT_SPREAD), -REINFORCEMENT_DROP);
            spawns.write(SpawnCombatant { archetype: Archetype::Enemy(name.clone()), pos });
            boss.reinforcements_spawned += 1;
            debug!(
                "boss reinforcement {}/{}",
                boss.reinforcements_spawned, boss.max_reinforcements
            );
        }
    }
}

/// Runs after the common death sequence, which cancelled the boss's timers.
fn on_boss_died(
    mut deaths: MessageReader<Died>,
    clock: Res<SimClock>,
    mut scheduler: ResMut<Scheduler>,
    mut session: ResMut<GameSession>,
    q: Query<(&Boss, &CombatProfile)>,
    mut presentation: MessageWriter<Presentation>,
) {
    for death in deaths.read() {
        if death.faction != Faction::Boss {
            continue;
        }
        let Ok((boss, profile)) = q.get(death.entity) else {
            continue;
        };
        if death.cause == DeathCause::Killed && session.add_score(profile.score) {
            presentation.write(Presentation::ScoreChanged(session.score()));
        }
        info!("Boss destroyed");
        scheduler.schedule_after(
            clock.now,
            boss.notify_delay,
            death.entity,
            TimedAction::BossDefeatNotice,
        );
    }
}

/// Boss death sequence finished.
///
/// 1. the boss counts as defeated
/// 2. surviving enemies are swept (cause `Cleanup`: counted, no score, no drop)
/// 3. the cut-scene is triggered
fn defeat_notice_on_timer(
    mut timers: MessageReader<TimerElapsed>,
    tunables: Res<Tunables>,
    mut session: ResMut<GameSession>,
    mut orchestrator: ResMut<Orchestrator>,
    mut q_enemies: Query<(Entity, &mut Health, &Transform), (With<Enemy>, Without<Boss>)>,
    mut died: MessageWriter<Died>,
    mut cleared: MessageWriter<WaveCleared>,
    mut cutscene: MessageWriter<CutSceneTriggered>,
    mut presentation: MessageWriter<Presentation>,
) {
    for t in timers.read() {
        if t.action != TimedAction::BossDefeatNotice {
            continue;
        }
        if session.is_game_over() {
            debug!("boss defeat notice ignored: session over");
            continue;
        }

        let level = session.current_level();
        if let Some(index) = orchestrator.enemy_defeated(&mut session, tunables.wave_clear_delay) {
            info!("Wave {index} cleared");
            cleared.write(WaveCleared { index });
        }

        for (e, mut health, tf) in &mut q_enemies {
            if health.kill() == combat::DamageOutcome::Killed {
                died.write(Died {
                    entity: e,
                    faction: Faction::Enemy,
                    cause: DeathCause::Cleanup,
                    pos: tf.translation.truncate(),
                });
            }
        }

        info!("Cut-scene triggered after level {level}");
        cutscene.write(CutSceneTriggered { level });
        presentation.write(Presentation::LoadScene(CUTSCENE.to_string()));
    }
}
