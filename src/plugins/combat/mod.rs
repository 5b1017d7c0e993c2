//! Combat plugin: damage requests, the health model, and the death sequence.
//!
//! ```text
//! FixedPostUpdate
//!   Collide  projectile hits / body contacts  ──► DamageRequest
//!   Damage   apply_damage_requests            ──► Died (once per entity)
//!   Deaths   resolve_deaths                   ──► score, counters, game over
//! FixedUpdate
//!   Timers   EndInvincibility / Despawn handlers
//! PostUpdate
//!   despawn_marked (cancels the entity's pending timers first)
//! ```
//!
//! Physics entities are never despawned inside the fixed step: the death
//! sequence ends with a `PendingDespawn` marker and removal happens in
//! `PostUpdate`.

use avian2d::prelude::*;
use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::config::Sounds;
use crate::common::layers::{Layer, non_interacting};
use crate::common::scheduler::{Scheduler, TimedAction, TimerElapsed};
use crate::common::sets::{ResolveSet, SimSet};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::levels::Orchestrator;
use crate::plugins::presentation::{start_blink, stop_blink};
use crate::plugins::session::{GameOutcome, GameSession, Presentation, hooks};

pub mod contact;
pub mod health;

pub use health::{DamageOutcome, Health, IgnoreReason, LifeState};

/// Allegiance used to filter damage. Enemy and Boss are on the same side.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
    Boss,
}

impl Faction {
    #[inline]
    pub fn is_hostile(self) -> bool {
        !matches!(self, Faction::Player)
    }

    #[inline]
    pub fn opposes(self, other: Faction) -> bool {
        self.is_hostile() != other.is_hostile()
    }

    /// Collision membership for a live combatant of this faction.
    #[inline]
    pub fn layer(self) -> Layer {
        match self {
            Faction::Player => Layer::Player,
            Faction::Enemy | Faction::Boss => Layer::Enemy,
        }
    }
}

/// Per-archetype combat constants, attached at spawn.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct CombatProfile {
    pub invincibility: f32,
    pub blink_interval: f32,
    pub death_delay: f32,
    /// Awarded when killed (not when cleaned up).
    pub score: u32,
    pub sounds: Sounds,
}

/// Marker: remove in `PostUpdate`.
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingDespawn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    Hit(u32),
    /// Body overlap that kills outright.
    Contact,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRequest {
    pub target: Entity,
    pub kind: DamageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Killed,
    /// Scripted wave-complete sweep: no score, no drop.
    Cleanup,
}

/// Published exactly once per combatant, on the death transition.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct Died {
    pub entity: Entity,
    pub faction: Faction,
    pub cause: DeathCause,
    pub pos: Vec2,
}

pub fn plugin(app: &mut App) {
    app.add_message::<DamageRequest>()
        .add_message::<Died>()
        .configure_sets(
            FixedPostUpdate,
            (
                ResolveSet::Collide,
                ResolveSet::Damage,
                ResolveSet::Deaths,
                ResolveSet::Expire,
            )
                .chain()
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            (
                contact::resolve_body_contacts.in_set(ResolveSet::Collide),
                apply_damage_requests.in_set(ResolveSet::Damage),
                resolve_deaths.in_set(ResolveSet::Deaths),
            ),
        )
        .add_systems(
            FixedUpdate,
            (end_invincibility_on_timer, despawn_on_timer).in_set(SimSet::Timers),
        )
        .add_systems(PostUpdate, despawn_marked);
}

/// Resolve every damage request of this tick.
///
/// Requests are ignored wholesale once the session is over.
pub fn apply_damage_requests(
    mut commands: Commands,
    mut requests: MessageReader<DamageRequest>,
    mut q: Query<(&mut Health, &Faction, &CombatProfile, &Transform)>,
    clock: Res<SimClock>,
    mut scheduler: ResMut<Scheduler>,
    mut session: ResMut<GameSession>,
    mut died: MessageWriter<Died>,
    mut presentation: MessageWriter<Presentation>,
) {
    if session.is_game_over() {
        for req in requests.read() {
            debug!("damage to {:?} ignored: session over", req.target);
        }
        return;
    }

    for req in requests.read() {
        let Ok((mut health, faction, profile, tf)) = q.get_mut(req.target) else {
            debug!("damage to {:?} ignored: not a combatant", req.target);
            continue;
        };

        let outcome = match req.kind {
            DamageKind::Hit(amount) => health.apply_damage(amount),
            DamageKind::Contact => health.kill(),
        };

        match outcome {
            DamageOutcome::Ignored(reason) => {
                debug!("damage to {:?} ignored: {reason:?}", req.target);
            }
            DamageOutcome::Hurt { hp } => {
                let handle = scheduler.schedule_after(
                    clock.now,
                    profile.invincibility,
                    req.target,
                    TimedAction::EndInvincibility,
                );
                health.begin_invincibility(handle);
                start_blink(&mut commands, req.target, profile.blink_interval);
                presentation.write_batch(Presentation::sound(profile.sounds.hit.as_ref()));

                if *faction == Faction::Player {
                    session.set_lives(hp);
                    presentation.write(Presentation::LivesChanged(hp));
                }
            }
            DamageOutcome::Killed => {
                died.write(Died {
                    entity: req.target,
                    faction: *faction,
                    cause: DeathCause::Killed,
                    pos: tf.translation.truncate(),
                });
            }
        }
    }
}

/// Death sequence, common part plus per-faction consequences.
///
/// - every pending timer of the entity is cancelled, then removal is scheduled
/// - Enemy: score (if killed), active-enemy counter
/// - Player: lives to zero, game over
/// - Boss: handled by the boss plugin's delayed notice
pub fn resolve_deaths(
    mut commands: Commands,
    mut deaths: MessageReader<Died>,
    mut q: Query<(&CombatProfile, &mut CollisionLayers, &mut LinearVelocity)>,
    clock: Res<SimClock>,
    tunables: Res<Tunables>,
    mut scheduler: ResMut<Scheduler>,
    mut session: ResMut<GameSession>,
    mut orchestrator: ResMut<Orchestrator>,
    mut presentation: MessageWriter<Presentation>,
    mut cleared: MessageWriter<hooks::WaveCleared>,
    mut game_over: MessageWriter<hooks::GameOver>,
) {
    for death in deaths.read() {
        let Ok((profile, mut layers, mut vel)) = q.get_mut(death.entity) else {
            continue;
        };

        scheduler.cancel_owner(death.entity);
        *layers = non_interacting(death.faction.layer());
        vel.0 = Vec2::ZERO;
        stop_blink(&mut commands, death.entity);
        scheduler.schedule_after(clock.now, profile.death_delay, death.entity, TimedAction::Despawn);
        presentation.write_batch(Presentation::sound(profile.sounds.explosion.as_ref()));

        match death.faction {
            Faction::Enemy => {
                if death.cause == DeathCause::Killed && session.add_score(profile.score) {
                    presentation.write(Presentation::ScoreChanged(session.score()));
                }
                if let Some(index) =
                    orchestrator.enemy_defeated(&mut session, tunables.wave_clear_delay)
                {
                    info!("Wave {index} cleared");
                    cleared.write(hooks::WaveCleared { index });
                }
            }
            Faction::Player => {
                session.set_lives(0);
                presentation.write(Presentation::LivesChanged(0));
                if session.declare_game_over(GameOutcome::Defeat) {
                    info!("Game over: player destroyed (score {})", session.score());
                    orchestrator.enter_game_over();
                    game_over.write(hooks::GameOver { outcome: GameOutcome::Defeat });
                }
            }
            Faction::Boss => {}
        }
    }
}

fn end_invincibility_on_timer(
    mut commands: Commands,
    mut timers: MessageReader<TimerElapsed>,
    mut q: Query<&mut Health>,
) {
    for t in timers.read() {
        if t.action != TimedAction::EndInvincibility {
            continue;
        }
        let Ok(mut health) = q.get_mut(t.owner) else {
            continue;
        };
        if health.end_invincibility(t.handle) {
            stop_blink(&mut commands, t.owner);
        }
    }
}

/// Death delay elapsed. Any entity may own a `Despawn` task; combatants also
/// reach `Dead`.
fn despawn_on_timer(
    mut commands: Commands,
    mut timers: MessageReader<TimerElapsed>,
    mut q: Query<Option<&mut Health>, Without<PendingDespawn>>,
) {
    for t in timers.read() {
        if t.action != TimedAction::Despawn {
            continue;
        }
        let Ok(health) = q.get_mut(t.owner) else {
            continue;
        };
        if let Some(mut health) = health {
            health.finish_dying();
        }
        commands.entity(t.owner).try_insert(PendingDespawn);
    }
}

/// Structural cleanup after the fixed step.
pub fn despawn_marked(
    mut commands: Commands,
    mut scheduler: ResMut<Scheduler>,
    q: Query<Entity, With<PendingDespawn>>,
) {
    for e in &q {
        scheduler.cancel_owner(e);
        commands.entity(e).try_despawn();
    }
}

#[cfg(test)]
mod tests;
