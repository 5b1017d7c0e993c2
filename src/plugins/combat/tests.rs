use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::scheduler::{Scheduler, TimedAction};
use crate::common::test_utils::{
    collide, drain_messages, publish_due, run_system_once, sim_world,
};
use crate::plugins::presentation::Blink;

fn handle(world: &mut World) -> crate::common::scheduler::TaskHandle {
    let owner = world.spawn_empty().id();
    world.resource_mut::<Scheduler>().schedule_at(1.0, owner, TimedAction::EndInvincibility)
}

fn profile(score: u32) -> CombatProfile {
    CombatProfile {
        invincibility: 0.1,
        blink_interval: 0.1,
        death_delay: 0.5,
        score,
        ..default()
    }
}

fn spawn_combatant(world: &mut World, faction: Faction, hp: u32, score: u32) -> Entity {
    world
        .spawn((
            Health::new(hp),
            faction,
            profile(score),
            Transform::from_xyz(1.0, 2.0, 0.0),
            CollisionLayers::new(faction.layer(), [Layer::Player, Layer::PlayerBullet]),
            LinearVelocity(Vec2::new(0.0, -3.0)),
        ))
        .id()
}

fn hit(world: &mut World, target: Entity, kind: DamageKind) {
    world.write_message(DamageRequest { target, kind });
}

// -----------------------------------------------------------------------------
// Health model
// -----------------------------------------------------------------------------

#[test]
fn lethal_sequence_kills_exactly_once() {
    let mut h = Health::new(3);
    assert_eq!(h.apply_damage(2), DamageOutcome::Hurt { hp: 1 });
    assert_eq!(h.apply_damage(5), DamageOutcome::Killed);
    assert_eq!(h.hp(), 0);
    assert_eq!(h.apply_damage(1), DamageOutcome::Ignored(IgnoreReason::Dead));
    assert_eq!(h.kill(), DamageOutcome::Ignored(IgnoreReason::Dead));
    assert_eq!(h.life(), LifeState::Dying);
}

#[test]
fn invincibility_blocks_damage() {
    let mut world = World::new();
    world.init_resource::<Scheduler>();
    let timer = handle(&mut world);

    let mut h = Health::new(5);
    assert_eq!(h.apply_damage(1), DamageOutcome::Hurt { hp: 4 });
    assert!(h.begin_invincibility(timer));
    assert_eq!(h.apply_damage(3), DamageOutcome::Ignored(IgnoreReason::Invincible));
    assert_eq!(h.hp(), 4);
}

#[test]
fn stale_expiry_does_not_end_a_newer_window() {
    let mut world = World::new();
    world.init_resource::<Scheduler>();
    let first = handle(&mut world);
    let second = handle(&mut world);

    let mut h = Health::new(5);
    h.begin_invincibility(first);
    assert!(h.end_invincibility(first));
    h.begin_invincibility(second);
    assert!(!h.end_invincibility(first));
    assert!(h.is_invincible());
}

#[test]
fn contact_kill_ignores_invincibility() {
    let mut world = World::new();
    world.init_resource::<Scheduler>();
    let timer = handle(&mut world);

    let mut h = Health::new(5);
    h.begin_invincibility(timer);
    assert_eq!(h.kill(), DamageOutcome::Killed);
    assert!(!h.begin_invincibility(timer));
}

#[test]
fn zero_damage_is_ignored() {
    let mut h = Health::new(2);
    assert_eq!(h.apply_damage(0), DamageOutcome::Ignored(IgnoreReason::NoDamage));
    assert_eq!(h.hp(), 2);
}

#[test]
fn finish_dying_only_from_dying() {
    let mut h = Health::new(1);
    assert!(!h.finish_dying());
    h.apply_damage(1);
    assert!(h.finish_dying());
    assert_eq!(h.life(), LifeState::Dead);
    assert!(!h.finish_dying());
}

#[test]
fn boss_takes_five_hits_between_flashes_then_dies_once() {
    let mut world = World::new();
    world.init_resource::<Scheduler>();
    let mut boss = Health::new(20);

    for _ in 0..5 {
        assert!(matches!(boss.apply_damage(2), DamageOutcome::Hurt { .. }));
        let timer = handle(&mut world);
        assert!(boss.begin_invincibility(timer));
        assert!(boss.end_invincibility(timer));
    }
    assert_eq!(boss.hp(), 10);
    assert!(boss.is_alive());

    assert_eq!(boss.apply_damage(20), DamageOutcome::Killed);
    assert_eq!(boss.apply_damage(20), DamageOutcome::Ignored(IgnoreReason::Dead));
}

#[test]
fn factions_oppose_across_sides_only() {
    assert!(Faction::Player.opposes(Faction::Enemy));
    assert!(Faction::Boss.opposes(Faction::Player));
    assert!(!Faction::Enemy.opposes(Faction::Boss));
    assert!(!Faction::Player.opposes(Faction::Player));
}

// -----------------------------------------------------------------------------
// Damage resolution
// -----------------------------------------------------------------------------

#[test]
fn many_lethal_requests_in_one_tick_publish_one_death() {
    let mut world = sim_world();
    let e = spawn_combatant(&mut world, Faction::Enemy, 3, 10);

    hit(&mut world, e, DamageKind::Hit(5));
    hit(&mut world, e, DamageKind::Contact);
    hit(&mut world, e, DamageKind::Hit(9));
    run_system_once(&mut world, apply_damage_requests);

    let died = drain_messages::<Died>(&mut world);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].entity, e);
    assert_eq!(died[0].cause, DeathCause::Killed);
    assert_eq!(died[0].pos, Vec2::new(1.0, 2.0));
}

#[test]
fn survivable_hit_opens_a_window_and_blinks() {
    let mut world = sim_world();
    let e = spawn_combatant(&mut world, Faction::Enemy, 3, 10);

    hit(&mut world, e, DamageKind::Hit(1));
    hit(&mut world, e, DamageKind::Hit(1));
    run_system_once(&mut world, apply_damage_requests);

    let health = world.get::<Health>(e).unwrap();
    assert_eq!(health.hp(), 2);
    assert!(health.is_invincible());
    assert!(world.get::<Blink>(e).is_some());
    assert_eq!(world.resource::<Scheduler>().pending_for(e), 1);

    publish_due(&mut world, 0.2);
    run_system_once(&mut world, end_invincibility_on_timer);

    assert!(!world.get::<Health>(e).unwrap().is_invincible());
    assert!(world.get::<Blink>(e).is_none());
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Visible);
}

#[test]
fn player_hit_updates_lives() {
    let mut world = sim_world();
    let p = spawn_combatant(&mut world, Faction::Player, 5, 0);

    hit(&mut world, p, DamageKind::Hit(1));
    run_system_once(&mut world, apply_damage_requests);

    assert_eq!(world.resource::<GameSession>().lives(), 4);
    assert!(drain_messages::<Presentation>(&mut world).contains(&Presentation::LivesChanged(4)));
}

#[test]
fn damage_after_game_over_is_ignored() {
    let mut world = sim_world();
    let e = spawn_combatant(&mut world, Faction::Enemy, 1, 10);
    world.resource_mut::<GameSession>().declare_game_over(GameOutcome::Defeat);

    hit(&mut world, e, DamageKind::Hit(1));
    run_system_once(&mut world, apply_damage_requests);

    assert_eq!(world.get::<Health>(e).unwrap().hp(), 1);
    assert!(drain_messages::<Died>(&mut world).is_empty());
}

#[test]
fn requests_for_missing_entities_are_skipped() {
    let mut world = sim_world();
    let gone = world.spawn_empty().id();
    world.despawn(gone);

    hit(&mut world, gone, DamageKind::Hit(1));
    run_system_once(&mut world, apply_damage_requests);
    assert!(drain_messages::<Died>(&mut world).is_empty());
}

// -----------------------------------------------------------------------------
// Death sequence
// -----------------------------------------------------------------------------

#[test]
fn killed_enemy_scores_and_decrements_the_counter() {
    let mut world = sim_world();
    world.resource_mut::<GameSession>().begin_wave(2);
    let e = spawn_combatant(&mut world, Faction::Enemy, 1, 10);
    world.resource_mut::<Scheduler>().schedule_at(5.0, e, TimedAction::EndInvincibility);

    hit(&mut world, e, DamageKind::Hit(1));
    run_system_once(&mut world, apply_damage_requests);
    run_system_once(&mut world, resolve_deaths);

    let session = world.resource::<GameSession>();
    assert_eq!(session.score(), 10);
    assert_eq!(session.active_enemies(), 1);

    assert_eq!(world.get::<CollisionLayers>(e).unwrap().filters, LayerMask::NONE);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::ZERO);
    // Old timers gone, removal scheduled.
    assert_eq!(world.resource::<Scheduler>().pending_for(e), 1);
    assert!(world.get::<Health>(e).unwrap().life() == LifeState::Dying);
}

#[test]
fn cleanup_death_decrements_without_score() {
    let mut world = sim_world();
    world.resource_mut::<GameSession>().begin_wave(2);
    let e = spawn_combatant(&mut world, Faction::Enemy, 1, 10);

    world.write_message(Died {
        entity: e,
        faction: Faction::Enemy,
        cause: DeathCause::Cleanup,
        pos: Vec2::ZERO,
    });
    run_system_once(&mut world, resolve_deaths);

    let session = world.resource::<GameSession>();
    assert_eq!(session.score(), 0);
    assert_eq!(session.active_enemies(), 1);
}

#[test]
fn last_enemy_death_clears_the_wave() {
    let mut world = sim_world();
    world.resource_mut::<GameSession>().begin_wave(1);
    let e = spawn_combatant(&mut world, Faction::Enemy, 1, 10);

    hit(&mut world, e, DamageKind::Contact);
    run_system_once(&mut world, apply_damage_requests);
    run_system_once(&mut world, resolve_deaths);

    assert_eq!(world.resource::<GameSession>().current_level(), 1);
    assert_eq!(
        drain_messages::<hooks::WaveCleared>(&mut world),
        vec![hooks::WaveCleared { index: 0 }]
    );
}

#[test]
fn player_death_is_defeat() {
    let mut world = sim_world();
    let p = spawn_combatant(&mut world, Faction::Player, 1, 0);

    hit(&mut world, p, DamageKind::Hit(1));
    run_system_once(&mut world, apply_damage_requests);
    run_system_once(&mut world, resolve_deaths);

    let session = world.resource::<GameSession>();
    assert_eq!(session.lives(), 0);
    assert_eq!(session.outcome(), Some(GameOutcome::Defeat));
    assert!(world.resource::<Orchestrator>().is_game_over());
    assert_eq!(
        drain_messages::<hooks::GameOver>(&mut world),
        vec![hooks::GameOver { outcome: GameOutcome::Defeat }]
    );
}

#[test]
fn death_delay_ends_in_removal() {
    let mut world = sim_world();
    let e = spawn_combatant(&mut world, Faction::Enemy, 1, 0);

    hit(&mut world, e, DamageKind::Hit(1));
    run_system_once(&mut world, apply_damage_requests);
    run_system_once(&mut world, resolve_deaths);

    publish_due(&mut world, 0.4);
    run_system_once(&mut world, despawn_on_timer);
    assert!(world.get::<PendingDespawn>(e).is_none());

    publish_due(&mut world, 0.5);
    run_system_once(&mut world, despawn_on_timer);
    assert_eq!(world.get::<Health>(e).unwrap().life(), LifeState::Dead);
    assert!(world.get::<PendingDespawn>(e).is_some());

    run_system_once(&mut world, despawn_marked);
    assert!(world.get_entity(e).is_err());
}

#[test]
fn despawn_cancels_pending_timers() {
    let mut world = sim_world();
    let e = world.spawn(PendingDespawn).id();
    world.resource_mut::<Scheduler>().schedule_at(3.0, e, TimedAction::DropExpire);

    run_system_once(&mut world, despawn_marked);

    assert!(world.resource::<Scheduler>().is_empty());
}

// -----------------------------------------------------------------------------
// Body contacts
// -----------------------------------------------------------------------------

#[test]
fn enemy_contact_hurts_player_and_destroys_enemy() {
    let mut world = sim_world();
    let p = spawn_combatant(&mut world, Faction::Player, 5, 0);
    let e = spawn_combatant(&mut world, Faction::Enemy, 3, 10);

    collide(&mut world, e, p);
    collide(&mut world, p, e);
    run_system_once(&mut world, contact::resolve_body_contacts);

    let reqs = drain_messages::<DamageRequest>(&mut world);
    assert_eq!(
        reqs,
        vec![
            DamageRequest { target: p, kind: DamageKind::Hit(contact::CONTACT_DAMAGE) },
            DamageRequest { target: e, kind: DamageKind::Contact },
        ]
    );
}

#[test]
fn boss_contact_only_hurts_player() {
    let mut world = sim_world();
    let p = spawn_combatant(&mut world, Faction::Player, 5, 0);
    let b = spawn_combatant(&mut world, Faction::Boss, 20, 200);

    collide(&mut world, p, b);
    run_system_once(&mut world, contact::resolve_body_contacts);

    let reqs = drain_messages::<DamageRequest>(&mut world);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].target, p);
}

#[test]
fn invincible_player_ignores_contacts() {
    let mut world = sim_world();
    let p = spawn_combatant(&mut world, Faction::Player, 5, 0);
    let e = spawn_combatant(&mut world, Faction::Enemy, 3, 10);
    let timer = handle(&mut world);
    world.get_mut::<Health>(p).unwrap().begin_invincibility(timer);

    collide(&mut world, p, e);
    run_system_once(&mut world, contact::resolve_body_contacts);

    assert!(drain_messages::<DamageRequest>(&mut world).is_empty());
}

#[test]
fn hostile_pairs_do_not_contact() {
    let mut world = sim_world();
    let a = spawn_combatant(&mut world, Faction::Enemy, 3, 10);
    let b = spawn_combatant(&mut world, Faction::Boss, 3, 10);

    collide(&mut world, a, b);
    run_system_once(&mut world, contact::resolve_body_contacts);

    assert!(drain_messages::<DamageRequest>(&mut world).is_empty());
}
