use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::scheduler::{Scheduler, TimedAction};
use crate::common::test_utils::{drain_messages, run_system_once, set_now, sim_world};

fn spawned_player(world: &mut World) -> Entity {
    run_system_once(world, super::spawn);
    world
        .query_filtered::<Entity, With<Player>>()
        .single(world)
        .expect("one player")
}

#[test]
fn spawn_creates_player_at_the_bottom() {
    let mut world = sim_world();
    let p = spawned_player(&mut world);

    assert_eq!(world.get::<Health>(p).unwrap().hp(), 5);
    assert_eq!(*world.get::<Faction>(p).unwrap(), Faction::Player);
    assert_eq!(world.get::<Transform>(p).unwrap().translation.y, -5.0 + SPAWN_OFFSET);
}

#[test]
fn upgrades_are_monotonic_and_saturate() {
    let mut w = PlayerWeapon::default();
    assert!(w.upgrade(3));
    assert!(w.upgrade(3));
    assert!(!w.upgrade(3));
    assert_eq!(w.tier(), 2);
    assert!(!w.upgrade(1));
    assert_eq!(w.tier(), 2);
}

#[test]
fn movement_is_clamped_to_the_play_area() {
    let bounds = PlayBounds { half_width: 3.0, half_height: 5.0 };
    let v = clamped_velocity(Vec2::new(2.95, 0.0), Vec2::X, 4.0, 0.1, &bounds);
    assert!((v.x - 0.5).abs() < 1e-4, "{v:?}");

    let v = clamped_velocity(Vec2::ZERO, Vec2::new(0.0, -1.0), 4.0, 0.1, &bounds);
    assert!((v.y + 4.0).abs() < 1e-4);
}

#[test]
fn apply_movement_sets_velocity() {
    let mut world = sim_world();
    let p = spawned_player(&mut world);
    world.insert_resource(PlayerInput { move_axis: Vec2::X, shooting_held: false });

    run_system_once(&mut world, super::apply_movement);

    let v = world.get::<LinearVelocity>(p).unwrap().0;
    assert!((v.x - 4.0).abs() < 1e-3, "{v:?}");
}

#[test]
fn invincible_player_is_frozen() {
    let mut world = sim_world();
    let p = spawned_player(&mut world);
    let timer = world.resource_mut::<Scheduler>().schedule_at(2.0, p, TimedAction::EndInvincibility);
    world.get_mut::<Health>(p).unwrap().begin_invincibility(timer);
    world.insert_resource(PlayerInput { move_axis: Vec2::X, shooting_held: true });

    run_system_once(&mut world, super::apply_movement);
    run_system_once(&mut world, super::fire);

    assert_eq!(world.get::<LinearVelocity>(p).unwrap().0, Vec2::ZERO);
    assert!(drain_messages::<SpawnProjectile>(&mut world).is_empty());
}

#[test]
fn held_trigger_fires_at_the_reload_rate() {
    let mut world = sim_world();
    spawned_player(&mut world);
    world.insert_resource(PlayerInput { move_axis: Vec2::ZERO, shooting_held: true });

    run_system_once(&mut world, super::fire);
    set_now(&mut world, 0.05);
    run_system_once(&mut world, super::fire);
    set_now(&mut world, 0.2);
    run_system_once(&mut world, super::fire);

    let shots = drain_messages::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 2);
    assert!(shots.iter().all(|s| s.faction == Faction::Player && s.dir == Vec2::Y));
    assert!(shots.iter().all(|s| s.archetype == "bolt"));
}

#[test]
fn top_tier_fires_a_fan() {
    let mut world = sim_world();
    let p = spawned_player(&mut world);
    let mut w = PlayerWeapon::default();
    w.upgrade(3);
    w.upgrade(3);
    world.entity_mut(p).insert(w);
    world.insert_resource(PlayerInput { move_axis: Vec2::ZERO, shooting_held: true });

    run_system_once(&mut world, super::fire);

    let shots = drain_messages::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 3);
    assert!(shots.iter().all(|s| s.archetype == "heavy_bolt"));
}

#[test]
fn fan_is_symmetric_around_up() {
    let dirs = fan_directions(3, 20.0);
    assert_eq!(dirs.len(), 3);
    assert!((dirs[1] - Vec2::Y).length() < 1e-5);
    assert!((dirs[0].x + dirs[2].x).abs() < 1e-5);
    assert!((dirs[0].angle_to(Vec2::Y).to_degrees().abs() - 10.0).abs() < 1e-3);
    assert_eq!(fan_directions(1, 45.0), vec![Vec2::Y]);
}
