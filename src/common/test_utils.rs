//! Test helpers.
//!
//! Systems are run one at a time with `RunSystemOnce`; `world.flush()` applies
//! queued commands before assertions. Message buffers are created up front so
//! `MessageReader`/`MessageWriter` params validate.

use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use avian2d::prelude::CollisionStart;
use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::config::GameConfig;
use crate::common::rng::SimRng;
use crate::common::scheduler::{Scheduler, TimerElapsed};
use crate::common::tunables::Tunables;
use crate::plugins::combat::{DamageRequest, Died};
use crate::plugins::drops::PickupCollected;
use crate::plugins::enemies::SpawnCombatant;
use crate::plugins::levels::Orchestrator;
use crate::plugins::projectiles::messages::SpawnProjectile;
use crate::plugins::session::{GameSession, hooks};
use crate::plugins::world::PlayBounds;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

pub fn ensure_messages<T: Message>(world: &mut World) {
    if world.get_resource::<Messages<T>>().is_none() {
        world.init_resource::<Messages<T>>();
    }
}

/// Take every message of type `T` currently buffered.
pub fn drain_messages<T: Message>(world: &mut World) -> Vec<T> {
    ensure_messages::<T>(world);
    world.resource_mut::<Messages<T>>().drain().collect()
}

/// A world with every simulation resource and message buffer installed,
/// using the built-in game data and default tunables.
pub fn sim_world() -> World {
    let mut world = World::new();
    let tunables = Tunables::default();
    let config = GameConfig::default();

    world.insert_resource(SimClock { now: 0.0, dt: 1.0 / 60.0 });
    world.insert_resource(Scheduler::default());
    world.insert_resource(SimRng::seeded(7));
    world.insert_resource(PlayBounds::from_tunables(&tunables));
    world.insert_resource(GameSession::new(config.catalog.player.max_lives));
    world.insert_resource(Orchestrator::default());
    world.insert_resource(config);
    world.insert_resource(tunables);

    ensure_messages::<CollisionStart>(&mut world);
    ensure_messages::<TimerElapsed>(&mut world);
    ensure_messages::<DamageRequest>(&mut world);
    ensure_messages::<Died>(&mut world);
    ensure_messages::<PickupCollected>(&mut world);
    ensure_messages::<SpawnCombatant>(&mut world);
    ensure_messages::<SpawnProjectile>(&mut world);
    hooks::init_messages_in_world(&mut world);
    world
}

/// Move the simulation clock to an absolute time.
pub fn set_now(world: &mut World, now: f64) {
    world.resource_mut::<SimClock>().now = now;
}

/// Move the clock to `now` and publish every task due by then as `TimerElapsed`.
pub fn publish_due(world: &mut World, now: f64) {
    set_now(world, now);
    let due = world.resource_mut::<Scheduler>().drain_due(now);
    for d in due {
        world.write_message(TimerElapsed::from(d));
    }
}

/// Inject an engine collision between two bodies (colliders on the bodies).
pub fn collide(world: &mut World, a: Entity, b: Entity) {
    ensure_messages::<CollisionStart>(world);
    world.write_message(CollisionStart {
        collider1: a,
        collider2: b,
        body1: Some(a),
        body2: Some(b),
    });
}
