//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime.
//! - time advances by exactly one fixed tick per `app.update()`.
//! - `starwake::game::configure_headless` installs the gameplay plugins.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use starwake::common::config::GameConfig;
use starwake::common::tunables::Tunables;
use starwake::plugins::combat::{DamageKind, DamageRequest};
use starwake::plugins::enemies::Enemy;
use starwake::plugins::player::Player;
use starwake::plugins::session::GameSession;

pub const TICK: f64 = 1.0 / 60.0;

pub fn app_headless() -> App {
    app_with_config(GameConfig::default())
}

pub fn app_with_config(config: GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        TransformPlugin,
        AssetPlugin::default(),
        // avian's collider constructors read `SceneSpawner`.
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(TICK)));
    app.insert_resource(Tunables::default());
    app.insert_resource(config);

    starwake::game::configure_headless(&mut app);
    // Plugins such as avian insert resources in `finish`; `App::run` is never called here.
    app.finish();
    app.cleanup();
    app
}

/// Run roughly `secs` of simulated time.
pub fn run_for(app: &mut App, secs: f64) {
    let ticks = (secs / TICK).ceil() as usize;
    for _ in 0..ticks {
        app.update();
    }
}

pub fn session(app: &App) -> &GameSession {
    app.world().resource::<GameSession>()
}

pub fn count<C: Component>(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<Entity, With<C>>()
        .iter(app.world())
        .count()
}

pub fn player(app: &mut App) -> Option<Entity> {
    app.world_mut()
        .query_filtered::<Entity, With<Player>>()
        .iter(app.world())
        .next()
}

/// Contact-kill every enemy currently on the field.
pub fn kill_enemies(app: &mut App) -> usize {
    let enemies: Vec<Entity> = app
        .world_mut()
        .query_filtered::<Entity, With<Enemy>>()
        .iter(app.world())
        .collect();
    for &target in &enemies {
        app.world_mut()
            .write_message(DamageRequest { target, kind: DamageKind::Contact });
    }
    enemies.len()
}

/// Run until `done` holds or `max_secs` elapse. Returns whether it held.
pub fn run_until(app: &mut App, max_secs: f64, mut done: impl FnMut(&mut App) -> bool) -> bool {
    let ticks = (max_secs / TICK).ceil() as usize;
    for _ in 0..ticks {
        if done(app) {
            return true;
        }
        app.update();
    }
    done(app)
}
