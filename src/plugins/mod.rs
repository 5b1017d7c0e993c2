//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod boss;
pub mod combat;
pub mod core;
pub mod drops;
pub mod enemies;
pub mod levels;
pub mod movement;
pub mod physics;
pub mod player;
pub mod presentation;
pub mod projectiles;
pub mod session;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
///
/// `core` goes first: it provides `Tunables` and `GameConfig` to the rest.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    session::plugin(app);
    combat::plugin(app);
    movement::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    boss::plugin(app);
    drops::plugin(app);
    levels::plugin(app);
    presentation::plugin(app);
    app.add_plugins(ProjectilesPlugin);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}
