//! Camera plugin (render-only).
//!
//! One fixed orthographic camera framing the play area. It outlives sessions:
//! the frozen field stays on screen during GameOver and across restarts.

use bevy::prelude::*;

use crate::common::tunables::Tunables;

#[derive(Component)]
pub struct MainCamera;

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_camera);
}

fn spawn_camera(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("MainCamera"),
        MainCamera,
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / tunables.pixels_per_meter.max(1.0),
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, 0.0, 999.0),
    ));
}
