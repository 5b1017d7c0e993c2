//! World plugin: the screen/viewport bounds provider and the backdrop.
//!
//! World space is centred on the screen: x in `[-half_width, half_width]`,
//! y in `[-half_height, half_height]`. Viewport space maps that rectangle to
//! `[0, 1] x [0, 1]`.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{state::GameState, tunables::Tunables};

/// Fraction of the viewport treated as "near the edge" by enemy steering.
pub const EDGE_MARGIN: f32 = 0.05;

/// Distance kept from the edges when picking waypoints.
pub const WAYPOINT_INSET: f32 = 1.0;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayBounds {
    pub half_width: f32,
    pub half_height: f32,
}

impl PlayBounds {
    pub fn from_tunables(t: &Tunables) -> Self {
        Self { half_width: t.half_width, half_height: t.half_height }
    }

    #[inline]
    pub fn to_viewport(&self, pos: Vec2) -> Vec2 {
        Vec2::new(
            (pos.x + self.half_width) / (2.0 * self.half_width),
            (pos.y + self.half_height) / (2.0 * self.half_height),
        )
    }

    #[inline]
    pub fn from_viewport(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            v.x * 2.0 * self.half_width - self.half_width,
            v.y * 2.0 * self.half_height - self.half_height,
        )
    }

    /// Strict containment test used to end the "entering" phase.
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        let v = self.to_viewport(pos);
        v.x > 0.0 && v.x < 1.0 && v.y > 0.0 && v.y < 1.0
    }

    /// Per-axis "within 5% of an edge" test.
    #[inline]
    pub fn near_edge(&self, pos: Vec2) -> BVec2 {
        let v = self.to_viewport(pos);
        BVec2::new(
            v.x < EDGE_MARGIN || v.x > 1.0 - EDGE_MARGIN,
            v.y < EDGE_MARGIN || v.y > 1.0 - EDGE_MARGIN,
        )
    }

    /// Clamp into the visible rectangle.
    #[inline]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        self.from_viewport(self.to_viewport(pos).clamp(Vec2::ZERO, Vec2::ONE))
    }

    #[inline]
    pub fn clamp_x_inset(&self, x: f32) -> f32 {
        let lim = (self.half_width - WAYPOINT_INSET).max(0.0);
        x.clamp(-lim, lim)
    }

    #[inline]
    pub fn clamp_y_inset(&self, y: f32) -> f32 {
        let lim = (self.half_height - WAYPOINT_INSET).max(0.0);
        y.clamp(-lim, lim)
    }

    /// Clamp into the rectangle shrunk by `WAYPOINT_INSET` on every side.
    #[inline]
    pub fn clamp_inset(&self, pos: Vec2) -> Vec2 {
        Vec2::new(self.clamp_x_inset(pos.x), self.clamp_y_inset(pos.y))
    }

    /// True once a position has left the vertical play band (plus `margin`).
    #[inline]
    pub fn outside_vertical(&self, pos: Vec2, margin: f32) -> bool {
        pos.y > self.half_height + margin || pos.y < -self.half_height - margin
    }
}

pub fn plugin(app: &mut App) {
    let bounds = PlayBounds::from_tunables(app.world().resource::<Tunables>());
    app.insert_resource(bounds);
    app.add_systems(OnEnter(GameState::InGame), spawn_backdrop);
}

fn spawn_backdrop(mut commands: Commands, bounds: Res<PlayBounds>) {
    commands.spawn((
        Name::new("Backdrop"),
        Sprite::from_color(
            Color::srgb(0.03, 0.03, 0.08),
            Vec2::new(bounds.half_width * 2.0, bounds.half_height * 2.0),
        ),
        Transform::from_xyz(0.0, 0.0, -10.0),
        DespawnOnExit(GameState::GameOver),
    ));
}
