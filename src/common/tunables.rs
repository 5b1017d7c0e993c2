//! Tunable runtime constants.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    /// Screen pixels per world unit; the camera uses it to frame the play area.
    pub pixels_per_meter: f32,
    /// Typical object size for the physics solver, world units.
    pub physics_length_unit: f32,
    pub fixed_hz: f64,
    pub seed: u64,
    /// Half extents of the visible play area, world units.
    pub half_width: f32,
    pub half_height: f32,
    pub title_fade_in: f32,
    pub title_hold: f32,
    pub title_fade_out: f32,
    /// Pause between a cleared wave and the next title sequence.
    pub wave_clear_delay: f32,
    /// How far past the top/bottom edge a projectile may travel before removal.
    pub projectile_margin: f32,
    pub config_path: String,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 64.0,
            physics_length_unit: 1.0,
            fixed_hz: 60.0,
            seed: 0x5EED_2D5,
            half_width: 3.0,
            half_height: 5.0,
            title_fade_in: 0.5,
            title_hold: 1.5,
            title_fade_out: 0.5,
            wave_clear_delay: 1.0,
            projectile_margin: 1.0,
            config_path: "assets/data/game.ron".into(),
        }
    }
}
