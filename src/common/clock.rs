//! Simulation clock.
//!
//! Every "resume at tick >= scheduled time" decision in the simulation reads
//! this resource instead of `Time`, so tests can drive time by hand.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    /// Seconds of simulated time since the session started.
    pub now: f64,
    /// Length of the current fixed tick.
    pub dt: f32,
}

impl SimClock {
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.dt = dt;
        self.now += f64::from(dt);
    }
}

/// FixedUpdate: advance the clock by the fixed delta.
pub fn advance_clock(time: Res<Time>, mut clock: ResMut<SimClock>) {
    clock.advance(time.delta_secs());
}
