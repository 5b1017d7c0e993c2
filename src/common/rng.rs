//! Seeded randomness.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Resource, Debug, Clone, Deref, DerefMut)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Uniform sample in `[-half, half)`; zero when the range is empty.
    #[inline]
    pub fn spread(&mut self, half: f32) -> f32 {
        if half > 0.0 { self.0.gen_range(-half..half) } else { 0.0 }
    }

    /// Uniform sample in `[lo, hi)`; `lo` when the range is empty.
    #[inline]
    pub fn between(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo { self.0.gen_range(lo..hi) } else { lo }
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(0)
    }
}
