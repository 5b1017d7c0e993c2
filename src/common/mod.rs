//! Common, shared types.

pub mod clock;
pub mod config;
pub mod layers;
pub mod rng;
pub mod scheduler;
pub mod sets;
pub mod state;
pub mod tunables;

#[cfg(test)]
pub mod test_utils;
