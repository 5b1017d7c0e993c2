//! System ordering for one simulation tick.
//!
//! ```text
//! FixedUpdate      Clock → Timers → Orchestrate → Steer → Fire → Spawn
//! (physics step: avian integrates velocities, emits CollisionStart)
//! FixedPostUpdate  Collide → Damage → Deaths → Expire
//! PostUpdate       despawn marked entities + cancel their timers
//! ```
//!
//! All damage of a tick is resolved before the next tick's movement, and
//! before the orchestrator looks at the active-enemy counter again.

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Clock,
    Timers,
    Orchestrate,
    Steer,
    Fire,
    Spawn,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveSet {
    Collide,
    Damage,
    Deaths,
    Expire,
}
