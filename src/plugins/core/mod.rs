//! Core plugin: shared resources, the fixed tick, and the timer pump.
//!
//! Must be registered first: later plugins read `Tunables` and `GameConfig`
//! while they build.

use bevy::prelude::*;

use crate::common::clock::{SimClock, advance_clock};
use crate::common::config::GameConfig;
use crate::common::rng::SimRng;
use crate::common::scheduler::{Scheduler, TimerElapsed};
use crate::common::sets::SimSet;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    // A pre-inserted `Tunables` / `GameConfig` wins (tests, tools).
    let tunables = app
        .world()
        .get_resource::<Tunables>()
        .cloned()
        .unwrap_or_default();
    if app.world().get_resource::<GameConfig>().is_none() {
        app.insert_resource(GameConfig::load_or_default(&tunables.config_path));
    }

    app.insert_resource(Time::<Fixed>::from_hz(tunables.fixed_hz))
        .insert_resource(SimRng::seeded(tunables.seed))
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)))
        .insert_resource(tunables)
        .init_resource::<SimClock>()
        .init_resource::<Scheduler>()
        .add_message::<TimerElapsed>()
        .configure_sets(
            FixedUpdate,
            (
                SimSet::Clock,
                SimSet::Timers,
                SimSet::Orchestrate,
                SimSet::Steer,
                SimSet::Fire,
                SimSet::Spawn,
            )
                .chain()
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            (advance_clock, publish_due_timers)
                .chain()
                .in_set(SimSet::Clock),
        );
}

/// Hand every task due at the current tick to the domain handlers.
pub fn publish_due_timers(
    clock: Res<SimClock>,
    mut scheduler: ResMut<Scheduler>,
    mut elapsed: MessageWriter<TimerElapsed>,
) {
    let due = scheduler.drain_due(clock.now);
    if !due.is_empty() {
        trace!("{} timers due at {:.3}", due.len(), clock.now);
    }
    elapsed.write_batch(due.into_iter().map(TimerElapsed::from));
}

#[cfg(test)]
mod tests;
