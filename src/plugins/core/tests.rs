use bevy::prelude::*;

use super::*;
use crate::common::scheduler::TimedAction;
use crate::common::test_utils::{drain_messages, run_system_once, set_now, sim_world};

#[test]
fn inserts_resources() {
    let mut app = App::new();
    plugin(&mut app);

    let world = app.world();
    assert!(world.get_resource::<Tunables>().is_some());
    assert!(world.get_resource::<GameConfig>().is_some());
    assert!(world.get_resource::<SimClock>().is_some());
    assert!(world.get_resource::<Scheduler>().is_some());
    assert!(world.get_resource::<SimRng>().is_some());
    assert!(world.get_resource::<ClearColor>().is_some());
}

#[test]
fn pre_inserted_settings_win() {
    let mut app = App::new();
    app.insert_resource(Tunables { fixed_hz: 30.0, ..default() });
    let mut config = GameConfig::default();
    config.levels.truncate(1);
    app.insert_resource(config);

    plugin(&mut app);

    let world = app.world();
    assert_eq!(world.resource::<Tunables>().fixed_hz, 30.0);
    assert_eq!(world.resource::<GameConfig>().levels.len(), 1);
    let step = world.resource::<Time<Fixed>>().timestep().as_secs_f64();
    assert!((step - 1.0 / 30.0).abs() < 1e-9);
}

#[test]
fn due_timers_are_published_in_order() {
    let mut world = sim_world();
    let a = world.spawn_empty().id();
    let b = world.spawn_empty().id();
    {
        let mut scheduler = world.resource_mut::<Scheduler>();
        scheduler.schedule_at(0.5, a, TimedAction::Despawn);
        scheduler.schedule_at(0.2, b, TimedAction::DropBlink);
        scheduler.schedule_at(2.0, a, TimedAction::DropExpire);
    }

    set_now(&mut world, 1.0);
    run_system_once(&mut world, publish_due_timers);

    let fired = drain_messages::<TimerElapsed>(&mut world);
    let actions: Vec<_> = fired.iter().map(|t| (t.owner, t.action)).collect();
    assert_eq!(actions, vec![(b, TimedAction::DropBlink), (a, TimedAction::Despawn)]);
    assert_eq!(world.resource::<Scheduler>().len(), 1);
}
