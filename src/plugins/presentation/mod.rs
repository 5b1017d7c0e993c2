//! Presentation plugin: visibility blinking and the notification sink.
//!
//! Nothing here feeds back into the simulation. Blinking runs on the
//! variable-rate `Update` tick; the sink logs every `Presentation` message so a
//! headless run still shows what UI/audio would have done.

use bevy::prelude::*;

use crate::plugins::session::Presentation;

/// Periodic visibility toggle. Removing it (see `stop_blink`) leaves the entity
/// visible.
#[derive(Component, Debug, Clone)]
pub struct Blink {
    timer: Timer,
}

impl Blink {
    pub fn new(interval: f32) -> Self {
        Self { timer: Timer::from_seconds(interval.max(0.01), TimerMode::Repeating) }
    }
}

/// Start blinking. The first phase is hidden.
pub fn start_blink(commands: &mut Commands, entity: Entity, interval: f32) {
    commands
        .entity(entity)
        .try_insert((Blink::new(interval), Visibility::Hidden));
}

/// Cancel blinking and restore visibility unconditionally.
pub fn stop_blink(commands: &mut Commands, entity: Entity) {
    commands
        .entity(entity)
        .try_remove::<Blink>()
        .try_insert(Visibility::Visible);
}

pub fn plugin(app: &mut App) {
    app.add_systems(Update, (tick_blink, log_presentation));
}

fn tick_blink(time: Res<Time>, mut q: Query<(&mut Blink, &mut Visibility)>) {
    for (mut blink, mut vis) in &mut q {
        blink.timer.tick(time.delta());
        if blink.timer.times_finished_this_tick() % 2 == 1 {
            *vis = match *vis {
                Visibility::Hidden => Visibility::Visible,
                _ => Visibility::Hidden,
            };
        }
    }
}

fn log_presentation(mut reader: MessageReader<Presentation>) {
    for note in reader.read() {
        debug!("presentation: {note:?}");
    }
}
