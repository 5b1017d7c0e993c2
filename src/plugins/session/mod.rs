//! Session plugin: top-level counters, game-over flow, and restart.
//!
//! `GameSession` is the single shared record of the run. Its mutators are
//! guarded so every caller can fire and forget:
//! - the active-enemy counter never goes below zero
//! - once `game_over` is set, counters and the drop gate stop changing
//! - game over is declared at most once

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::config::GameConfig;
use crate::common::rng::SimRng;
use crate::common::scheduler::Scheduler;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::levels::Orchestrator;

pub mod hooks;

pub use hooks::{GameOutcome, Presentation};

/// Result of one enemy-death notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTally {
    /// Session already over, or nothing left to count.
    Ignored,
    Remaining(u32),
    /// This notification brought the counter to zero.
    Cleared,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameSession {
    current_level: usize,
    active_enemies: u32,
    score: u32,
    lives: u32,
    game_over: bool,
    outcome: Option<GameOutcome>,
    drop_spawned_this_wave: bool,
}

impl GameSession {
    pub fn new(lives: u32) -> Self {
        Self {
            current_level: 0,
            active_enemies: 0,
            score: 0,
            lives,
            game_over: false,
            outcome: None,
            drop_spawned_this_wave: false,
        }
    }

    pub fn reset(&mut self, lives: u32) {
        *self = Self::new(lives);
    }

    #[inline]
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    #[inline]
    pub fn active_enemies(&self) -> u32 {
        self.active_enemies
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[inline]
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    #[inline]
    pub fn drop_spawned_this_wave(&self) -> bool {
        self.drop_spawned_this_wave
    }

    pub fn begin_wave(&mut self, enemies: u32) {
        if self.game_over {
            return;
        }
        self.active_enemies = enemies;
    }

    /// Count one extra enemy mid-wave (boss reinforcements).
    pub fn register_enemy(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.active_enemies += 1;
        true
    }

    pub fn enemy_defeated(&mut self) -> EnemyTally {
        if self.game_over || self.active_enemies == 0 {
            return EnemyTally::Ignored;
        }
        self.active_enemies -= 1;
        if self.active_enemies == 0 {
            EnemyTally::Cleared
        } else {
            EnemyTally::Remaining(self.active_enemies)
        }
    }

    /// Move to the next level and reopen the drop gate.
    pub fn advance_level(&mut self) -> usize {
        if !self.game_over {
            self.drop_spawned_this_wave = false;
            self.current_level += 1;
        }
        self.current_level
    }

    pub fn add_score(&mut self, value: u32) -> bool {
        if self.game_over {
            return false;
        }
        self.score = self.score.saturating_add(value);
        true
    }

    pub fn set_lives(&mut self, lives: u32) {
        if !self.game_over {
            self.lives = lives;
        }
    }

    /// Returns true only for the call that actually ended the session.
    pub fn declare_game_over(&mut self, outcome: GameOutcome) -> bool {
        if self.game_over {
            return false;
        }
        self.game_over = true;
        self.outcome = Some(outcome);
        true
    }

    /// Take the wave's single drop permission.
    pub fn try_claim_drop(&mut self) -> bool {
        if self.game_over || self.drop_spawned_this_wave {
            return false;
        }
        self.drop_spawned_this_wave = true;
        true
    }
}

pub fn plugin(app: &mut App) {
    let lives = app
        .world()
        .get_resource::<GameConfig>()
        .map_or(0, |c| c.catalog.player.max_lives);

    hooks::register(app);
    app.insert_resource(GameSession::new(lives))
        .add_systems(OnEnter(GameState::InGame), reset_session)
        .add_systems(OnEnter(GameState::GameOver), freeze_world)
        .add_systems(
            PostUpdate,
            enter_game_over_state.run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            Update,
            restart_on_input.run_if(in_state(GameState::GameOver)),
        );
}

/// Every session starts from the same counters, clock, timers and seed.
fn reset_session(
    config: Res<GameConfig>,
    tunables: Res<Tunables>,
    mut session: ResMut<GameSession>,
    mut orchestrator: ResMut<Orchestrator>,
    mut scheduler: ResMut<Scheduler>,
    mut clock: ResMut<SimClock>,
    mut rng: ResMut<SimRng>,
) {
    session.reset(config.catalog.player.max_lives);
    orchestrator.reset();
    scheduler.clear();
    *clock = SimClock::default();
    *rng = SimRng::seeded(tunables.seed);
    info!("Session started: lives={}", session.lives());
}

fn enter_game_over_state(
    mut reader: MessageReader<hooks::GameOver>,
    mut next: ResMut<NextState<GameState>>,
    mut presentation: MessageWriter<Presentation>,
) {
    let Some(ev) = reader.read().last() else {
        return;
    };
    let panel = match ev.outcome {
        GameOutcome::Victory => hooks::UiElement::VictoryPanel,
        GameOutcome::Defeat => hooks::UiElement::GameOverPanel,
    };
    presentation.write(Presentation::ShowUi(panel));
    next.set(GameState::GameOver);
}

/// Game over freezes the world in place.
fn freeze_world(mut q: Query<&mut LinearVelocity>) {
    for mut v in &mut q {
        v.0 = Vec2::ZERO;
    }
}

fn restart_on_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut next: ResMut<NextState<GameState>>,
) {
    let Some(keys) = keys else { return };
    if keys.just_pressed(KeyCode::KeyR) {
        info!("Restarting session");
        next.set(GameState::InGame);
    }
}
