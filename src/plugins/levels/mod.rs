//! Levels plugin: the wave orchestrator.
//!
//! ```text
//! Idle{delay} ─► TitleFadeIn ─► TitleHold ─► TitleFadeOut ─► Spawning ─► Active
//!   ▲   │                                                                  │
//!   │   └── no level at current index ──► GameOver(Victory)                │
//!   └────────────── last active enemy defeated (level += 1) ───────────────┘
//!
//! any phase ── session over ──► GameOver (terminal)
//! ```
//!
//! Title phases only emit presentation notifications. The `Active` phase is
//! left through `Orchestrator::enemy_defeated`, called from the death
//! resolution systems in the same tick as the death.

use std::time::Duration;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::clock::SimClock;
use crate::common::config::{Catalog, GameConfig, WaveConfig};
use crate::common::rng::SimRng;
use crate::common::sets::SimSet;
use crate::common::tunables::Tunables;
use crate::plugins::boss;
use crate::plugins::enemies::{Archetype, SpawnCombatant};
use crate::plugins::session::hooks::{
    BossEncounter, FadeGroup, GameOver, LevelStarted, UiElement, WaveCleared,
};
use crate::plugins::session::{EnemyTally, GameOutcome, GameSession, Presentation};
use crate::plugins::world::{PlayBounds, WAYPOINT_INSET};

#[derive(Debug, Clone)]
pub enum LevelPhase {
    /// Waiting before the next level's title sequence.
    Idle { delay: Timer },
    TitleFadeIn { timer: Timer },
    TitleHold { timer: Timer },
    TitleFadeOut { timer: Timer },
    Spawning,
    Active,
    GameOver,
}

/// One-shot timer; negative durations count as zero.
#[inline]
fn once(seconds: f32) -> Timer {
    Timer::from_seconds(seconds.max(0.0), TimerMode::Once)
}

impl LevelPhase {
    #[inline]
    fn idle(seconds: f32) -> Self {
        Self::Idle { delay: once(seconds) }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct Orchestrator {
    phase: LevelPhase,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self { phase: LevelPhase::idle(0.0) }
    }
}

impl Orchestrator {
    #[inline]
    pub fn phase(&self) -> &LevelPhase {
        &self.phase
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, LevelPhase::GameOver)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn enter_game_over(&mut self) {
        self.phase = LevelPhase::GameOver;
    }

    /// Death notification for one counted enemy (the boss included).
    ///
    /// Returns the index of the level this notification cleared, if any.
    pub fn enemy_defeated(
        &mut self,
        session: &mut GameSession,
        wave_clear_delay: f32,
    ) -> Option<usize> {
        match session.enemy_defeated() {
            EnemyTally::Cleared => Some(self.clear_wave(session, wave_clear_delay)),
            EnemyTally::Remaining(n) => {
                debug!("{n} enemies remaining");
                None
            }
            EnemyTally::Ignored => {
                debug!("enemy defeat ignored");
                None
            }
        }
    }

    fn clear_wave(&mut self, session: &mut GameSession, wave_clear_delay: f32) -> usize {
        let cleared = session.current_level();
        session.advance_level();
        self.phase = LevelPhase::idle(wave_clear_delay);
        cleared
    }
}

/// Resolve a wave into the combatants to spawn.
///
/// Enemy archetypes are cycled until `enemy_count` slots are filled. Unknown
/// names are skipped and do not count towards the wave.
pub fn spawn_plan(wave: &WaveConfig, catalog: &Catalog) -> Vec<Archetype> {
    let mut plan = Vec::with_capacity(wave.enemy_count as usize + 1);

    if wave.enemies.is_empty() && wave.enemy_count > 0 {
        warn!("wave asks for {} enemies but lists no archetypes", wave.enemy_count);
    }
    for name in wave.enemies.iter().cycle().take(wave.enemy_count as usize) {
        if catalog.enemy(name).is_some() {
            plan.push(Archetype::Enemy(name.clone()));
        } else {
            warn!("skipping unknown enemy archetype '{name}'");
        }
    }

    if let Some(name) = &wave.boss {
        if catalog.boss(name).is_some() {
            plan.push(Archetype::Boss(name.clone()));
        } else {
            warn!("skipping unknown boss archetype '{name}'");
        }
    }
    plan
}

/// Everything the orchestrator announces.
#[derive(SystemParam)]
pub struct LevelHooks<'w> {
    started: MessageWriter<'w, LevelStarted>,
    boss: MessageWriter<'w, BossEncounter>,
    cleared: MessageWriter<'w, WaveCleared>,
    game_over: MessageWriter<'w, GameOver>,
    presentation: MessageWriter<'w, Presentation>,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Orchestrator>().add_systems(
        FixedUpdate,
        run_orchestrator.in_set(SimSet::Orchestrate),
    );
}

/// Advance the level state machine by one fixed tick.
pub fn run_orchestrator(
    clock: Res<SimClock>,
    config: Res<GameConfig>,
    tunables: Res<Tunables>,
    bounds: Res<PlayBounds>,
    mut rng: ResMut<SimRng>,
    mut session: ResMut<GameSession>,
    mut orchestrator: ResMut<Orchestrator>,
    mut spawns: MessageWriter<SpawnCombatant>,
    mut hooks: LevelHooks,
) {
    if session.is_game_over() {
        if !orchestrator.is_game_over() {
            orchestrator.enter_game_over();
        }
        return;
    }

    let orchestrator = &mut *orchestrator;
    let dt = Duration::from_secs_f32(clock.dt.max(0.0));
    let index = session.current_level();

    let next = match &mut orchestrator.phase {
        LevelPhase::Idle { delay } => {
            delay.tick(dt);
            if !delay.is_finished() {
                return;
            }
            if config.level(index).is_none() {
                if session.declare_game_over(GameOutcome::Victory) {
                    info!("All {} levels cleared (score {})", config.levels.len(), session.score());
                    hooks.game_over.write(GameOver { outcome: GameOutcome::Victory });
                }
                LevelPhase::GameOver
            } else {
                hooks.presentation.write(Presentation::ShowUi(UiElement::LevelTitle(index)));
                hooks.presentation.write(Presentation::Fade {
                    group: FadeGroup::LevelTitle,
                    from: 0.0,
                    to: 1.0,
                    duration: tunables.title_fade_in,
                });
                LevelPhase::TitleFadeIn {
                    timer: once(tunables.title_fade_in),
                }
            }
        }
        LevelPhase::TitleFadeIn { timer } => {
            timer.tick(dt);
            if !timer.is_finished() {
                return;
            }
            LevelPhase::TitleHold {
                timer: once(tunables.title_hold),
            }
        }
        LevelPhase::TitleHold { timer } => {
            timer.tick(dt);
            if !timer.is_finished() {
                return;
            }
            hooks.presentation.write(Presentation::Fade {
                group: FadeGroup::LevelTitle,
                from: 1.0,
                to: 0.0,
                duration: tunables.title_fade_out,
            });
            LevelPhase::TitleFadeOut {
                timer: once(tunables.title_fade_out),
            }
        }
        LevelPhase::TitleFadeOut { timer } => {
            timer.tick(dt);
            if !timer.is_finished() {
                return;
            }
            hooks.presentation.write(Presentation::HideUi(UiElement::LevelTitle(index)));
            LevelPhase::Spawning
        }
        LevelPhase::Spawning => {
            let Some(wave) = config.level(index) else {
                // Levels are only left through Idle, which checked this index.
                orchestrator.phase = LevelPhase::idle(0.0);
                return;
            };
            let plan = spawn_plan(wave, &config.catalog);
            session.begin_wave(plan.len() as u32);

            let mut has_boss = false;
            for archetype in plan.iter().cloned() {
                let pos = match &archetype {
                    // Inset so the strict containment test can end `Entering`.
                    Archetype::Enemy(_) => Vec2::new(
                        rng.spread(bounds.half_width - WAYPOINT_INSET),
                        bounds.half_height + 1.0,
                    ),
                    Archetype::Boss(_) => {
                        has_boss = true;
                        boss::spawn_point(&bounds)
                    }
                };
                spawns.write(SpawnCombatant { archetype, pos });
            }

            info!("Level {index} started: {} combatants", plan.len());
            hooks.started.write(LevelStarted { index });
            if has_boss {
                info!("Boss encounter on level {index}");
                hooks.boss.write(BossEncounter { index });
            }

            if plan.is_empty() {
                let cleared = orchestrator.clear_wave(&mut session, tunables.wave_clear_delay);
                info!("Wave {cleared} cleared (empty)");
                hooks.cleared.write(WaveCleared { index: cleared });
                return;
            }
            LevelPhase::Active
        }
        LevelPhase::Active | LevelPhase::GameOver => return,
    };

    orchestrator.phase = next;
}
