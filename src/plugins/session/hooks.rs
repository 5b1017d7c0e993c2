//! Notifications exposed to collaborators (UI, audio, scene flow).
//!
//! All of these are fire-and-forget: the simulation never waits on, or reads
//! back from, whoever consumes them.

use bevy::ecs::message::Messages;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Every configured level was cleared.
    Victory,
    /// The player died.
    Defeat,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStarted {
    pub index: usize,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossEncounter {
    pub index: usize,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveCleared {
    pub index: usize,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub outcome: GameOutcome,
}

/// End-of-level hand-off after the boss death sequence.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutSceneTriggered {
    pub level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiElement {
    LevelTitle(usize),
    GameOverPanel,
    VictoryPanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeGroup {
    LevelTitle,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub enum Presentation {
    PlaySound(String),
    ShowUi(UiElement),
    HideUi(UiElement),
    Fade { group: FadeGroup, from: f32, to: f32, duration: f32 },
    LoadScene(String),
    LivesChanged(u32),
    ScoreChanged(u32),
}

impl Presentation {
    /// Build a sound notification from an optional clip id.
    /// A missing clip is not an error: the side effect is skipped.
    #[inline]
    pub fn sound(clip: Option<&String>) -> Option<Self> {
        clip.map(|c| Self::PlaySound(c.clone()))
    }
}

pub fn register(app: &mut App) {
    app.add_message::<LevelStarted>()
        .add_message::<BossEncounter>()
        .add_message::<WaveCleared>()
        .add_message::<GameOver>()
        .add_message::<CutSceneTriggered>()
        .add_message::<Presentation>();
}

/// Same buffers as `register`, for bare `World` tests.
pub fn init_messages_in_world(world: &mut World) {
    world.init_resource::<Messages<LevelStarted>>();
    world.init_resource::<Messages<BossEncounter>>();
    world.init_resource::<Messages<WaveCleared>>();
    world.init_resource::<Messages<GameOver>>();
    world.init_resource::<Messages<CutSceneTriggered>>();
    world.init_resource::<Messages<Presentation>>();
}
