//! Global state machine.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
    /// Terminal for the current session. The world stays visible but frozen;
    /// leaving this state (restart) clears every session-scoped entity.
    GameOver,
}
