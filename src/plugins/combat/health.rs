//! Health model shared by the player, enemies and the boss.
//!
//! ```text
//! Vulnerable ──hurt──► Invincible { timer } ──end_invincibility(timer)──► Vulnerable
//!     │                      │
//!     └──── hp reaches 0 ────┴──► Dying ──finish_dying──► Dead
//! ```
//!
//! `Dying` and `Dead` are terminal for gameplay: every damage path returns
//! `Ignored`, so duplicate collision callbacks cannot kill twice.

use bevy::prelude::*;

use crate::common::scheduler::TaskHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Vulnerable,
    /// Hit flash. `timer` identifies the window so a stale expiry cannot
    /// end a newer one.
    Invincible { timer: TaskHandle },
    Dying,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoDamage,
    Invincible,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Ignored(IgnoreReason),
    /// Survived; the caller must open an invincibility window.
    Hurt { hp: u32 },
    /// This call performed the death transition.
    Killed,
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    hp: u32,
    max: u32,
    life: LifeState,
}

impl Health {
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self { hp: max, max, life: LifeState::Vulnerable }
    }

    #[inline]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn life(&self) -> LifeState {
        self.life
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        matches!(self.life, LifeState::Vulnerable | LifeState::Invincible { .. })
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        matches!(self.life, LifeState::Invincible { .. })
    }

    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        match self.life {
            LifeState::Dying | LifeState::Dead => return DamageOutcome::Ignored(IgnoreReason::Dead),
            LifeState::Invincible { .. } => {
                return DamageOutcome::Ignored(IgnoreReason::Invincible);
            }
            LifeState::Vulnerable => {}
        }
        if amount == 0 {
            return DamageOutcome::Ignored(IgnoreReason::NoDamage);
        }

        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.life = LifeState::Dying;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt { hp: self.hp }
        }
    }

    /// Contact kill: ignores the hit flash, not death idempotence.
    pub fn kill(&mut self) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored(IgnoreReason::Dead);
        }
        self.hp = 0;
        self.life = LifeState::Dying;
        DamageOutcome::Killed
    }

    /// Only a vulnerable combatant can start a window.
    pub fn begin_invincibility(&mut self, timer: TaskHandle) -> bool {
        if self.life != LifeState::Vulnerable {
            return false;
        }
        self.life = LifeState::Invincible { timer };
        true
    }

    /// Clears the window opened with `timer`; anything else is left alone.
    pub fn end_invincibility(&mut self, timer: TaskHandle) -> bool {
        if self.life != (LifeState::Invincible { timer }) {
            return false;
        }
        self.life = LifeState::Vulnerable;
        true
    }

    pub fn finish_dying(&mut self) -> bool {
        if self.life != LifeState::Dying {
            return false;
        }
        self.life = LifeState::Dead;
        true
    }
}
