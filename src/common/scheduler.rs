//! Cancellable timer queue.
//!
//! Every "wait N seconds, then do X" in the simulation is one entry here.
//! Entries are owned by an entity; despawning the entity cancels them, so a
//! fired task never refers to a removed entity.
//!
//! ```text
//! schedule_after(now, delay, owner, action) ──► heap (at, seq)
//!                                                  │
//!   FixedUpdate: drain_due(now) ──► TimerElapsed messages ──► domain handlers
//!   PostUpdate:  cancel_owner(despawned entity)
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// What to do when a task comes due. The owner entity is the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    EndInvincibility,
    /// Post-death delay elapsed: remove the entity.
    Despawn,
    /// One shot of a boss volley, fired from mount `mount`.
    VolleyShot { mount: usize },
    /// Boss death sequence finished: tell the orchestrator.
    BossDefeatNotice,
    DropBlink,
    DropExpire,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    at: f64,
    seq: u64,
    owner: Entity,
    action: TimedAction,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap, we want the earliest entry on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A task that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub handle: TaskHandle,
    pub owner: Entity,
    pub action: TimedAction,
}

/// Published once per due task.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerElapsed {
    pub handle: TaskHandle,
    pub owner: Entity,
    pub action: TimedAction,
}

impl From<Due> for TimerElapsed {
    fn from(d: Due) -> Self {
        Self { handle: d.handle, owner: d.owner, action: d.action }
    }
}

#[derive(Resource, Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn schedule_at(&mut self, at: f64, owner: Entity, action: TimedAction) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { at, seq, owner, action });
        TaskHandle(seq)
    }

    #[inline]
    pub fn schedule_after(
        &mut self,
        now: f64,
        delay: f32,
        owner: Entity,
        action: TimedAction,
    ) -> TaskHandle {
        self.schedule_at(now + f64::from(delay.max(0.0)), owner, action)
    }

    /// Drop every pending task owned by `owner`.
    pub fn cancel_owner(&mut self, owner: Entity) {
        self.queue.retain(|e| e.owner != owner);
    }

    /// Pop every task with `at <= now`, earliest first, ties in insertion order.
    pub fn drain_due(&mut self, now: f64) -> Vec<Due> {
        let mut out = Vec::new();
        while self.queue.peek().is_some_and(|e| e.at <= now) {
            let Some(e) = self.queue.pop() else { break };
            out.push(Due { handle: TaskHandle(e.seq), owner: e.owner, action: e.action });
        }
        out
    }

    pub fn pending_for(&self, owner: Entity) -> usize {
        self.queue.iter().filter(|e| e.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
