//! Deferred actions keyed by simulation time
//!
//! Multi-shot supers, leap landings, round resets and the victory banner all
//! need something to happen "a bit later". They go through this queue and
//! are drained by the tick itself, so ordering stays single-threaded and
//! reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec2;

use super::entity::{ShotSpec, ThrowSpec};

/// Something that happens at a future time
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledAction {
    /// Fire one direct shot for `shooter` along `angle`
    Shot {
        shooter: u32,
        angle: f32,
        spec: ShotSpec,
    },
    /// Launch one lobbed projectile for `shooter`
    Throw { shooter: u32, spec: ThrowSpec },
    /// Finish a leap at `target`
    LeapLanding { character: u32, target: Vec2 },
    /// Knockout: start the next round
    ResetRound,
    /// End the match with the player at `rank`
    EndMatch { rank: u32 },
}

#[derive(Debug, Clone)]
struct Pending {
    due: f32,
    seq: u64,
    action: ScheduledAction,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest (then oldest) entry
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of pending actions
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Pending>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: f32, action: ScheduledAction) {
        self.seq += 1;
        self.queue.push(Pending {
            due,
            seq: self.seq,
            action,
        });
    }

    /// Pop the earliest action due at or before `now`
    pub fn pop_due(&mut self, now: f32) -> Option<ScheduledAction> {
        if self.queue.peek().is_some_and(|p| p.due <= now) {
            self.queue.pop().map(|p| p.action)
        } else {
            None
        }
    }

    pub fn contains(&self, pred: impl Fn(&ScheduledAction) -> bool) -> bool {
        self.queue.iter().any(|p| pred(&p.action))
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
