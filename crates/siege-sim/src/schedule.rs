//! Deferred weapon actions (burst follow-ups, plasma release).
//!
//! Ordered by due tick, then by insertion, so equal-tick actions resolve in
//! the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hecs::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Follow-up shot of a rapid-fire burst.
    BurstShot { shooter: Entity },
    /// Charged plasma bolt leaving the barrel.
    PlasmaRelease { shooter: Entity },
}

impl ScheduledAction {
    pub fn shooter(&self) -> Entity {
        match *self {
            ScheduledAction::BurstShot { shooter } | ScheduledAction::PlasmaRelease { shooter } => {
                shooter
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due_tick: u64,
    seq: u64,
    action: ScheduledAction,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_tick == other.due_tick && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due_tick, other.seq).cmp(&(self.due_tick, self.seq))
    }
}

#[derive(Debug, Default)]
pub struct ActionQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_tick: u64, action: ScheduledAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due_tick,
            seq,
            action,
        });
    }

    /// Pop every action due at or before `tick`, earliest first.
    pub fn drain_due(&mut self, tick: u64) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|entry| entry.due_tick <= tick) {
            if let Some(entry) = self.heap.pop() {
                due.push(entry.action);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
