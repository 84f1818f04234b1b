use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::events::ProcessId;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Waiter {
    priority: u8,
    seq: u64,
    pid: ProcessId,
}

impl Ord for Waiter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Waiter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Outcome of a unit request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Grant {
    Immediate,
    Queued,
}

/// Pool of interchangeable dispatch units.
///
/// Requests are granted while spare capacity remains. Otherwise the caller is
/// parked and handed the next freed unit, lowest priority value first, ties
/// broken by request order. Grants are never preempted, and `busy` can never
/// exceed `capacity`.
pub struct UnitPool {
    capacity: usize,
    busy: usize,
    next_seq: u64,
    waiting: BinaryHeap<Reverse<Waiter>>,
}

impl UnitPool {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "capacity is validated before pool creation");
        Self {
            capacity,
            busy: 0,
            next_seq: 0,
            waiting: BinaryHeap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn busy(&self) -> usize {
        self.busy
    }

    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    pub fn request(&mut self, pid: ProcessId, priority: u8) -> Grant {
        if self.busy < self.capacity {
            self.busy += 1;
            Grant::Immediate
        } else {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.waiting.push(Reverse(Waiter { priority, seq, pid }));
            Grant::Queued
        }
    }

    /// Frees one unit and, if anyone is waiting, hands it straight to the
    /// best-ranked waiter. Returns the process to resume, if any.
    pub fn release(&mut self) -> Option<ProcessId> {
        debug_assert!(self.busy > 0, "release without a matching grant");
        self.busy -= 1;
        if let Some(Reverse(waiter)) = self.waiting.pop() {
            self.busy += 1;
            Some(waiter.pid)
        } else {
            None
        }
    }
}
