//! Deferred task queue
//!
//! Timestamped callbacks on the single logical game thread. Tasks are plain
//! values popped in deadline order; equal deadlines pop in scheduling order.
//! The session decides at fire time whether a task is still valid.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Pending<T> {
    due: f64,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .total_cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap of tasks keyed by absolute due time (seconds)
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Reverse<Pending<T>>>,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Run `task` at absolute time `due`
    pub fn schedule(&mut self, due: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Pending { due, seq, task }));
    }

    /// Pop the earliest task due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<(f64, T)> {
        match self.heap.peek() {
            Some(Reverse(next)) if next.due <= now => {}
            _ => return None,
        }
        self.heap.pop().map(|Reverse(p)| (p.due, p.task))
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(p)| p.due)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pending tasks matching `pred`
    pub fn count(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        self.heap.iter().filter(|Reverse(p)| pred(&p.task)).count()
    }

    /// Drop pending tasks for which `keep` is false
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.heap.retain(|Reverse(p)| keep(&p.task));
    }

    /// Deadlines of matching tasks, earliest first
    pub fn deadlines(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<f64> {
        let mut due: Vec<f64> = self
            .heap
            .iter()
            .filter(|Reverse(p)| pred(&p.task))
            .map(|Reverse(p)| p.due)
            .collect();
        due.sort_by(f64::total_cmp);
        due
    }
}
