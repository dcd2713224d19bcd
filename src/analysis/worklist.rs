//! A work-list of unique items, owned by a single analysis run.

use fxhash::FxHashSet;
use std::collections::VecDeque;
use std::hash::Hash;

/// A double-ended queue in which each item appears at most once.
/// Pushing an item that is already queued does nothing.
#[derive(Clone, Debug)]
pub struct Worklist<T: Copy + Eq + Hash> {
    queue: VecDeque<T>,
    queued: FxHashSet<T>,
}

impl<T: Copy + Eq + Hash> Default for Worklist<T> {
    fn default() -> Self {
        Worklist {
            queue: VecDeque::new(),
            queued: FxHashSet::default(),
        }
    }
}

impl<T: Copy + Eq + Hash> Worklist<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Worklist {
            queue: VecDeque::with_capacity(capacity),
            queued: FxHashSet::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn push_head(&mut self, item: T) {
        if self.queued.insert(item) {
            self.queue.push_front(item);
        }
    }

    pub fn push_tail(&mut self, item: T) {
        if self.queued.insert(item) {
            self.queue.push_back(item);
        }
    }

    pub fn pop_head(&mut self) -> Option<T> {
        let item = self.queue.pop_front()?;
        let was_queued = self.queued.remove(&item);
        debug_assert!(was_queued);
        Some(item)
    }

    pub fn pop_tail(&mut self) -> Option<T> {
        let item = self.queue.pop_back()?;
        let was_queued = self.queued.remove(&item);
        debug_assert!(was_queued);
        Some(item)
    }

    pub fn peek_head(&self) -> Option<T> {
        self.queue.front().copied()
    }

    pub fn peek_tail(&self) -> Option<T> {
        self.queue.back().copied()
    }

    pub fn contains(&self, item: T) -> bool {
        self.queued.contains(&item)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
