//! Priority queue for BPE merge candidates.
//!
//! During encoding every adjacent symbol pair whose concatenation is a known
//! piece becomes a candidate. Candidates are popped lowest rank first, ties
//! broken by leftmost position. Entries are never removed eagerly: a merge
//! may invalidate candidates that are still in the heap, and those are
//! skipped lazily when popped.

use dary_heap::OctonaryHeap;
use std::cmp::Ordering;

/// A possible merge of two adjacent symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeCandidate {
    /// Rank of the merged piece
    pub rank: u32,
    /// Index of the left symbol
    pub left: usize,
    /// Index of the right symbol
    pub right: usize,
    /// End offset of the right symbol when the candidate was pushed
    pub right_end: usize,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(rank: u32, left: usize, right: usize, right_end: usize) -> Self {
        Self {
            rank,
            left,
            right,
            right_end,
        }
    }
}

// The heap is a max-heap: lower rank (then lower position) must compare greater.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.left.cmp(&other.left))
            .reverse()
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-rank priority queue over merge candidates.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
#[derive(Debug, Default)]
pub struct MergeQueue {
    heap: OctonaryHeap<MergeCandidate>,
}

impl MergeQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self {
            heap: OctonaryHeap::new(),
        }
    }

    /// Create a new queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
        }
    }

    /// Push a merge candidate onto the queue.
    pub fn push(&mut self, candidate: MergeCandidate) {
        self.heap.push(candidate);
    }

    /// Pop the lowest-rank candidate, stale or not.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        self.heap.pop()
    }

    /// Pop the lowest-rank candidate that `is_live` accepts.
    ///
    /// Rejected candidates are discarded.
    pub fn pop_live<F>(&mut self, mut is_live: F) -> Option<MergeCandidate>
    where
        F: FnMut(&MergeCandidate) -> bool,
    {
        while let Some(candidate) = self.heap.pop() {
            if is_live(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// Peek at the lowest-rank candidate without removing it.
    pub fn peek(&self) -> Option<&MergeCandidate> {
        self.heap.peek()
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Clear all entries from the queue.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_rank_first() {
        let mut queue = MergeQueue::new();

        queue.push(MergeCandidate::new(10, 0, 1, 2));
        queue.push(MergeCandidate::new(2, 1, 2, 3));
        queue.push(MergeCandidate::new(5, 2, 3, 4));

        assert_eq!(queue.pop().unwrap().rank, 2);
        assert_eq!(queue.pop().unwrap().rank, 5);
        assert_eq!(queue.pop().unwrap().rank, 10);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_equal_rank_leftmost_first() {
        let mut queue = MergeQueue::new();

        queue.push(MergeCandidate::new(3, 4, 5, 6));
        queue.push(MergeCandidate::new(3, 0, 1, 2));
        queue.push(MergeCandidate::new(3, 2, 3, 4));

        assert_eq!(queue.pop().unwrap().left, 0);
        assert_eq!(queue.pop().unwrap().left, 2);
        assert_eq!(queue.pop().unwrap().left, 4);
    }

    #[test]
    fn test_pop_live_skips_stale() {
        let mut queue = MergeQueue::new();

        queue.push(MergeCandidate::new(0, 0, 1, 2));
        queue.push(MergeCandidate::new(1, 1, 2, 3));
        queue.push(MergeCandidate::new(2, 2, 3, 4));

        // Pretend symbol 1 was absorbed: every candidate touching it is stale
        let live = queue.pop_live(|c| c.left != 1 && c.right != 1);
        assert_eq!(live, Some(MergeCandidate::new(2, 2, 3, 4)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut queue = MergeQueue::with_capacity(4);

        queue.push(MergeCandidate::new(0, 0, 1, 2));
        queue.push(MergeCandidate::new(1, 1, 2, 3));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek().map(|c| c.rank), Some(0));

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }
}
