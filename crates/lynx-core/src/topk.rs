//! Bounded top-k selection over a scored id stream.
//!
//! Both index types feed `(id, distance)` pairs through a [`TopKSelector`]
//! while scanning, so selection stays `O(n log k)` instead of sorting the
//! full candidate set.

use crate::index::SearchResult;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Heap entry ordered so that the *worst* candidate sits on top.
///
/// Ordering is by distance first (`f64::total_cmp`), then by id, which
/// gives deterministic tie-breaking: on equal distances the larger id is
/// the one evicted, so the surviving set prefers smaller ids.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    distance: f64,
    id: u64,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Capacity-bounded max-heap keeping the k smallest `(distance, id)` pairs.
pub struct TopKSelector {
    heap: BinaryHeap<HeapEntry>,
    capacity: usize,
}

impl TopKSelector {
    /// Creates a selector that retains at most `k` candidates.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k + 1),
            capacity: k,
        }
    }

    /// Offers a candidate to the selector.
    ///
    /// While fewer than k candidates are held the entry is always kept;
    /// afterwards it replaces the current worst only if it beats it.
    pub fn push(&mut self, id: u64, distance: f64) {
        if self.capacity == 0 {
            return;
        }

        let entry = HeapEntry { distance, id };
        if self.heap.len() < self.capacity {
            self.heap.push(entry);
        } else if let Some(top) = self.heap.peek() {
            if entry < *top {
                self.heap.pop();
                self.heap.push(entry);
            }
        }
    }

    /// Number of candidates currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true when no candidate has been kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drains the selector into results sorted ascending by distance,
    /// ties broken by ascending id.
    #[must_use]
    pub fn into_sorted(self) -> Vec<SearchResult> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|entry| SearchResult {
                id: entry.id,
                distance: entry.distance,
            })
            .collect()
    }
}
