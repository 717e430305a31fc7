// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded top-k selection.
//!
//! An array-backed binary heap of fixed capacity k, holding the best k
//! candidates seen so far with the *worst* of them at the root. Capacity is
//! known up front and never grows, so this beats a general-purpose priority
//! queue: pushes on a full heap that cannot improve the result are a single
//! comparison against the root.
//!
//! Ordering is the crate's ranking order — higher score wins, ascending
//! doc_id on equal scores — so evicting "the worst" agrees exactly with the
//! final result ordering.

use crate::types::{DocId, ScoredHit};

/// Fixed-capacity top-k heap.
#[derive(Debug, Clone)]
pub struct TopKHeap {
    capacity: usize,
    entries: Vec<ScoredHit>,
}

/// `a` outranks `b` in the final result ordering.
#[inline]
fn beats(a: &ScoredHit, b: &ScoredHit) -> bool {
    a.rank_cmp(b) == std::cmp::Ordering::Less
}

impl TopKHeap {
    /// `capacity` is k; callers validate k >= 1 before building a heap.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Score of the worst kept candidate. Only meaningful once the heap is
    /// full — pruning decisions gate on [`Self::is_full`] first.
    #[inline]
    pub fn min_score(&self) -> f32 {
        debug_assert!(!self.entries.is_empty());
        self.entries[0].score
    }

    /// Offer a candidate. On a full heap the root is replaced only when the
    /// candidate outranks it.
    pub fn push(&mut self, score: f32, doc_id: DocId) {
        let hit = ScoredHit { score, doc_id };
        if self.entries.len() < self.capacity {
            self.entries.push(hit);
            self.sift_up(self.entries.len() - 1);
        } else if beats(&hit, &self.entries[0]) {
            self.entries[0] = hit;
            self.sift_down(0);
        }
    }

    /// Drain into the final ranking: descending score, ascending doc_id on
    /// equal scores.
    pub fn into_sorted_hits(mut self) -> Vec<ScoredHit> {
        self.entries.sort_by(ScoredHit::rank_cmp);
        self.entries
    }

    // Heap invariant: every parent is outranked by (or equal to) each of
    // its children; the root is the worst kept candidate.

    fn sift_up(&mut self, mut node: usize) {
        while node > 0 {
            let parent = (node - 1) / 2;
            if beats(&self.entries[parent], &self.entries[node]) {
                self.entries.swap(parent, node);
                node = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut node: usize) {
        loop {
            let left = 2 * node + 1;
            if left >= self.entries.len() {
                break;
            }
            let right = left + 1;
            let mut worst = left;
            if right < self.entries.len() && beats(&self.entries[left], &self.entries[right]) {
                worst = right;
            }
            if beats(&self.entries[node], &self.entries[worst]) {
                self.entries.swap(node, worst);
                node = worst;
            } else {
                break;
            }
        }
    }
}
