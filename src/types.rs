// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a sparse retrieval index.
//!
//! A sparse vector is a pair of parallel slices: ascending unique `u32`
//! term ids and their `f32` weights. Documents are identified by their
//! 0-based ordinal position in the input collection.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **SparseVector**: `components` strictly ascending (hence unique) and
//!   `components.len() == values.len()`. The merge-based dot product relies
//!   on the ordering; duplicate terms would double-count.
//! - **ScoredHit** ordering: descending score, ties broken by ascending
//!   doc_id. Every ranked sequence in the crate uses this order.

use serde::{Deserialize, Serialize};

/// Term (dimension) identifier. The vocabulary is dense enough in practice
/// that posting lists are addressed by term_id directly.
pub type TermId = u32;

/// Document identifier: 0-based ordinal in the input collection.
pub type DocId = usize;

/// Queries with fewer distinct terms than this are scored with the
/// merge-based dot product; longer queries densify once and use the
/// dense-accumulator path.
pub const DENSE_QUERY_THRESHOLD: usize = 10;

/// An owned sparse vector with ascending unique term ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    components: Vec<TermId>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Build from unsorted (term_id, weight) pairs, canonicalizing to
    /// ascending term_id order. Returns `None` if a term_id repeats.
    pub fn from_pairs(pairs: &[(TermId, f32)]) -> Option<Self> {
        let mut sorted: Vec<(TermId, f32)> = pairs.to_vec();
        sorted.sort_unstable_by_key(|&(c, _)| c);
        for window in sorted.windows(2) {
            if window[0].0 == window[1].0 {
                return None;
            }
        }
        let (components, values) = sorted.into_iter().unzip();
        Some(Self { components, values })
    }

    /// Number of non-zero components.
    pub fn nnz(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[TermId] {
        &self.components
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Merge-based dot product of two ascending-sorted sparse vectors.
///
/// Linear in the combined length. Used for short queries where densifying
/// the query buys nothing.
#[inline]
pub fn dot_merge(
    a_components: &[TermId],
    a_values: &[f32],
    b_components: &[TermId],
    b_values: &[f32],
) -> f32 {
    let mut dot = 0.0f32;
    let mut i = 0;
    let mut j = 0;
    while i < a_components.len() && j < b_components.len() {
        match a_components[i].cmp(&b_components[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a_values[i] * b_values[j];
                i += 1;
                j += 1;
            }
        }
    }
    dot
}

/// Dot product of a densified query against a sparse vector.
///
/// `dense` must have length >= every component id in `components`.
#[inline]
pub fn dot_dense(dense: &[f32], components: &[TermId], values: &[f32]) -> f32 {
    components
        .iter()
        .zip(values)
        .map(|(&c, &v)| dense[c as usize] * v)
        .sum()
}

/// One ranked answer: a document and its dot-product score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredHit {
    pub score: f32,
    pub doc_id: DocId,
}

impl ScoredHit {
    /// Ranking order: descending score, ascending doc_id on equal scores.
    #[inline]
    pub fn rank_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(self.doc_id.cmp(&other.doc_id))
    }
}
