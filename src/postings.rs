// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Posting distribution and build-time pruning.
//!
//! One pass over the collection turns the forward store into per-term
//! posting lists of (weight, doc_id) pairs. Pruning then bounds each list
//! before clustering — the recall/memory knob of the whole index. Pruned
//! lists are left sorted by descending weight so the clusterer sees the
//! strongest postings first.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::dataset::SparseDataset;
use crate::types::DocId;

/// A raw posting: the document's weight for the term, and the document.
pub type Posting = (f32, DocId);

/// Distribute every (term, weight) entry to its term's posting list.
///
/// Single pass, no ranking. The result is indexed by term_id and has
/// exactly `dataset.dim()` lists (possibly empty ones for unused terms).
pub fn distribute(dataset: &SparseDataset) -> Vec<Vec<Posting>> {
    let mut posting_lists: Vec<Vec<Posting>> = vec![Vec::new(); dataset.dim()];
    for (doc_id, (components, values)) in dataset.iter().enumerate() {
        for (&c, &weight) in components.iter().zip(values) {
            posting_lists[c as usize].push((weight, doc_id));
        }
    }
    posting_lists
}

/// How posting lists are bounded before clustering.
///
/// - `FixedSize`: every list keeps its top-`n_postings` entries by weight.
/// - `GlobalThreshold`: one global weight threshold chosen so that lists
///   keep `n_postings` entries on average, with a per-list cap of
///   `n_postings * max_fraction` so no single list balloons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PruningStrategy {
    FixedSize {
        n_postings: usize,
    },
    GlobalThreshold {
        n_postings: usize,
        max_fraction: f32,
    },
}

impl Default for PruningStrategy {
    fn default() -> Self {
        Self::FixedSize { n_postings: 3500 }
    }
}

impl PruningStrategy {
    /// Apply the strategy in place. Every surviving list ends up sorted by
    /// descending weight (ascending doc_id on equal weights, so builds are
    /// deterministic).
    pub fn apply(&self, posting_lists: &mut [Vec<Posting>]) {
        match *self {
            PruningStrategy::FixedSize { n_postings } => {
                prune_fixed(posting_lists, n_postings);
            }
            PruningStrategy::GlobalThreshold {
                n_postings,
                max_fraction,
            } => {
                prune_global_threshold(posting_lists, n_postings);
                let cap = (n_postings as f32 * max_fraction) as usize;
                prune_fixed(posting_lists, cap);
            }
        }
    }
}

/// Descending weight, ascending doc_id on ties.
#[inline]
fn posting_rank(a: &Posting, b: &Posting) -> std::cmp::Ordering {
    b.0.total_cmp(&a.0).then(a.1.cmp(&b.1))
}

/// Keep the top-`n_postings` of each list independently.
fn prune_fixed(posting_lists: &mut [Vec<Posting>], n_postings: usize) {
    let prune_one = |posting_list: &mut Vec<Posting>| {
        posting_list.sort_unstable_by(posting_rank);
        posting_list.truncate(n_postings);
        posting_list.shrink_to_fit();
    };

    #[cfg(feature = "parallel")]
    posting_lists.par_iter_mut().for_each(prune_one);

    #[cfg(not(feature = "parallel"))]
    posting_lists.iter_mut().for_each(prune_one);
}

/// Keep the globally strongest `lists * n_postings` postings, wherever they
/// live. Lists holding many strong postings keep more than `n_postings`;
/// weak lists may be emptied entirely.
fn prune_global_threshold(posting_lists: &mut [Vec<Posting>], n_postings: usize) {
    let budget = posting_lists.len() * n_postings;

    let mut all: Vec<(f32, DocId, usize)> = Vec::new();
    for (term, posting_list) in posting_lists.iter_mut().enumerate() {
        for &(weight, doc_id) in posting_list.iter() {
            all.push((weight, doc_id, term));
        }
        posting_list.clear();
    }

    if all.len() > budget {
        all.select_nth_unstable_by(budget, |a, b| {
            b.0.total_cmp(&a.0).then(a.1.cmp(&b.1))
        });
        all.truncate(budget);
    }

    for (weight, doc_id, term) in all {
        posting_lists[term].push((weight, doc_id));
    }
}
