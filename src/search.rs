// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query execution: heap-bounded scoring with block-level pruning.
//!
//! A query walks its highest-weight terms' posting lists. For each list the
//! block summaries are scored against the query and the blocks visited in
//! descending summary order; once the heap holds k candidates, a block
//! whose summary score falls below `heap_factor * heap_min` cannot improve
//! the result and is skipped — and since the remaining blocks score even
//! lower, the whole rest of the list is skipped with it.
//!
//! Visited documents get one full dot product against the query, never a
//! partial one, so reported scores are exact even though the candidate set
//! is approximate. Short queries use the merge-based dot product; longer
//! ones densify the query once and use the dense accumulator
//! ([`DENSE_QUERY_THRESHOLD`]).

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::index::{InvertedIndex, PostingList};
use crate::topk::TopKHeap;
use crate::types::{
    dot_dense, dot_merge, DocId, ScoredHit, TermId, DENSE_QUERY_THRESHOLD,
};

/// The query as seen by the executor: parallel component/value slices plus
/// an optional densified copy for the dense dot-product path.
struct QueryVector<'a> {
    components: &'a [TermId],
    values: &'a [f32],
    dense: Option<Vec<f32>>,
}

impl<'a> QueryVector<'a> {
    fn new(components: &'a [TermId], values: &'a [f32], dim: usize) -> Self {
        let dense = if components.len() >= DENSE_QUERY_THRESHOLD {
            let mut buffer = vec![0.0f32; dim];
            for (&c, &v) in components.iter().zip(values) {
                if (c as usize) < dim {
                    buffer[c as usize] = v;
                }
            }
            Some(buffer)
        } else {
            None
        };
        Self {
            components,
            values,
            dense,
        }
    }

    #[inline]
    fn dot(&self, components: &[TermId], values: &[f32]) -> f32 {
        match &self.dense {
            Some(dense) => dot_dense(dense, components, values),
            None => dot_merge(self.components, self.values, components, values),
        }
    }
}

impl InvertedIndex {
    /// Approximate top-k search for one query.
    ///
    /// `query_cut` bounds how many of the query's highest-weight terms are
    /// probed (clamped to the number of distinct terms; 0 probes nothing).
    /// `heap_factor` scales the heap minimum in the block-skip test:
    /// `0.0` disables pruning, `1.0` prunes exactly against the bound,
    /// larger values prune more aggressively at a recall cost.
    ///
    /// Returns up to k hits, descending score, ascending doc_id on ties.
    pub fn search(
        &self,
        query_components: &[TermId],
        query_values: &[f32],
        k: usize,
        query_cut: usize,
        heap_factor: f32,
    ) -> Result<Vec<ScoredHit>> {
        if k == 0 {
            return Err(Error::InvalidK);
        }
        if !heap_factor.is_finite() || heap_factor < 0.0 {
            return Err(Error::InvalidHeapFactor { value: heap_factor });
        }
        debug_assert_eq!(query_components.len(), query_values.len());
        // Queries loaded through SparseDataset are canonical; raw slices
        // must come pre-sorted for the merge-based dot product.
        debug_assert!(query_components.windows(2).all(|w| w[0] < w[1]));
        if query_components.is_empty() {
            return Ok(Vec::new());
        }

        let query = QueryVector::new(query_components, query_values, self.dim());
        let mut heap = TopKHeap::new(k);
        let mut visited: HashSet<DocId> = HashSet::new();

        // Probe the strongest query terms first; weak terms contribute
        // least to any score and are the first to drop under query_cut.
        let mut term_order: Vec<usize> = (0..query_components.len()).collect();
        term_order.sort_unstable_by(|&a, &b| {
            query_values[b]
                .total_cmp(&query_values[a])
                .then(query_components[a].cmp(&query_components[b]))
        });

        for &slot in term_order.iter().take(query_cut.min(term_order.len())) {
            if let Some(posting_list) = self.posting_list(query_components[slot]) {
                self.search_posting_list(
                    posting_list,
                    &query,
                    heap_factor,
                    &mut heap,
                    &mut visited,
                );
            }
        }

        Ok(heap.into_sorted_hits())
    }

    /// Visit one term's blocks in descending summary-score order, skipping
    /// (and then abandoning the list) once no block can beat the heap.
    fn search_posting_list(
        &self,
        posting_list: &PostingList,
        query: &QueryVector<'_>,
        heap_factor: f32,
        heap: &mut TopKHeap,
        visited: &mut HashSet<DocId>,
    ) {
        let num_blocks = posting_list.num_blocks();
        let mut block_order: Vec<(f32, usize)> = (0..num_blocks)
            .map(|block| {
                let (components, values) = posting_list.summary(block);
                (query.dot(components, values), block)
            })
            .collect();
        block_order.sort_unstable_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        for (summary_dot, block) in block_order {
            if heap.is_full() && summary_dot < heap_factor * heap.min_score() {
                // Blocks are in descending summary order: nothing after
                // this one can pass the test either.
                break;
            }

            for &doc_id in posting_list.block(block) {
                if visited.insert(doc_id) {
                    let (components, values) = self.forward().get(doc_id);
                    heap.push(query.dot(components, values), doc_id);
                }
            }
        }
    }
}
