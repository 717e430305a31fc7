// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Batch search across a fixed-size worker pool.
//!
//! Queries are embarrassingly parallel: each one owns its heap and visited
//! set, and the index is immutable, so workers share it without locks. The
//! driver builds a dedicated rayon pool of exactly `num_threads` workers
//! and maps queries to outcomes by input position — output order follows
//! input order, never completion order.
//!
//! A per-query failure (k = 0, bad heap factor) occupies that query's slot
//! in the output and leaves its siblings untouched; only an invalid thread
//! count fails the whole batch.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::dataset::SparseDataset;
use crate::error::{Error, Result};
use crate::index::InvertedIndex;
use crate::types::ScoredHit;

/// One query's outcome inside a batch.
pub type QueryOutcome = Result<Vec<ScoredHit>>;

/// Run every query in `queries` against `index` on `num_threads` workers.
///
/// `outcomes[i]` belongs to `queries.get(i)` for every thread count, and
/// `num_threads = 1` yields exactly the same outcomes as `num_threads = N`.
#[cfg(feature = "parallel")]
pub fn batch_search(
    index: &InvertedIndex,
    queries: &SparseDataset,
    k: usize,
    query_cut: usize,
    heap_factor: f32,
    num_threads: usize,
) -> Result<Vec<QueryOutcome>> {
    if num_threads == 0 {
        return Err(Error::InvalidThreads { requested: 0 });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|_| Error::InvalidThreads {
            requested: num_threads,
        })?;

    Ok(pool.install(|| {
        (0..queries.len())
            .into_par_iter()
            .map(|query_id| {
                let (components, values) = queries.get(query_id);
                index.search(components, values, k, query_cut, heap_factor)
            })
            .collect()
    }))
}

/// Sequential fallback with identical semantics.
#[cfg(not(feature = "parallel"))]
pub fn batch_search(
    index: &InvertedIndex,
    queries: &SparseDataset,
    k: usize,
    query_cut: usize,
    heap_factor: f32,
    num_threads: usize,
) -> Result<Vec<QueryOutcome>> {
    if num_threads == 0 {
        return Err(Error::InvalidThreads { requested: 0 });
    }

    Ok((0..queries.len())
        .map(|query_id| {
            let (components, values) = queries.get(query_id);
            index.search(components, values, k, query_cut, heap_factor)
        })
        .collect())
}
