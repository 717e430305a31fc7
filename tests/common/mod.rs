// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities and fixtures.

#![allow(dead_code)]

use strata::{
    dot_merge, BuildConfig, InvertedIndex, PruningStrategy, ScoredHit, SparseDataset,
    SparseDatasetMut, TermId,
};

// ============================================================================
// SYNTHETIC COLLECTIONS
// ============================================================================

/// Deterministic pseudo-random collection: `len` vectors over `dim` distinct
/// terms with up to `max_nnz` non-zeros each. Plain xorshift so fixtures stay
/// byte-identical across runs without touching the crate's RNG.
pub fn synthetic_dataset(len: usize, dim: u32, max_nnz: usize, seed: u64) -> SparseDataset {
    let mut state = seed.wrapping_mul(0x2545_F491_4F6C_DD1D) | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut builder = SparseDatasetMut::new();
    for _ in 0..len {
        let nnz = 1 + (next() as usize) % max_nnz;
        let mut pairs = std::collections::BTreeMap::new();
        while pairs.len() < nnz {
            let term = (next() % u64::from(dim)) as TermId;
            let weight = 0.05 + (next() % 1000) as f32 / 1000.0;
            pairs.entry(term).or_insert(weight);
        }
        let components: Vec<TermId> = pairs.keys().copied().collect();
        let values: Vec<f32> = pairs.values().copied().collect();
        assert!(builder.push(&components, &values));
    }
    builder.freeze()
}

/// Build configuration with every approximation disabled: unbounded pruning
/// budget and full-energy summaries. With `heap_factor = 0.0` and a generous
/// `query_cut`, searches against this index are exact.
pub fn exact_config() -> BuildConfig {
    BuildConfig::default().pruning_strategy(PruningStrategy::FixedSize {
        n_postings: usize::MAX,
    })
}

pub fn build_exact_index(dataset: SparseDataset) -> InvertedIndex {
    InvertedIndex::build(dataset, exact_config()).expect("index build failed")
}

// ============================================================================
// BRUTE-FORCE ORACLE
// ============================================================================

/// Score every document against the query and keep the k best. Documents
/// sharing no term with the query are omitted, matching what an inverted
/// index can ever surface.
pub fn exhaustive_topk(
    dataset: &SparseDataset,
    query_components: &[TermId],
    query_values: &[f32],
    k: usize,
) -> Vec<ScoredHit> {
    let mut hits: Vec<ScoredHit> = dataset
        .iter()
        .enumerate()
        .filter_map(|(doc_id, (components, values))| {
            let score = dot_merge(query_components, query_values, components, values);
            (score > 0.0).then_some(ScoredHit { score, doc_id })
        })
        .collect();
    hits.sort_by(ScoredHit::rank_cmp);
    hits.truncate(k);
    hits
}
