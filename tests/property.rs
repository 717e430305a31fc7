// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests using proptest.
//!
//! Random collections and queries check the invariants that hand-picked
//! fixtures cannot: exactness when every approximation is disabled, score
//! truthfulness when they are not, and batch/order determinism.

mod common;

use common::{build_exact_index, exhaustive_topk};
use proptest::prelude::*;
use strata::{batch_search, dot_merge, ScoredHit, SparseDataset, SparseDatasetMut, TermId};

// ============================================================================
// STRATEGIES
// ============================================================================

/// One sparse vector over a small vocabulary. The BTreeMap guarantees
/// sorted, duplicate-free components; nnz stays below the dense-path
/// threshold so the oracle and the engine accumulate in the same order.
fn vector_strategy() -> impl Strategy<Value = (Vec<TermId>, Vec<f32>)> {
    prop::collection::btree_map(0u32..50, 0.01f32..2.0, 1..8).prop_map(|pairs| {
        let components: Vec<TermId> = pairs.keys().copied().collect();
        let values: Vec<f32> = pairs.values().copied().collect();
        (components, values)
    })
}

fn dataset_strategy() -> impl Strategy<Value = SparseDataset> {
    prop::collection::vec(vector_strategy(), 1..25).prop_map(|vectors| {
        let mut builder = SparseDatasetMut::new();
        for (components, values) in &vectors {
            builder.push(components, values);
        }
        builder.freeze()
    })
}

fn query_strategy() -> impl Strategy<Value = (Vec<TermId>, Vec<f32>)> {
    vector_strategy()
}

// ============================================================================
// EXACTNESS
// ============================================================================

proptest! {
    /// With unbounded pruning, full-energy summaries, heap_factor 0.0 and a
    /// query_cut covering every term, search is brute force in disguise.
    #[test]
    fn prop_exact_settings_match_brute_force(
        dataset in dataset_strategy(),
        (query_components, query_values) in query_strategy(),
        k in 1usize..15,
    ) {
        let index = build_exact_index(dataset.clone());
        let hits = index
            .search(&query_components, &query_values, k, query_components.len(), 0.0)
            .unwrap();
        let expected = exhaustive_topk(&dataset, &query_components, &query_values, k);
        prop_assert_eq!(hits, expected);
    }

    /// The bound that makes block skipping sound: with max-envelope
    /// summaries at full energy, every block summary of the built index
    /// dominates every member document of that block, against any query.
    /// Walks the real `PostingList` blocks that k-means blocking produced,
    /// not a hand-assembled one.
    #[test]
    fn prop_max_envelope_summaries_dominate_every_member(
        dataset in dataset_strategy(),
        (query_components, query_values) in query_strategy(),
    ) {
        let index = build_exact_index(dataset.clone());

        for term_id in 0..index.dim() as u32 {
            let Some(posting_list) = index.posting_list(term_id) else {
                continue;
            };
            for block in 0..posting_list.num_blocks() {
                let (components, values) = posting_list.summary(block);
                let bound = dot_merge(&query_components, &query_values, components, values);

                for &doc_id in posting_list.block(block) {
                    let (dc, dv) = dataset.get(doc_id);
                    let member = dot_merge(&query_components, &query_values, dc, dv);
                    prop_assert!(
                        bound >= member,
                        "term {} block {}: summary dot {} < member doc {} dot {}",
                        term_id, block, bound, doc_id, member
                    );
                }
            }
        }
    }

    /// heap_factor = 1.0 prunes exactly against the envelope bound — the
    /// most aggressive setting that is still exact. Anything the skip test
    /// discards is provably outside the top k, so results match brute force.
    #[test]
    fn prop_unit_heap_factor_is_still_exact(
        dataset in dataset_strategy(),
        (query_components, query_values) in query_strategy(),
        k in 1usize..15,
    ) {
        let index = build_exact_index(dataset.clone());
        let hits = index
            .search(&query_components, &query_values, k, query_components.len(), 1.0)
            .unwrap();
        let expected = exhaustive_topk(&dataset, &query_components, &query_values, k);
        prop_assert_eq!(hits, expected);
    }

    /// Whatever the heap factor, a reported score is always the document's
    /// true dot product against the query, never a summary estimate.
    #[test]
    fn prop_scores_are_true_dot_products(
        dataset in dataset_strategy(),
        (query_components, query_values) in query_strategy(),
        heap_factor in 0.0f32..2.0,
    ) {
        let index = build_exact_index(dataset.clone());
        let hits = index
            .search(&query_components, &query_values, 10, query_components.len(), heap_factor)
            .unwrap();

        for hit in hits {
            let (components, values) = dataset.get(hit.doc_id);
            let truth = dot_merge(&query_components, &query_values, components, values);
            prop_assert_eq!(hit.score, truth);
        }
    }

    /// Results always come out ranked: descending score, ascending doc_id
    /// on ties, never more than k of them, never a duplicate document.
    #[test]
    fn prop_results_are_ranked_and_unique(
        dataset in dataset_strategy(),
        (query_components, query_values) in query_strategy(),
        k in 1usize..10,
        heap_factor in 0.0f32..2.0,
    ) {
        let index = build_exact_index(dataset);
        let hits = index
            .search(&query_components, &query_values, k, query_components.len(), heap_factor)
            .unwrap();

        prop_assert!(hits.len() <= k);
        for pair in hits.windows(2) {
            prop_assert!(pair[0].rank_cmp(&pair[1]).is_lt());
        }
    }

    /// Growing k only extends the tail of the result list.
    #[test]
    fn prop_larger_k_is_a_superset(
        dataset in dataset_strategy(),
        (query_components, query_values) in query_strategy(),
        k in 1usize..10,
    ) {
        let index = build_exact_index(dataset);
        let cut = query_components.len();
        let small = index.search(&query_components, &query_values, k, cut, 0.0).unwrap();
        let large = index.search(&query_components, &query_values, k + 5, cut, 0.0).unwrap();
        prop_assert_eq!(&large[..small.len()], &small[..]);
    }
}

// ============================================================================
// BATCH DETERMINISM
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Thread count changes scheduling, never outcomes or their order.
    #[test]
    fn prop_batch_invariant_under_thread_count(
        dataset in dataset_strategy(),
        queries in dataset_strategy(),
    ) {
        let index = build_exact_index(dataset);
        let single = batch_search(&index, &queries, 5, 8, 0.7, 1).unwrap();
        let multi = batch_search(&index, &queries, 5, 8, 0.7, 4).unwrap();
        prop_assert_eq!(single, multi);
    }

    /// Batch outcome i is exactly what a lone search of query i returns.
    #[test]
    fn prop_batch_matches_single_query_searches(
        dataset in dataset_strategy(),
        queries in dataset_strategy(),
    ) {
        let index = build_exact_index(dataset);
        let outcomes = batch_search(&index, &queries, 5, 8, 0.0, 2).unwrap();

        for (query_id, outcome) in outcomes.iter().enumerate() {
            let (components, values) = queries.get(query_id);
            let lone = index.search(components, values, 5, 8, 0.0).unwrap();
            prop_assert_eq!(outcome.as_ref().unwrap(), &lone);
        }
    }
}

// ============================================================================
// BINARY FORMAT
// ============================================================================

proptest! {
    #[test]
    fn prop_binary_encoding_round_trips(dataset in dataset_strategy()) {
        let reloaded = SparseDataset::from_bytes(&dataset.to_bytes()).unwrap();
        prop_assert_eq!(dataset, reloaded);
    }

    /// Truncating an encoded collection anywhere must fail cleanly, never
    /// panic or return a partial dataset.
    #[test]
    fn prop_truncated_encoding_is_rejected(
        dataset in dataset_strategy(),
        fraction in 0.0f64..1.0,
    ) {
        let bytes = dataset.to_bytes();
        let cut = (bytes.len() as f64 * fraction) as usize;
        if cut < bytes.len() {
            prop_assert!(SparseDataset::from_bytes(&bytes[..cut]).is_err());
        }
    }
}

// ============================================================================
// RANKING ORDER
// ============================================================================

#[test]
fn rank_cmp_is_a_total_order_over_nan_free_hits() {
    let hits = [
        ScoredHit { score: 2.0, doc_id: 5 },
        ScoredHit { score: 2.0, doc_id: 3 },
        ScoredHit { score: 0.5, doc_id: 0 },
    ];
    let mut sorted = hits;
    sorted.sort_by(ScoredHit::rank_cmp);
    let docs: Vec<_> = sorted.iter().map(|h| h.doc_id).collect();
    assert_eq!(docs, vec![3, 5, 0]);
}
