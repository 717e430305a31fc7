// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Posting-list clustering and block summaries.
//!
//! A posting list is partitioned into contiguous blocks of documents with
//! similar weight profiles, and each block gets a summary sparse vector.
//! At query time the summary's dot product against the query bounds what
//! any member of the block can score, which is what lets the executor skip
//! whole blocks.
//!
//! # The soundness rule
//!
//! With [`SummaryKind::MaxEnvelope`] at `summary_energy = 1.0`, the summary
//! holds the per-term maximum over the block's members, so for every query
//! `q` and member `d`: `dot(summary, q) >= dot(d, q)` (weights are
//! non-negative). Skipping a block whose summary cannot beat the heap
//! minimum therefore never drops a true top-k member. `Centroid` summaries
//! and `summary_energy < 1.0` tighten the bound below the true maximum and
//! trade that guarantee for speed — explicitly opt-in.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dataset::SparseDataset;
use crate::types::{dot_merge, DocId, TermId};

/// How a posting list is split into blocks.
///
/// - `FixedSize`: consecutive runs of `block_size` postings, in pruned
///   (descending-weight) order. Cheap, ignores co-occurrence structure.
/// - `SeededKmeans`: one greedy assignment round over the member documents'
///   sparse vectors. Centroid seeds are drawn from the build seed, so equal
///   seeds give bit-identical blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockingStrategy {
    FixedSize {
        block_size: usize,
    },
    SeededKmeans {
        target_cluster_size: usize,
        min_cluster_size: usize,
    },
}

impl Default for BlockingStrategy {
    fn default() -> Self {
        BlockingStrategy::SeededKmeans {
            target_cluster_size: 16,
            min_cluster_size: 2,
        }
    }
}

impl BlockingStrategy {
    /// Partition `posting` (reordering it in place) and return block
    /// offsets: `offsets[b]..offsets[b + 1]` is block b. An empty posting
    /// list yields no blocks; a list no longer than the target stays one
    /// block (splitting buys nothing).
    pub fn partition(
        &self,
        posting: &mut [DocId],
        dataset: &SparseDataset,
        seed: u64,
    ) -> Vec<usize> {
        if posting.is_empty() {
            return Vec::new();
        }
        match *self {
            BlockingStrategy::FixedSize { block_size } => {
                fixed_size_blocking(posting.len(), block_size)
            }
            BlockingStrategy::SeededKmeans {
                target_cluster_size,
                min_cluster_size,
            } => seeded_kmeans_blocking(
                posting,
                dataset,
                target_cluster_size,
                min_cluster_size,
                seed,
            ),
        }
    }
}

fn fixed_size_blocking(len: usize, block_size: usize) -> Vec<usize> {
    let mut offsets: Vec<usize> = (0..len.div_ceil(block_size))
        .map(|i| i * block_size)
        .collect();
    offsets.push(len);
    offsets
}

/// One greedy k-means round: draw `ceil(len / target)` member documents as
/// centroid seeds, assign every member to its most similar seed (dot
/// product of the full document vectors), emit clusters in seed order.
/// Clusters smaller than `min_cluster_size` are folded into the previous
/// cluster rather than kept as noise blocks.
fn seeded_kmeans_blocking(
    posting: &mut [DocId],
    dataset: &SparseDataset,
    target_cluster_size: usize,
    min_cluster_size: usize,
    seed: u64,
) -> Vec<usize> {
    let len = posting.len();
    if len <= target_cluster_size {
        return vec![0, len];
    }

    let n_clusters = len.div_ceil(target_cluster_size);
    let mut rng = StdRng::seed_from_u64(seed);
    let seed_positions = rand::seq::index::sample(&mut rng, len, n_clusters);

    let seed_docs: Vec<DocId> = seed_positions.iter().map(|pos| posting[pos]).collect();

    let mut clusters: Vec<Vec<DocId>> = vec![Vec::new(); n_clusters];
    for &doc_id in posting.iter() {
        let (doc_components, doc_values) = dataset.get(doc_id);
        let mut best = 0usize;
        let mut best_dot = f32::NEG_INFINITY;
        for (cluster, &seed_doc) in seed_docs.iter().enumerate() {
            let (seed_components, seed_values) = dataset.get(seed_doc);
            let dot = dot_merge(doc_components, doc_values, seed_components, seed_values);
            if dot > best_dot {
                best_dot = dot;
                best = cluster;
            }
        }
        clusters[best].push(doc_id);
    }

    // Fold undersized clusters into their predecessor so no block is all
    // overhead. The first kept cluster absorbs leading runts.
    let mut merged: Vec<Vec<DocId>> = Vec::with_capacity(clusters.len());
    for cluster in clusters.into_iter().filter(|c| !c.is_empty()) {
        if cluster.len() < min_cluster_size {
            if let Some(previous) = merged.last_mut() {
                previous.extend(cluster);
                continue;
            }
        }
        merged.push(cluster);
    }

    let mut offsets = Vec::with_capacity(merged.len() + 1);
    offsets.push(0);
    let mut cursor = 0;
    for cluster in &merged {
        posting[cursor..cursor + cluster.len()].copy_from_slice(cluster);
        cursor += cluster.len();
        offsets.push(cursor);
    }
    debug_assert_eq!(cursor, len);
    offsets
}

/// Which per-term statistic the block summary stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryKind {
    /// Per-term maximum over members — a sound upper bound for pruning.
    MaxEnvelope,
    /// Per-term mean over members — tighter, prunes harder, can drop true
    /// top-k members.
    Centroid,
}

/// Summary configuration: the statistic plus an energy cutoff.
///
/// `energy` keeps the highest-weight summary terms until they account for
/// that fraction of the summary's total mass; `1.0` keeps every term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summarization {
    pub kind: SummaryKind,
    pub energy: f32,
}

impl Default for Summarization {
    fn default() -> Self {
        Self {
            kind: SummaryKind::MaxEnvelope,
            energy: 1.0,
        }
    }
}

impl Summarization {
    pub fn max_envelope(energy: f32) -> Self {
        Self {
            kind: SummaryKind::MaxEnvelope,
            energy,
        }
    }

    pub fn centroid(energy: f32) -> Self {
        Self {
            kind: SummaryKind::Centroid,
            energy,
        }
    }
}

/// Compute one block's summary, ascending term_id order.
pub fn summarize(
    dataset: &SparseDataset,
    block: &[DocId],
    summarization: Summarization,
) -> (Vec<TermId>, Vec<f32>) {
    let mut per_term: HashMap<TermId, f32> = HashMap::new();
    for &doc_id in block {
        let (components, values) = dataset.get(doc_id);
        for (&c, &v) in components.iter().zip(values) {
            match summarization.kind {
                SummaryKind::MaxEnvelope => {
                    per_term
                        .entry(c)
                        .and_modify(|best| *best = best.max(v))
                        .or_insert(v);
                }
                SummaryKind::Centroid => {
                    *per_term.entry(c).or_insert(0.0) += v;
                }
            }
        }
    }

    let scale = match summarization.kind {
        SummaryKind::MaxEnvelope => 1.0,
        SummaryKind::Centroid => 1.0 / block.len().max(1) as f32,
    };

    let mut entries: Vec<(TermId, f32)> =
        per_term.into_iter().map(|(c, v)| (c, v * scale)).collect();

    if summarization.energy < 1.0 {
        // Keep the heaviest terms until the energy budget is met.
        entries.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let total: f32 = entries.iter().map(|&(_, v)| v).sum();
        let mut kept = 0;
        let mut acc = 0.0f32;
        for &(_, v) in &entries {
            acc += v;
            kept += 1;
            if acc > summarization.energy * total {
                break;
            }
        }
        entries.truncate(kept);
    }

    entries.sort_unstable_by_key(|&(c, _)| c);
    entries.into_iter().unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SparseDatasetMut;
    use crate::types::dot_dense;

    fn dataset() -> SparseDataset {
        let mut builder = SparseDatasetMut::new();
        builder.push(&[0, 1], &[1.0, 2.0]);
        builder.push(&[0, 2], &[3.0, 0.5]);
        builder.push(&[1, 2], &[4.0, 1.5]);
        builder.push(&[0], &[0.25]);
        builder.freeze()
    }

    #[test]
    fn fixed_blocking_covers_the_list() {
        assert_eq!(fixed_size_blocking(10, 4), vec![0, 4, 8, 10]);
        assert_eq!(fixed_size_blocking(8, 4), vec![0, 4, 8]);
        assert_eq!(fixed_size_blocking(3, 4), vec![0, 3]);
    }

    #[test]
    fn short_lists_stay_one_block() {
        let dataset = dataset();
        let mut posting = vec![0, 1, 2];
        let strategy = BlockingStrategy::SeededKmeans {
            target_cluster_size: 8,
            min_cluster_size: 2,
        };
        let offsets = strategy.partition(&mut posting, &dataset, 7);
        assert_eq!(offsets, vec![0, 3]);
        assert_eq!(posting, vec![0, 1, 2]);
    }

    #[test]
    fn kmeans_blocks_partition_the_posting_list() {
        let dataset = dataset();
        let original = vec![0, 1, 2, 3];
        let strategy = BlockingStrategy::SeededKmeans {
            target_cluster_size: 2,
            min_cluster_size: 1,
        };

        let mut posting = original.clone();
        let offsets = strategy.partition(&mut posting, &dataset, 99);

        assert_eq!(*offsets.first().unwrap(), 0);
        assert_eq!(*offsets.last().unwrap(), original.len());
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));

        let mut seen = posting.clone();
        seen.sort_unstable();
        assert_eq!(seen, original);
    }

    #[test]
    fn equal_seeds_give_identical_blocks() {
        let dataset = dataset();
        let strategy = BlockingStrategy::SeededKmeans {
            target_cluster_size: 2,
            min_cluster_size: 1,
        };

        let mut a = vec![0, 1, 2, 3];
        let mut b = vec![0, 1, 2, 3];
        let offsets_a = strategy.partition(&mut a, &dataset, 1234);
        let offsets_b = strategy.partition(&mut b, &dataset, 1234);
        assert_eq!(a, b);
        assert_eq!(offsets_a, offsets_b);
    }

    #[test]
    fn max_envelope_upper_bounds_members() {
        let dataset = dataset();
        let block = vec![0, 1, 2];
        let (components, values) = summarize(&dataset, &block, Summarization::default());

        // envelope: term0 -> 3.0, term1 -> 4.0, term2 -> 1.5
        assert_eq!(components, vec![0, 1, 2]);
        assert_eq!(values, vec![3.0, 4.0, 1.5]);

        // directly assert the bound against an arbitrary query
        let query = [0.5f32, 1.0, 2.0];
        let summary_dot: f32 = components
            .iter()
            .zip(&values)
            .map(|(&c, &v)| query[c as usize] * v)
            .sum();
        for &doc_id in &block {
            let (dc, dv) = dataset.get(doc_id);
            assert!(summary_dot >= dot_dense(&query, dc, dv));
        }
    }

    #[test]
    fn centroid_averages_members() {
        let dataset = dataset();
        let block = vec![0, 1];
        let summarization = Summarization {
            kind: SummaryKind::Centroid,
            energy: 1.0,
        };
        let (components, values) = summarize(&dataset, &block, summarization);
        assert_eq!(components, vec![0, 1, 2]);
        // term0: (1.0 + 3.0) / 2, term1: 2.0 / 2, term2: 0.5 / 2
        assert_eq!(values, vec![2.0, 1.0, 0.25]);
    }

    #[test]
    fn energy_truncation_keeps_heaviest_terms() {
        let dataset = dataset();
        let block = vec![0, 1, 2];
        let summarization = Summarization {
            kind: SummaryKind::MaxEnvelope,
            energy: 0.5,
        };
        let (components, values) = summarize(&dataset, &block, summarization);
        // envelope mass is 3.0 + 4.0 + 1.5 = 8.5; term1 (4.0) alone is
        // under half, term1 + term0 crosses it
        assert_eq!(components, vec![0, 1]);
        assert_eq!(values, vec![3.0, 4.0]);
    }
}
