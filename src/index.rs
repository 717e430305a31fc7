// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index construction and the static index structure.
//!
//! [`InvertedIndex::build`] is a pure function of (dataset, config): it
//! distributes postings, prunes them, clusters each term's list into blocks
//! and summarizes each block. The result owns the forward dataset and one
//! [`PostingList`] per term; nothing in it is mutated after build, so the
//! index is `Send + Sync` and shared freely across query threads.
//!
//! Per-term block building is embarrassingly parallel and runs on rayon
//! behind the `parallel` feature, with a progress bar for large builds.

use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use indicatif::ProgressBar;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::cluster::{summarize, BlockingStrategy, Summarization};
use crate::dataset::SparseDataset;
use crate::error::{Error, Result};
use crate::postings::{distribute, Posting, PruningStrategy};
use crate::types::{DocId, TermId};

/// Everything the build needs to know; query-time parameters live on the
/// search call instead. Builder-style so call sites read as a sentence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    pruning: PruningStrategy,
    blocking: BlockingStrategy,
    summarization: Summarization,
    seed: u64,
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pruning_strategy(mut self, pruning: PruningStrategy) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn blocking_strategy(mut self, blocking: BlockingStrategy) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn summarization(mut self, summarization: Summarization) -> Self {
        self.summarization = summarization;
        self
    }

    /// Seed for clustering; equal (dataset, config) pairs build
    /// bit-identical indexes.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject out-of-range parameters before any work happens.
    pub fn validate(&self) -> Result<()> {
        match self.pruning {
            PruningStrategy::FixedSize { n_postings } => {
                if n_postings == 0 {
                    return Err(Error::BuildInvalidParameter {
                        parameter: "n_postings",
                        value: 0.0,
                    });
                }
            }
            PruningStrategy::GlobalThreshold {
                n_postings,
                max_fraction,
            } => {
                if n_postings == 0 {
                    return Err(Error::BuildInvalidParameter {
                        parameter: "n_postings",
                        value: 0.0,
                    });
                }
                if !(max_fraction.is_finite() && max_fraction >= 1.0) {
                    return Err(Error::BuildInvalidParameter {
                        parameter: "max_fraction",
                        value: f64::from(max_fraction),
                    });
                }
            }
        }
        match self.blocking {
            BlockingStrategy::FixedSize { block_size } => {
                if block_size == 0 {
                    return Err(Error::BuildInvalidParameter {
                        parameter: "block_size",
                        value: 0.0,
                    });
                }
            }
            BlockingStrategy::SeededKmeans {
                target_cluster_size,
                min_cluster_size,
            } => {
                if target_cluster_size == 0 {
                    return Err(Error::BuildInvalidParameter {
                        parameter: "target_cluster_size",
                        value: 0.0,
                    });
                }
                if min_cluster_size == 0 {
                    return Err(Error::BuildInvalidParameter {
                        parameter: "min_cluster_size",
                        value: 0.0,
                    });
                }
            }
        }
        let energy = self.summarization.energy;
        if !(energy.is_finite() && energy > 0.0 && energy <= 1.0) {
            return Err(Error::BuildInvalidParameter {
                parameter: "summary_energy",
                value: f64::from(energy),
            });
        }
        Ok(())
    }

    pub fn summarization_config(&self) -> Summarization {
        self.summarization
    }
}

/// Block summaries in CSR layout: one sparse vector per block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryList {
    offsets: Vec<usize>,
    components: Vec<TermId>,
    values: Vec<f32>,
}

impl SummaryList {
    fn new() -> Self {
        Self {
            offsets: vec![0],
            components: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push(&mut self, components: &[TermId], values: &[f32]) {
        self.components.extend_from_slice(components);
        self.values.extend_from_slice(values);
        self.offsets.push(self.components.len());
    }

    /// Number of blocks summarized.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, block: usize) -> (&[TermId], &[f32]) {
        let lo = self.offsets[block];
        let hi = self.offsets[block + 1];
        (&self.components[lo..hi], &self.values[lo..hi])
    }

    fn space_usage_bytes(&self) -> usize {
        self.offsets.len() * std::mem::size_of::<usize>()
            + self.components.len() * std::mem::size_of::<TermId>()
            + self.values.len() * std::mem::size_of::<f32>()
    }
}

/// One term's pruned, clustered posting list.
///
/// `doc_ids` is the pruned posting list reordered so each block is a
/// contiguous slice; `block_offsets[b]..block_offsets[b + 1]` delimits
/// block b and `summaries.get(b)` bounds it. Every doc belongs to exactly
/// one block, and the blocks concatenate back to the pruned list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingList {
    pub(crate) doc_ids: Box<[DocId]>,
    pub(crate) block_offsets: Box<[usize]>,
    pub(crate) summaries: SummaryList,
}

impl PostingList {
    /// Cluster and summarize one pruned posting list.
    fn build(
        dataset: &SparseDataset,
        postings: &[Posting],
        config: &BuildConfig,
        term_id: TermId,
    ) -> Self {
        let mut doc_ids: Vec<DocId> = postings.iter().map(|&(_, doc_id)| doc_id).collect();

        // Decorrelate per-term RNG streams from the single build seed.
        let term_seed = config
            .seed
            .wrapping_add((u64::from(term_id)).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let block_offsets = config.blocking.partition(&mut doc_ids, dataset, term_seed);

        let mut summaries = SummaryList::new();
        for block in block_offsets.windows(2) {
            let (components, values) =
                summarize(dataset, &doc_ids[block[0]..block[1]], config.summarization);
            summaries.push(&components, &values);
        }

        Self {
            doc_ids: doc_ids.into_boxed_slice(),
            block_offsets: block_offsets.into_boxed_slice(),
            summaries,
        }
    }

    /// Number of blocks.
    pub fn num_blocks(&self) -> usize {
        self.summaries.len()
    }

    /// The summary vector of one block.
    #[inline]
    pub fn summary(&self, block: usize) -> (&[TermId], &[f32]) {
        self.summaries.get(block)
    }

    /// The doc_ids making up one block.
    #[inline]
    pub fn block(&self, block: usize) -> &[DocId] {
        &self.doc_ids[self.block_offsets[block]..self.block_offsets[block + 1]]
    }

    /// Number of retained postings.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    fn space_usage_bytes(&self) -> usize {
        self.doc_ids.len() * std::mem::size_of::<DocId>()
            + self.block_offsets.len() * std::mem::size_of::<usize>()
            + self.summaries.space_usage_bytes()
    }
}

/// The finalized, read-only index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    forward: SparseDataset,
    posting_lists: Box<[PostingList]>,
    config: BuildConfig,
}

impl InvertedIndex {
    /// Build an index over `dataset`. Fails on an empty collection or an
    /// out-of-range config; a failed build leaves nothing behind.
    pub fn build(dataset: SparseDataset, config: BuildConfig) -> Result<Self> {
        if dataset.is_empty() {
            return Err(Error::BuildEmptyCollection);
        }
        config.validate()?;

        let mut raw_lists = distribute(&dataset);
        config.pruning.apply(&mut raw_lists);

        let posting_lists = Self::build_posting_lists(&dataset, &raw_lists, &config);

        Ok(Self {
            forward: dataset,
            posting_lists: posting_lists.into_boxed_slice(),
            config,
        })
    }

    #[cfg(feature = "parallel")]
    fn build_posting_lists(
        dataset: &SparseDataset,
        raw_lists: &[Vec<Posting>],
        config: &BuildConfig,
    ) -> Vec<PostingList> {
        let progress = ProgressBar::new(raw_lists.len() as u64);
        let posting_lists = raw_lists
            .par_iter()
            .enumerate()
            .map(|(term_id, postings)| {
                let list = PostingList::build(dataset, postings, config, term_id as TermId);
                progress.inc(1);
                list
            })
            .collect();
        progress.finish_and_clear();
        posting_lists
    }

    #[cfg(not(feature = "parallel"))]
    fn build_posting_lists(
        dataset: &SparseDataset,
        raw_lists: &[Vec<Posting>],
        config: &BuildConfig,
    ) -> Vec<PostingList> {
        raw_lists
            .iter()
            .enumerate()
            .map(|(term_id, postings)| {
                PostingList::build(dataset, postings, config, term_id as TermId)
            })
            .collect()
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Largest term_id in the collection plus one.
    pub fn dim(&self) -> usize {
        self.forward.dim()
    }

    /// Non-zero components in the forward dataset.
    pub fn nnz(&self) -> usize {
        self.forward.nnz()
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub(crate) fn forward(&self) -> &SparseDataset {
        &self.forward
    }

    /// The posting list for `term_id`, if the term occurs in the collection.
    pub fn posting_list(&self, term_id: TermId) -> Option<&PostingList> {
        self.posting_lists.get(term_id as usize)
    }

    /// Approximate heap footprint of the whole index in bytes.
    pub fn space_usage_bytes(&self) -> usize {
        self.forward.space_usage_bytes()
            + self
                .posting_lists
                .iter()
                .map(PostingList::space_usage_bytes)
                .sum::<usize>()
    }
}
