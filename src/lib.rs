// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Approximate top-k retrieval for learned sparse vectors.
//!
//! Strata answers "which k documents have the highest dot product with
//! this sparse query" over collections of (term_id, weight) vectors, as
//! produced by learned sparse text encoders. It trades exactness for speed
//! twice: posting lists are pruned at build time, and whole blocks of
//! postings are skipped at query time when their summary vector cannot
//! beat the current top-k threshold.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌────────────┐    ┌───────────┐
//! │ dataset.rs │───▶│ postings.rs │───▶│ cluster.rs │───▶│ index.rs  │
//! │ (CSR store,│    │ (distribute,│    │ (blocking, │    │ (build,   │
//! │  binary IO)│    │  pruning)   │    │  summaries)│    │  config)  │
//! └────────────┘    └─────────────┘    └────────────┘    └─────┬─────┘
//!                                                             │
//!                  ┌────────────┐    ┌───────────┐            ▼
//!                  │  batch.rs  │◀───│ search.rs │◀─── read-only index
//!                  │ (worker    │    │ (heap +   │
//!                  │  pool)     │    │  pruning) │
//!                  └────────────┘    └───────────┘
//! ```
//!
//! The index is built once, is immutable afterwards, and is shared
//! read-only across query threads. Each query owns its heap and visited
//! set; nothing at query time mutates shared state.
//!
//! # Usage
//!
//! ```ignore
//! use strata::{batch_search, BuildConfig, InvertedIndex, SparseDataset};
//!
//! let docs = SparseDataset::read_bin_file("collection.bin")?;
//! let index = InvertedIndex::build(docs, BuildConfig::default())?;
//!
//! let hits = index.search(&[3, 17], &[0.8, 1.2], 10, 5, 0.8)?;
//! ```

mod batch;
mod cluster;
mod dataset;
mod error;
mod index;
mod postings;
mod search;
mod topk;
mod types;

pub mod cli;

// Re-exports for public API
pub use batch::{batch_search, QueryOutcome};
pub use cluster::{BlockingStrategy, Summarization, SummaryKind};
pub use dataset::{SparseDataset, SparseDatasetMut, MAX_RECORD_COUNT};
pub use error::{Error, Result};
pub use index::{BuildConfig, InvertedIndex, PostingList};
pub use postings::PruningStrategy;
pub use topk::TopKHeap;
pub use types::{
    dot_dense, dot_merge, DocId, ScoredHit, SparseVector, TermId, DENSE_QUERY_THRESHOLD,
};
