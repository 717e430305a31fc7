// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definitions.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Approximate top-k retrieval engine for learned sparse vectors",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a binary sparse-vector collection
    Build {
        /// Input collection (binary sparse-vector format)
        #[arg(short, long)]
        input: String,

        /// Output index file
        #[arg(short, long)]
        output: String,

        /// Posting-list pruning budget per term
        #[arg(long, default_value_t = 3500)]
        n_postings: usize,

        /// Prune against a global weight threshold instead of per-term
        #[arg(long)]
        global_threshold: bool,

        /// Per-list cap multiplier for global-threshold pruning
        #[arg(long, default_value_t = 1.5)]
        max_fraction: f32,

        /// Target documents per cluster for seeded k-means blocking
        #[arg(long, default_value_t = 16)]
        cluster_size: usize,

        /// Clusters smaller than this merge into their predecessor
        #[arg(long, default_value_t = 2)]
        min_cluster_size: usize,

        /// Cut posting lists into fixed-size blocks instead of clustering
        #[arg(long)]
        fixed_blocks: bool,

        /// Block size for fixed-size blocking
        #[arg(long, default_value_t = 16)]
        block_size: usize,

        /// Summarize blocks with scaled centroids instead of max envelopes
        #[arg(long)]
        centroid: bool,

        /// Fraction of summary energy to keep (1.0 keeps every component)
        #[arg(long, default_value_t = 1.0)]
        summary_energy: f32,

        /// Seed for the clustering RNG
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Run a batch of queries against a built index
    Search {
        /// Index file produced by `strata build`
        #[arg(short, long)]
        index: String,

        /// Query collection (binary sparse-vector format)
        #[arg(short, long)]
        queries: String,

        /// Number of results per query
        #[arg(short, long, default_value_t = 10)]
        k: usize,

        /// Number of top query terms to probe
        #[arg(long, default_value_t = 10)]
        query_cut: usize,

        /// Block-skip aggressiveness (0.0 disables pruning)
        #[arg(long, default_value_t = 0.7)]
        heap_factor: f32,

        /// Worker threads for the batch
        #[arg(long, default_value_t = 1)]
        threads: usize,
    },
}
