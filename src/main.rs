// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::time::Instant;

use clap::Parser;

use strata::cli::{Cli, Commands};
use strata::{
    batch_search, BlockingStrategy, BuildConfig, InvertedIndex, PruningStrategy, SparseDataset,
    Summarization,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            input,
            output,
            n_postings,
            global_threshold,
            max_fraction,
            cluster_size,
            min_cluster_size,
            fixed_blocks,
            block_size,
            centroid,
            summary_energy,
            seed,
        } => run_build(
            &input,
            &output,
            n_postings,
            global_threshold,
            max_fraction,
            cluster_size,
            min_cluster_size,
            fixed_blocks,
            block_size,
            centroid,
            summary_energy,
            seed,
        ),
        Commands::Search {
            index,
            queries,
            k,
            query_cut,
            heap_factor,
            threads,
        } => run_search(&index, &queries, k, query_cut, heap_factor, threads),
    };

    if let Err(e) = result {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_build(
    input: &str,
    output: &str,
    n_postings: usize,
    global_threshold: bool,
    max_fraction: f32,
    cluster_size: usize,
    min_cluster_size: usize,
    fixed_blocks: bool,
    block_size: usize,
    centroid: bool,
    summary_energy: f32,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let dataset = SparseDataset::read_bin_file(input)?;
    eprintln!(
        "  ✓ Loaded {} vectors ({} non-zeros, dim {}) in {:.2?}",
        dataset.len(),
        dataset.nnz(),
        dataset.dim(),
        start.elapsed()
    );

    let pruning = if global_threshold {
        PruningStrategy::GlobalThreshold {
            n_postings,
            max_fraction,
        }
    } else {
        PruningStrategy::FixedSize { n_postings }
    };
    let blocking = if fixed_blocks {
        BlockingStrategy::FixedSize { block_size }
    } else {
        BlockingStrategy::SeededKmeans {
            target_cluster_size: cluster_size,
            min_cluster_size,
        }
    };
    let summarization = if centroid {
        Summarization::centroid(summary_energy)
    } else {
        Summarization::max_envelope(summary_energy)
    };
    let config = BuildConfig::default()
        .pruning_strategy(pruning)
        .blocking_strategy(blocking)
        .summarization(summarization)
        .seed(seed);

    let start = Instant::now();
    let index = InvertedIndex::build(dataset, config)?;
    eprintln!(
        "  ✓ Built index in {:.2?} ({:.1} MiB)",
        start.elapsed(),
        index.space_usage_bytes() as f64 / (1024.0 * 1024.0)
    );

    fs::write(output, bincode::serialize(&index)?)?;
    eprintln!("  ✓ Wrote {output}");
    Ok(())
}

fn run_search(
    index_path: &str,
    queries_path: &str,
    k: usize,
    query_cut: usize,
    heap_factor: f32,
    threads: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let index: InvertedIndex = bincode::deserialize(&fs::read(index_path)?)?;
    let queries = SparseDataset::read_bin_file(queries_path)?;
    eprintln!(
        "  ✓ Loaded index ({} docs) and {} queries",
        index.len(),
        queries.len()
    );

    let start = Instant::now();
    let outcomes = batch_search(&index, &queries, k, query_cut, heap_factor, threads)?;
    let elapsed = start.elapsed();

    // One tab-separated line per hit: query_id, rank, doc_id, score.
    for (query_id, outcome) in outcomes.iter().enumerate() {
        match outcome {
            Ok(hits) => {
                for (rank, hit) in hits.iter().enumerate() {
                    println!("{query_id}\t{rank}\t{}\t{}", hit.doc_id, hit.score);
                }
            }
            Err(e) => eprintln!("query {query_id}: {e}"),
        }
    }

    eprintln!(
        "  ✓ {} queries in {:.2?} ({:.0} µs/query)",
        queries.len(),
        elapsed,
        elapsed.as_micros() as f64 / queries.len().max(1) as f64
    );
    Ok(())
}
