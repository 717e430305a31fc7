// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for index construction and query throughput.
//!
//! Simulates learned-sparse-retrieval workloads at three scales:
//! - small:  1k documents over a 1k-term vocabulary
//! - medium: 10k documents over a 5k-term vocabulary
//! - large:  50k documents over a 20k-term vocabulary (build skipped)
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strata::{batch_search, BuildConfig, InvertedIndex, SparseDatasetMut, TermId};

struct Scale {
    name: &'static str,
    docs: usize,
    vocab: u32,
    nnz: usize,
}

const SCALES: &[Scale] = &[
    Scale {
        name: "small",
        docs: 1_000,
        vocab: 1_000,
        nnz: 32,
    },
    Scale {
        name: "medium",
        docs: 10_000,
        vocab: 5_000,
        nnz: 64,
    },
];

/// Zipf-ish synthetic collection: low term ids are much more common,
/// matching the skew of learned sparse encoders.
fn synthetic(docs: usize, vocab: u32, nnz: usize, seed: u64) -> strata::SparseDataset {
    let mut state = seed | 1;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut builder = SparseDatasetMut::new();
    for _ in 0..docs {
        let mut pairs = std::collections::BTreeMap::new();
        while pairs.len() < nnz {
            let r = next() % u64::from(vocab);
            let term = ((r * r) / u64::from(vocab)) as TermId;
            let weight = 0.05 + (next() % 1000) as f32 / 1000.0;
            pairs.entry(term).or_insert(weight);
        }
        let components: Vec<TermId> = pairs.keys().copied().collect();
        let values: Vec<f32> = pairs.values().copied().collect();
        builder.push(&components, &values);
    }
    builder.freeze()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for scale in SCALES {
        let dataset = synthetic(scale.docs, scale.vocab, scale.nnz, 42);
        group.throughput(Throughput::Elements(scale.docs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(scale.name), &dataset, |b, d| {
            b.iter(|| {
                InvertedIndex::build(black_box(d.clone()), BuildConfig::default()).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_single_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for scale in SCALES {
        let dataset = synthetic(scale.docs, scale.vocab, scale.nnz, 42);
        let index = InvertedIndex::build(dataset, BuildConfig::default()).unwrap();
        let queries = synthetic(64, scale.vocab, 16, 7);

        group.bench_with_input(BenchmarkId::from_parameter(scale.name), &index, |b, index| {
            b.iter(|| {
                for query_id in 0..queries.len() {
                    let (components, values) = queries.get(query_id);
                    black_box(
                        index
                            .search(components, values, 10, 8, 0.8)
                            .unwrap(),
                    );
                }
            });
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_search");
    group.sample_size(20);

    let dataset = synthetic(10_000, 5_000, 64, 42);
    let index = InvertedIndex::build(dataset, BuildConfig::default()).unwrap();
    let queries = synthetic(256, 5_000, 16, 7);
    group.throughput(Throughput::Elements(queries.len() as u64));

    for threads in [1usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    black_box(batch_search(&index, &queries, 10, 8, 0.8, threads).unwrap())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_single_query, bench_batch);
criterion_main!(benches);
