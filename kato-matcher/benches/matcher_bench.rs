//! Benchmarks for the batch pattern matcher's parallel fan-out.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kato_matcher::{match_candidates, Candidate};

fn symbols(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn bench_single_candidate(c: &mut Criterion) {
    let pattern = symbols("s", 50);
    let state = symbols("s", 30);

    c.bench_function("match_single_candidate_50_symbols", |b| {
        b.iter(|| match_candidates(black_box(&[Candidate { name: "p1", flattened: &pattern }]), black_box(&state), black_box(0.1)))
    });
}

fn bench_candidate_batch_scaling(c: &mut Criterion) {
    let state = symbols("s", 30);
    let mut group = c.benchmark_group("match_candidates_batch");

    for size in [10usize, 100, 500] {
        let names: Vec<String> = (0..size).map(|i| format!("p{i}")).collect();
        let patterns: Vec<Vec<String>> = (0..size).map(|i| symbols(&format!("p{i}_"), 20)).collect();
        let candidates: Vec<Candidate> = names.iter().zip(patterns.iter()).map(|(name, flattened)| Candidate { name, flattened }).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| match_candidates(black_box(&candidates), black_box(&state), black_box(0.1)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_candidate, bench_candidate_batch_scaling);
criterion_main!(benches);
