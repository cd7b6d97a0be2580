//! Criterion benchmarks for the Elias-Fano sequence.
//!
//! Measures append throughput, random select, rank, and sequential
//! iteration over monotone position data with mixed gap sizes.
//!
//! Run with: cargo bench --bench elias_fano

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dynbits::EliasFano;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Monotone positions with varying gaps: mostly small, occasionally
/// large.
fn generate_positions(n: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut values = Vec::with_capacity(n);
    let mut pos = 0u64;

    for _ in 0..n {
        let gap = if rng.gen_bool(0.8) {
            rng.gen_range(10..30)
        } else {
            rng.gen_range(50..150)
        };
        pos += gap;
        values.push(pos);
    }

    values
}

fn build(values: &[u64]) -> EliasFano {
    let max = *values.last().unwrap();
    let mut ef = EliasFano::with_capacity(
        EliasFano::optimal_lo_width(max, values.len()),
        values.len(),
    );
    for &v in values {
        ef.append(v);
    }
    ef
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("elias_fano/append");

    for n in [10_000usize, 100_000, 1_000_000] {
        let values = generate_positions(n, 42);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(
            BenchmarkId::new("build", format!("{}K", n / 1000)),
            &values,
            |b, values| b.iter(|| build(black_box(values))),
        );
    }
    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("elias_fano/select1");

    for n in [100_000usize, 1_000_000] {
        let values = generate_positions(n, 42);
        let ef = build(&values);
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let queries: Vec<usize> = (0..10000).map(|_| rng.gen_range(1..=n)).collect();

        group.bench_with_input(
            BenchmarkId::new("random", format!("{}K", n / 1000)),
            &(&ef, &queries),
            |b, (ef, queries)| {
                b.iter(|| {
                    let mut sum = 0u64;
                    for &r in queries.iter() {
                        sum += ef.select_1(black_box(r)).unwrap();
                    }
                    sum
                })
            },
        );
    }
    group.finish();
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("elias_fano/rank1");

    for n in [100_000usize, 1_000_000] {
        let values = generate_positions(n, 42);
        let ef = build(&values);
        let max = *values.last().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let queries: Vec<u64> = (0..10000).map(|_| rng.gen_range(0..max)).collect();

        group.bench_with_input(
            BenchmarkId::new("random", format!("{}K", n / 1000)),
            &(&ef, &queries),
            |b, (ef, queries)| {
                b.iter(|| {
                    let mut sum = 0usize;
                    for &p in queries.iter() {
                        sum += ef.rank_1(black_box(p));
                    }
                    sum
                })
            },
        );
    }
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("elias_fano/iterate");

    for n in [100_000usize, 1_000_000] {
        let values = generate_positions(n, 42);
        let ef = build(&values);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(
            BenchmarkId::new("sum", format!("{}K", n / 1000)),
            &ef,
            |b, ef| {
                b.iter(|| {
                    let mut sum = 0u64;
                    for v in ef.iter() {
                        sum += v;
                    }
                    black_box(sum)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_append, bench_select, bench_rank, bench_iterate);
criterion_main!(benches);
