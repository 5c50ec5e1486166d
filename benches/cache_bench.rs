//! Microbenchmarks for the interning cache
//!
//! Measures the two paths that dominate a solver run: re-interning a set
//! value the cache has already seen, and replaying a memoised union
//! against computing it cold.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pta_store::{PersistentPointsToCache, PointsToId, SparseNodeSet};

fn sets_of_len(len: u32, count: u32) -> Vec<SparseNodeSet> {
    (0..count)
        .map(|offset| (offset..offset + len).collect())
        .collect()
}

fn bench_emplace_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emplace_hit");

    for len in [4u32, 64, 512] {
        let mut cache = PersistentPointsToCache::new();
        let set: SparseNodeSet = (0..len).collect();
        cache.emplace(set.clone());

        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(cache.emplace(black_box(set.clone()))));
        });
    }

    group.finish();
}

fn bench_union_memoised(c: &mut Criterion) {
    let mut cache = PersistentPointsToCache::<SparseNodeSet>::new();
    let a = cache.emplace((0..256u32).collect());
    let b = cache.emplace((128..384u32).collect());
    cache.union(a, b); // warm the memo

    c.bench_function("union_memoised", |bencher| {
        bencher.iter(|| black_box(cache.union(black_box(a), black_box(b))));
    });
}

fn bench_union_cold(c: &mut Criterion) {
    c.bench_function("union_cold_256", |bencher| {
        bencher.iter_batched(
            || {
                let mut cache = PersistentPointsToCache::<SparseNodeSet>::new();
                let a = cache.emplace((0..256u32).collect());
                let b = cache.emplace((128..384u32).collect());
                (cache, a, b)
            },
            |(mut cache, a, b)| black_box(cache.union(a, b)),
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_fixed_point_fold(c: &mut Criterion) {
    let sets = sets_of_len(8, 128);

    c.bench_function("fold_128_sets", |bencher| {
        bencher.iter_batched(
            PersistentPointsToCache::new,
            |mut cache| {
                let mut acc = PointsToId::EMPTY;
                for set in &sets {
                    let id = cache.emplace(set.clone());
                    acc = cache.union(acc, id);
                }
                black_box(acc)
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_emplace_hit,
    bench_union_memoised,
    bench_union_cold,
    bench_fixed_point_fold
);
criterion_main!(benches);
