//! Benchmark suite for lynx-core search operations.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lynx_core::{BruteForceIndex, DistanceMetric, IvfIndex, VectorIndex, VectorStore};

const DIM: usize = 128;
const N: usize = 4096;

fn generate_vector(seed: usize) -> Vec<f32> {
    (0..DIM).map(|j| ((seed * 131 + j) as f32 * 0.013).sin()).collect()
}

fn build_store() -> VectorStore {
    let mut store = VectorStore::new();
    let rows: Vec<Vec<f32>> = (0..N).map(generate_vector).collect();
    store.add_batch(&rows).unwrap();
    store
}

fn bench_bruteforce_search(c: &mut Criterion) {
    let store = build_store();
    let index = BruteForceIndex::new(DistanceMetric::L2);
    let query = generate_vector(N + 1);

    c.bench_function("bf_search_4096x128_top10", |b| {
        b.iter(|| black_box(index.search(&store, &query, 10).unwrap()));
    });
}

fn bench_ivf_search(c: &mut Criterion) {
    let store = build_store();
    let query = generate_vector(N + 1);

    let mut group = c.benchmark_group("ivf_search_4096x128_top10");
    for nprobe in [1, 4, 16] {
        let mut index = IvfIndex::new(DistanceMetric::L2, 64, nprobe).unwrap();
        index.update(&store).unwrap();

        group.bench_function(format!("nprobe_{nprobe}"), |b| {
            b.iter(|| black_box(index.search(&store, &query, 10).unwrap()));
        });
    }
    group.finish();
}

fn bench_ivf_training(c: &mut Criterion) {
    let store = build_store();

    c.bench_function("ivf_train_4096x128_nlist64", |b| {
        b.iter(|| {
            let mut index = IvfIndex::new(DistanceMetric::L2, 64, 8).unwrap();
            index.update(&store).unwrap();
            black_box(index.indexed_len())
        });
    });
}

criterion_group!(
    benches,
    bench_bruteforce_search,
    bench_ivf_search,
    bench_ivf_training
);
criterion_main!(benches);
