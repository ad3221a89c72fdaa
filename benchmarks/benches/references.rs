//! Reference repository benchmarks using Criterion

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use xcproj_core::ReferenceRepository;

fn reference_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("references");
    let ids: Vec<String> = (0..1000).map(|i| format!("{:024X}", i)).collect();
    group.throughput(Throughput::Elements(ids.len() as u64));

    group.bench_function("get_or_create_fresh", |b| {
        b.iter(|| {
            let mut repository = ReferenceRepository::new();
            for id in &ids {
                black_box(repository.get_or_create(id));
            }
        })
    });

    let mut warm = ReferenceRepository::new();
    for id in &ids {
        warm.get_or_create(id);
    }
    group.bench_function("get_or_create_interned", |b| {
        b.iter(|| {
            for id in &ids {
                black_box(warm.get_or_create(id));
            }
        })
    });

    group.bench_function("generate", |b| {
        b.iter(|| {
            let mut repository = ReferenceRepository::new();
            for _ in 0..100 {
                black_box(repository.generate());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, reference_benchmarks);
criterion_main!(benches);
