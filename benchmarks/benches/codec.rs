//! Decode/encode benchmarks using Criterion

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xcproj_benchmarks::synthetic_project;
use xcproj_core::{CodecConfig, PbxProj};

fn decode_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for targets in [10, 100, 500] {
        let json = synthetic_project(targets).to_string();
        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_with_input(BenchmarkId::new("from_json_str", targets), &json, |b, json| {
            b.iter(|| black_box(PbxProj::from_json_str(json).unwrap()))
        });
    }

    group.finish();
}

fn encode_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let config = CodecConfig::default();

    for targets in [10, 100, 500] {
        let project = PbxProj::from_value(&synthetic_project(targets)).unwrap();
        group.throughput(Throughput::Elements(project.objects.len() as u64));
        group.bench_with_input(BenchmarkId::new("plist", targets), &project, |b, project| {
            b.iter(|| black_box(project.plist(&config).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("to_text", targets), &project, |b, project| {
            b.iter(|| black_box(project.to_text(&config).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, decode_benchmarks, encode_benchmarks);
criterion_main!(benches);
