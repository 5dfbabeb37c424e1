//! Subdivision Benchmarks
//!
//! Performance benchmarks for level generation and the subdivision clamp

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chisel_core::multires::{ClampParams, MultiresMesh};
use chisel_core::primitives;
use chisel_core::subdivision::{CatmullClark, SubdivisionMode, Subdivider};

fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("catmull_clark_step");

    // Pre-subdivided cubes of 96, 1536 and 24576 faces
    for depth in [2usize, 4, 6].iter() {
        let mut geometry = primitives::cube();
        for _ in 0..*depth {
            geometry = CatmullClark.add_level(&geometry, SubdivisionMode::Linear).unwrap();
        }

        for mode in [SubdivisionMode::Linear, SubdivisionMode::Smooth] {
            let id = BenchmarkId::new(format!("{:?}", mode), geometry.face_count());
            group.bench_with_input(id, &geometry, |b, geometry| {
                b.iter(|| black_box(CatmullClark.add_level(geometry, mode).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_subdivide_clamp(c: &mut Criterion) {
    let mut group = c.benchmark_group("subdivide_clamp");
    group.sample_size(10);

    for threshold in [5_000usize, 50_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(threshold), threshold, |b, &threshold| {
            b.iter_batched(
                || MultiresMesh::new(primitives::cube()),
                |mut ladder| {
                    let params = ClampParams {
                        face_threshold: threshold,
                        ..ClampParams::default()
                    };
                    ladder.subdivide_clamp(&CatmullClark, params).unwrap();
                    ladder
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_step, bench_subdivide_clamp);
criterion_main!(benches);
