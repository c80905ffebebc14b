//! Benchmarks for crust reconstruction operations.
//!
//! Run with: cargo bench
//!
//! To compare against baseline:
//! 1. First run: cargo bench -- --save-baseline main
//! 2. After changes: cargo bench -- --baseline main

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_crust::{
    ChunkGrid, CrustParams, DiffusionParams, VoxelCoord, diffuse, dilate, generate_crust,
    label_components,
};

// =============================================================================
// Fixtures
// =============================================================================

/// A watertight spherical shell of the given radius, 1.5 voxels thick.
fn sphere_shell(radius: i32) -> ChunkGrid<bool> {
    let mut grid = ChunkGrid::try_new(16, false).expect("positive chunk size");
    let outer = f64::from(radius);
    for x in -radius..=radius {
        for y in -radius..=radius {
            for z in -radius..=radius {
                let dist = f64::from(x * x + y * y + z * z).sqrt();
                if dist >= outer - 1.5 && dist <= outer {
                    grid.set(VoxelCoord::new(x, y, z), true);
                }
            }
        }
    }
    grid
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_dilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dilation");
    for radius in [8, 16] {
        let shell = sphere_shell(radius);
        group.throughput(Throughput::Elements(shell.count_set() as u64));
        group.bench_with_input(BenchmarkId::new("sphere", radius), &shell, |b, shell| {
            b.iter(|| dilate(black_box(shell)));
        });
    }
    group.finish();
}

fn bench_labeling(c: &mut Criterion) {
    let mut group = c.benchmark_group("labeling");
    for radius in [8, 16] {
        let mut shell = sphere_shell(radius);
        shell.pad_chunks(1);
        group.bench_with_input(BenchmarkId::new("sphere", radius), &shell, |b, shell| {
            b.iter(|| label_components(black_box(shell), 5));
        });
    }
    group.finish();
}

fn bench_crust_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("crust");
    group.sample_size(10);
    let model = sphere_shell(8);
    group.bench_function("generate_fast", |b| {
        b.iter(|| generate_crust(black_box(&model), &CrustParams::fast()));
    });
    group.finish();
}

fn bench_diffusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("diffusion");
    group.sample_size(10);
    let model = sphere_shell(16);
    let crust = dilate(&model);
    let params = DiffusionParams::default().with_iterations(1);
    group.bench_function("relax_iteration", |b| {
        b.iter(|| diffuse(black_box(&crust), black_box(&model), &params));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_dilation,
    bench_labeling,
    bench_crust_generation,
    bench_diffusion
);
criterion_main!(benches);
