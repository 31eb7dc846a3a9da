//! Benchmarks for plane boundary triangulation.
//!
//! Convex boundaries are the common case for detected planes; star shapes
//! stress the reflex-vertex path of the ear test.

use std::f32::consts::TAU;

use ar_plugin::plane_mesh::{self, PlaneMeshData};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::Vec2;

/// Clockwise regular polygon.
fn convex(n: usize) -> Vec<Vec2> {
  (0..n)
    .map(|i| {
      let angle = -TAU * i as f32 / n as f32;
      Vec2::new(angle.cos(), angle.sin())
    })
    .collect()
}

/// Clockwise star, every other vertex pulled inwards (half of them reflex).
fn star(n: usize) -> Vec<Vec2> {
  (0..n)
    .map(|i| {
      let angle = -TAU * i as f32 / n as f32;
      let radius = if i % 2 == 0 { 1.0 } else { 0.6 };
      Vec2::new(angle.cos(), angle.sin()) * radius
    })
    .collect()
}

fn bench_indices(c: &mut Criterion) {
  let mut group = c.benchmark_group("plane_indices");

  for n in [8usize, 32, 128, 512] {
    group.throughput(Throughput::Elements(n as u64));

    let boundary = convex(n);
    let mut indices = Vec::with_capacity((n - 2) * 3);
    group.bench_with_input(BenchmarkId::new("convex", n), &n, |b, _| {
      b.iter(|| {
        let ok = plane_mesh::generate_indices(black_box(&boundary), &mut indices);
        black_box(ok)
      })
    });

    let boundary = star(n);
    group.bench_with_input(BenchmarkId::new("star", n), &n, |b, _| {
      b.iter(|| {
        let ok = plane_mesh::generate_indices(black_box(&boundary), &mut indices);
        black_box(ok)
      })
    });
  }

  group.finish();
}

/// Full mesh output: indices, normals and UVs.
fn bench_mesh(c: &mut Criterion) {
  let mut group = c.benchmark_group("plane_mesh");
  let mut mesh = PlaneMeshData::new();

  for n in [16usize, 256] {
    let boundary = convex(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
      b.iter(|| {
        plane_mesh::try_generate_mesh(black_box(&boundary), &mut mesh);
        black_box(mesh.triangle_count())
      })
    });
  }

  group.finish();
}

criterion_group!(benches, bench_indices, bench_mesh);
criterion_main!(benches);
