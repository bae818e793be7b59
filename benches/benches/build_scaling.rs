// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use understory_bvh::{
    Aabb3, BoundingSphere, BuildOptions, FlatBVH, LinkedBVH, OrientedBox3, OrthogonalLineAxis,
    PointCloud, TriangleMesh, VolumeAxis,
};

fn random_vec3(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(0.0..extent),
        rng.gen_range(0.0..extent),
        rng.gen_range(0.0..extent),
    )
}

fn gen_points(count: usize) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(0xCAFE_F00D);
    PointCloud::new((0..count).map(|_| random_vec3(&mut rng, 1000.0)).collect())
}

/// A `side` x `side` height-field grid, two triangles per cell.
fn gen_terrain(side: u32) -> TriangleMesh {
    let mut rng = StdRng::seed_from_u64(side.into());
    let mut vertices = Vec::with_capacity(((side + 1) * (side + 1)) as usize);
    for y in 0..=side {
        for x in 0..=side {
            vertices.push(Vec3::new(x as f32, y as f32, rng.gen_range(0.0..4.0)));
        }
    }
    let stride = side + 1;
    let mut triangles = Vec::with_capacity((2 * side * side) as usize);
    for y in 0..side {
        for x in 0..side {
            let i = y * stride + x;
            triangles.push([i, i + 1, i + stride]);
            triangles.push([i + 1, i + stride + 1, i + stride]);
        }
    }
    TriangleMesh::new(vertices, triangles).expect("grid indices are in range")
}

/// `clusters` blobs of `per_cluster` points, each within `spread` of its center.
fn gen_clustered(clusters: usize, per_cluster: usize, spread: f32) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(0xC1A5_7E55);
    let mut out = Vec::with_capacity(clusters * per_cluster);
    for _ in 0..clusters {
        let center = random_vec3(&mut rng, 2000.0) - Vec3::splat(spread / 2.0);
        for _ in 0..per_cluster {
            out.push(center + random_vec3(&mut rng, spread));
        }
    }
    PointCloud::new(out)
}

fn bench_flat_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_points");
    for &n in &[1_000_usize, 10_000, 100_000] {
        let points = gen_points(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("aabb_volume_axis_n{n}"), |b| {
            b.iter(|| {
                let tree =
                    FlatBVH::<Aabb3>::build(&points, &VolumeAxis, BuildOptions::default()).unwrap();
                black_box(tree.height());
            });
        });
        group.bench_function(format!("aabb_line_fit_n{n}"), |b| {
            b.iter(|| {
                let options = BuildOptions::default();
                let tree =
                    FlatBVH::<Aabb3>::build(&points, &OrthogonalLineAxis, options).unwrap();
                black_box(tree.height());
            });
        });
    }
    group.finish();
}

fn bench_linked_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("linked_points");
    for &n in &[1_000_usize, 10_000, 100_000] {
        let points = gen_points(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("sphere_leaf4_n{n}"), |b| {
            b.iter(|| {
                let tree = LinkedBVH::<BoundingSphere>::build(
                    &points,
                    &OrthogonalLineAxis,
                    BuildOptions::default().with_max_leaf_size(4),
                )
                .unwrap();
                black_box(tree.node_count());
            });
        });
    }
    group.finish();
}

fn bench_terrain(c: &mut Criterion) {
    let mut group = c.benchmark_group("terrain");
    for &side in &[32_u32, 128] {
        let mesh = gen_terrain(side);
        group.throughput(Throughput::Elements(u64::from(2 * side * side)));
        group.bench_function(format!("obb_volume_axis_side{side}"), |b| {
            b.iter(|| {
                let tree =
                    FlatBVH::<OrientedBox3>::build(&mesh, &VolumeAxis, BuildOptions::default())
                        .unwrap();
                black_box(tree.node_count());
            });
        });
        group.bench_function(format!("aabb_leaf8_side{side}"), |b| {
            b.iter(|| {
                let tree = FlatBVH::<Aabb3>::build(
                    &mesh,
                    &VolumeAxis,
                    BuildOptions::default().with_max_leaf_size(8),
                )
                .unwrap();
                black_box(tree.node_count());
            });
        });
    }
    group.finish();
}

fn bench_clustered(c: &mut Criterion) {
    let mut group = c.benchmark_group("clustered");
    let points = gen_clustered(64, 256, 20.0);
    group.throughput(Throughput::Elements(64 * 256));
    group.bench_function("aabb_volume_axis", |b| {
        b.iter(|| {
            let tree =
                FlatBVH::<Aabb3>::build(&points, &VolumeAxis, BuildOptions::default()).unwrap();
            black_box(tree.height());
        });
    });
    group.bench_function("aabb_line_fit", |b| {
        b.iter(|| {
            let tree =
                FlatBVH::<Aabb3>::build(&points, &OrthogonalLineAxis, BuildOptions::default())
                    .unwrap();
            black_box(tree.height());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_flat_points,
    bench_linked_points,
    bench_terrain,
    bench_clustered,
);
criterion_main!(benches);
