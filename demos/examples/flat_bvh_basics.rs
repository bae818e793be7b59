// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat BVH basics.
//!
//! Build an arena tree over a small triangle grid and print it level by level.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example flat_bvh_basics`

use glam::Vec3;
use understory_bvh::{Aabb3, BuildOptions, FlatBVH, Hierarchy, NodeId, TriangleMesh, VolumeAxis};

fn grid(side: u32) -> TriangleMesh {
    let stride = side + 1;
    let mut vertices = Vec::new();
    for y in 0..=side {
        for x in 0..=side {
            vertices.push(Vec3::new(x as f32, y as f32, 0.0));
        }
    }
    let mut triangles = Vec::new();
    for y in 0..side {
        for x in 0..side {
            let i = y * stride + x;
            triangles.push([i, i + 1, i + stride]);
            triangles.push([i + 1, i + stride + 1, i + stride]);
        }
    }
    TriangleMesh::new(vertices, triangles).expect("grid indices are in range")
}

fn main() {
    env_logger::Builder::from_default_env()
        .format_target(false)
        .format_module_path(false)
        .init();

    // 4x4 cells, 32 triangles.
    let mesh = grid(4);
    let tree = FlatBVH::<Aabb3>::build(&mesh, &VolumeAxis, BuildOptions::default())
        .expect("grid is not empty");
    println!(
        "{} triangles, height {}, {} slots",
        mesh.triangles().len(),
        tree.height(),
        tree.node_count()
    );

    for depth in 0..=tree.height() {
        let level: Vec<_> = tree.nodes().filter(|n| n.depth() == depth).collect();
        println!("depth {depth}: {} nodes", level.len());
        for node in level.iter().take(4) {
            let b = node.bound();
            println!(
                "  slot {:>2}: {} primitives in [{:.1}, {:.1}] x [{:.1}, {:.1}]",
                node.id().get(),
                node.len(),
                b.min.x,
                b.max.x,
                b.min.y,
                b.max.y
            );
        }
    }

    let root = tree.root();
    let [left, right] = root.children().expect("root of 32 triangles is split");
    let halves = [left, right].map(|id| tree.primitives(id).unwrap_or_default());
    println!("left half:  {:?}", halves[0]);
    println!("right half: {:?}", halves[1]);

    let leaves = tree.leaves().count();
    assert_eq!(leaves, mesh.triangles().len(), "one triangle per leaf");
    assert!(tree.node(NodeId::ROOT).is_some());
    println!("{:?}", tree.stats());
}
