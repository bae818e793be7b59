// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linked BVH leaves.
//!
//! Build an owned-node tree over a point cloud with up to four points per leaf,
//! keeping primitive lists on interior nodes too, then walk it.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example linked_bvh_leaves`

use glam::Vec3;
use understory_bvh::{
    BoundingSphere, BuildOptions, Hierarchy, LinkedBVH, OrthogonalLineAxis, PointCloud,
};

fn main() {
    env_logger::Builder::from_default_env()
        .format_target(false)
        .format_module_path(false)
        .init();

    // Points on a helix: a line fit splits along its axis first.
    let points: Vec<Vec3> = (0..50)
        .map(|i| {
            let t = i as f32 * 0.4;
            Vec3::new(t.cos() * 3.0, t.sin() * 3.0, t)
        })
        .collect();
    let cloud = PointCloud::new(points);

    let options = BuildOptions::default()
        .with_max_leaf_size(4)
        .with_interior_primitives(true);
    let tree = LinkedBVH::<BoundingSphere>::build(&cloud, &OrthogonalLineAxis, options)
        .expect("cloud is not empty");
    log::info!("built {tree:?}");

    for (node, depth) in tree.depth_first() {
        let indent = "  ".repeat(depth as usize);
        let s = node.bound();
        if node.is_leaf() {
            println!("{indent}leaf r={:.2} {:?}", s.radius, node.primitives());
        } else {
            println!(
                "{indent}node r={:.2} ({} primitives listed)",
                s.radius,
                node.primitives().len()
            );
        }
    }

    let readback: Vec<_> = tree.leaf_primitives().collect();
    assert_eq!(readback.len(), cloud.points().len());
    println!(
        "{} nodes, height {}, {} points",
        tree.node_count(),
        tree.height(),
        tree.primitive_count()
    );
}
