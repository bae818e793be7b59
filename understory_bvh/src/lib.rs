// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_bvh --heading-base-level=0

//! Understory BVH: balanced bounding volume hierarchies over static geometry.
//!
//! The builder takes an immutable [`PrimitiveSource`] (triangles, segments, or
//! points) and produces a read-only tree for collision tests, picking, culling, or
//! distance bounds computed by a higher layer.
//!
//! - Every split is a median split along a line chosen per node, so sibling
//!   subtrees differ in size by at most one primitive and the height stays at
//!   `⌈log₂ n⌉` whatever the spatial distribution.
//! - The bounding volume type is a parameter: [`Aabb3`], [`BoundingSphere`],
//!   [`OrientedBox3`], or anything implementing [`BoundingVolume`].
//! - The splitting line comes from an explicit [`AxisStrategy`]: a best-fit line
//!   through the node's vertices ([`OrthogonalLineAxis`]) or the volume's own hint
//!   ([`VolumeAxis`]).
//! - Centroids are computed once per build. Partitioning ping-pongs between two
//!   index buffers, and each recursive step only touches its own ranges.
//! - Identical input produces identical trees: median ties are broken by
//!   primitive index.
//!
//! Two storage forms are available. [`FlatBVH`] keeps a complete binary tree in one
//! preallocated array. [`LinkedBVH`] lets each node own its children. Both
//! implement [`Hierarchy`], the read surface traversal code is written against.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use understory_bvh::{Aabb3, BuildOptions, FlatBVH, Hierarchy, TriangleMesh, VolumeAxis};
//!
//! // Four triangles in a row along x.
//! let mut vertices = Vec::new();
//! let mut triangles = Vec::new();
//! for i in 0..4_u32 {
//!     let x = i as f32 * 2.0;
//!     vertices.extend([Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 0.0, 0.0), Vec3::new(x, 1.0, 0.0)]);
//!     triangles.push([3 * i, 3 * i + 1, 3 * i + 2]);
//! }
//! let mesh = TriangleMesh::new(vertices, triangles).unwrap();
//!
//! let tree = FlatBVH::<Aabb3>::build(&mesh, &VolumeAxis, BuildOptions::default()).unwrap();
//! assert_eq!(tree.height(), 2);
//! assert_eq!(tree.node_count(), 7);
//!
//! // The root bound covers the whole mesh; its halves split the row in two.
//! assert_eq!(tree.root().bound().max, Vec3::new(7.0, 1.0, 0.0));
//! let [left, _right] = tree.root().children().unwrap();
//! assert_eq!(tree.primitives(left).unwrap().len(), 2);
//!
//! // Leaves read left to right list every triangle once.
//! let mut leaves: Vec<_> = tree.leaf_primitives().map(|p| p.get()).collect();
//! leaves.sort_unstable();
//! assert_eq!(leaves, [0, 1, 2, 3]);
//! ```
//!
//! ## Features
//!
//! - `std` (default): use the standard library's float math through Glam.
//! - `libm`: use `libm` for float math in `no_std` builds.

#![no_std]

extern crate alloc;

pub mod axis;
mod builder;
pub mod centroid;
pub mod error;
pub mod fit;
pub mod flat;
pub mod linked;
pub mod options;
pub mod partition;
pub mod source;
pub mod stats;
pub mod tree;
pub mod types;
pub mod volume;

#[cfg(test)]
mod test_util;

pub use axis::{AxisStrategy, OrthogonalLineAxis, VolumeAxis};
pub use centroid::CentroidTable;
pub use error::{BuildError, SourceError};
pub use flat::{FlatBVH, FlatNode};
pub use linked::{LinkedBVH, LinkedNode};
pub use options::{BuildOptions, MAX_HEIGHT, Termination, complete_node_count, natural_height};
pub use partition::{MedianSplit, PartitionBuffers};
pub use source::{PointCloud, Primitive, PrimitiveSource, SegmentMesh, TriangleMesh, VertexMarks};
pub use stats::BuildStats;
pub use tree::{DepthFirst, Hierarchy};
pub use types::{Axis, NodeId, PrimitiveIndex};
pub use volume::{Aabb3, BoundingSphere, BoundingVolume, OrientedBox3, SplitAxisHint};
