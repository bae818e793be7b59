// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic inputs and structural checks shared by the crate's tests.

use alloc::vec::Vec;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::source::{Primitive, PrimitiveSource, TriangleMesh};
use crate::tree::Hierarchy;
use crate::types::PrimitiveIndex;

fn random_vec(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

/// `n` points scattered in a cube of side 200 around the origin.
pub(crate) fn random_points(n: usize, seed: u64) -> Vec<Vec3> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| random_vec(&mut rng, 100.0)).collect()
}

/// `n` small triangles scattered like [`random_points`], every third one sharing
/// a vertex with its predecessor.
pub(crate) fn random_triangles(n: usize, seed: u64) -> TriangleMesh {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for i in 0..n {
        let anchor = random_vec(&mut rng, 100.0);
        let base = u32::try_from(vertices.len()).unwrap();
        vertices.push(anchor);
        vertices.push(anchor + random_vec(&mut rng, 2.0));
        vertices.push(anchor + random_vec(&mut rng, 2.0));
        let first = if i % 3 == 2 { base - 1 } else { base };
        triangles.push([first, base + 1, base + 2]);
    }
    TriangleMesh::new(vertices, triangles).unwrap()
}

/// A source reporting one primitive more than a 32-bit index can name.
///
/// It stores nothing, so a build must refuse it before reading any primitive.
#[cfg(target_pointer_width = "64")]
pub(crate) struct OversizedSource;

#[cfg(target_pointer_width = "64")]
impl OversizedSource {
    pub(crate) const COUNT: usize = u32::MAX as usize + 1;
}

#[cfg(target_pointer_width = "64")]
impl PrimitiveSource for OversizedSource {
    fn count(&self) -> usize {
        Self::COUNT
    }

    fn primitive(&self, index: PrimitiveIndex) -> Primitive {
        unreachable!("primitive {index:?} read from an oversized source")
    }
}

/// Primitives of the subtree under `node`, gathered from its leaves.
fn subtree_primitives<'a, H: Hierarchy>(
    tree: &'a H,
    node: H::Node<'a>,
    out: &mut Vec<PrimitiveIndex>,
) {
    match tree.children(node) {
        Some([l, r]) => {
            subtree_primitives(tree, l, out);
            subtree_primitives(tree, r, out);
        }
        None => out.extend_from_slice(tree.primitives(node)),
    }
}

/// Assert the structural invariants of a finished tree over `count` primitives.
///
/// - leaves read left to right are a permutation of `0..count`;
/// - sibling subtrees differ in size by at most one;
/// - a node is a leaf exactly when it is small enough or at `height`.
pub(crate) fn check_shape<H: Hierarchy>(
    tree: &H,
    count: usize,
    max_leaf_size: usize,
    height: u32,
) {
    let mut seen: Vec<_> = tree.leaf_primitives().collect();
    seen.sort_unstable();
    let limit = u32::try_from(count).unwrap();
    let expected: Vec<_> = (0..limit).map(PrimitiveIndex).collect();
    assert_eq!(
        seen, expected,
        "leaves must cover every primitive exactly once"
    );

    let mut scratch = Vec::new();
    for (node, depth) in tree.depth_first() {
        scratch.clear();
        subtree_primitives(tree, node, &mut scratch);
        let len = scratch.len();
        match tree.children(node) {
            Some([l, _]) => {
                assert!(len > max_leaf_size, "node of {len} should have been a leaf");
                assert!(depth < height, "interior node at depth {depth} >= {height}");
                scratch.clear();
                subtree_primitives(tree, l, &mut scratch);
                let left = scratch.len();
                let right = len - left;
                assert!(
                    left == right || left == right + 1,
                    "unbalanced split {left}/{right} at depth {depth}"
                );
            }
            None => assert!(
                len <= max_leaf_size || depth == height,
                "leaf of {len} at depth {depth} should have been split"
            ),
        }
    }
}

/// Assert that every node's bound contains every primitive of its subtree.
pub(crate) fn check_bounds<H: Hierarchy>(
    tree: &H,
    contains: impl Fn(&H::Bound, PrimitiveIndex) -> bool,
) {
    let mut prims = Vec::new();
    for (node, depth) in tree.depth_first() {
        prims.clear();
        subtree_primitives(tree, node, &mut prims);
        for &p in &prims {
            assert!(
                contains(tree.bound(node), p),
                "primitive {p:?} escapes its bound at depth {depth}"
            );
        }
    }
}
