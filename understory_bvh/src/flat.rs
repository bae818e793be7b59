// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena form: every node lives in a preallocated slot of one flat array.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::RangeInclusive;

use crate::axis::AxisStrategy;
use crate::builder::{HierarchyBuilder, NodeInfo, NodeSink, Prepared};
use crate::centroid::CentroidTable;
use crate::error::BuildError;
use crate::options::{BuildOptions, complete_node_count, natural_height};
use crate::source::PrimitiveSource;
use crate::stats::BuildStats;
use crate::types::{NodeId, PrimitiveIndex};
use crate::volume::BoundingVolume;

/// A bounding volume hierarchy stored as a complete binary tree in one array.
///
/// The arena holds exactly `2^(height + 1) - 1` slots, allocated before the
/// recursion starts and never resized. Slot `i` has its children at `2i + 1` and
/// `2i + 2`; slots under a subtree that stopped early are vacant.
///
/// Every node, leaf or interior, owns a contiguous range of the partition array,
/// so [`primitives`](Self::primitives) works at any level without extra storage.
///
/// The effective height is the requested one (or `⌈log₂ n⌉` when unset), but never
/// more than `⌈log₂ n⌉`: slots below that depth could not be occupied.
pub struct FlatBVH<B> {
    nodes: Vec<Option<FlatNode<B>>>,
    height: u32,
    partition: Vec<PrimitiveIndex>,
    centroids: CentroidTable,
    stats: BuildStats,
}

/// One occupied slot of a [`FlatBVH`].
#[derive(Clone, Debug, PartialEq)]
pub struct FlatNode<B> {
    id: NodeId,
    bound: B,
    first: usize,
    last: usize,
    depth: u32,
    leaf: bool,
}

impl<B> FlatNode<B> {
    /// Slot of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Bounding volume of every vertex of the node's primitives.
    pub fn bound(&self) -> &B {
        &self.bound
    }

    /// Inclusive range of the node's primitives in [`FlatBVH::partition`].
    pub fn range(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }

    /// Number of primitives in the subtree.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// Always false; every node owns at least one primitive.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth of the node; the root is at depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Slots of the two children, or `None` for a leaf.
    pub fn children(&self) -> Option<[NodeId; 2]> {
        (!self.leaf).then_some([self.id.left(), self.id.right()])
    }
}

impl<B: BoundingVolume> FlatBVH<B> {
    /// Build a tree over every primitive of `source`.
    ///
    /// `strategy` picks the splitting line of each interior node.
    pub fn build<S, A>(source: &S, strategy: &A, options: BuildOptions) -> Result<Self, BuildError>
    where
        S: PrimitiveSource + ?Sized,
        A: AxisStrategy<B>,
    {
        let Prepared {
            centroids,
            mut buffers,
            mut termination,
        } = Prepared::new(source, &options)?;
        let natural = natural_height(centroids.len());
        if termination.height > natural {
            log::debug!(
                "height {} reduced to {natural}, the most {} primitives can fill",
                termination.height,
                centroids.len()
            );
            termination.height = natural;
        }
        let height = termination.height;

        let slots = arena_slots(height)?;
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(slots)
            .map_err(|error| BuildError::Allocation {
                what: "node arena",
                error,
            })?;
        nodes.resize_with(slots, || None);

        log::debug!(
            "building flat BVH: {} primitives, height {height}, {slots} slots, max leaf size {}",
            centroids.len(),
            termination.max_leaf_size
        );
        let builder = HierarchyBuilder::new(source, strategy, &centroids, termination)?;
        let ((), stats) = builder.run(&mut ArenaSink { slots: &mut nodes }, &mut buffers)?;
        log::debug!("flat BVH built: {stats:?}");

        Ok(Self {
            nodes,
            height,
            partition: buffers.into_primary(),
            centroids,
            stats,
        })
    }
}

impl<B> FlatBVH<B> {
    /// Effective height of the tree; the deepest slots are at this depth.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of arena slots, occupied or not: `2^(height + 1) - 1`.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node in slot `id`, or `None` if the slot is vacant or out of range.
    pub fn node(&self, id: NodeId) -> Option<&FlatNode<B>> {
        self.nodes.get(id.get()).and_then(Option::as_ref)
    }

    /// The root node.
    pub fn root(&self) -> &FlatNode<B> {
        match self.nodes.first() {
            Some(Some(root)) => root,
            _ => unreachable!("a built tree always has a root"),
        }
    }

    /// Occupied slots in slot order (breadth first).
    pub fn nodes(&self) -> impl Iterator<Item = &FlatNode<B>> + '_ {
        self.nodes.iter().flatten()
    }

    /// Primitives owned by the node in slot `id`, or `None` for a vacant slot.
    pub fn primitives(&self, id: NodeId) -> Option<&[PrimitiveIndex]> {
        self.node(id).map(|n| &self.partition[n.range()])
    }

    /// The final permutation of primitive indices. Leaves read left to right
    /// cover it exactly once.
    pub fn partition(&self) -> &[PrimitiveIndex] {
        &self.partition
    }

    /// Centroids computed for the build, indexed by primitive.
    pub fn centroids(&self) -> &CentroidTable {
        &self.centroids
    }

    /// Counters collected during the build.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}

impl<B> Debug for FlatBVH<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlatBVH")
            .field("height", &self.height)
            .field("slots", &self.nodes.len())
            .field("occupied", &self.stats.node_count())
            .field("primitives", &self.partition.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Slot count of an arena of the given height.
fn arena_slots(height: u32) -> Result<usize, BuildError> {
    complete_node_count(height).ok_or(BuildError::NodeCountOverflow { height })
}

struct ArenaSink<'a, B> {
    slots: &'a mut [Option<FlatNode<B>>],
}

impl<B> ArenaSink<'_, B> {
    fn place(&mut self, node: NodeInfo<B>, len: usize, leaf: bool) {
        let slot = &mut self.slots[node.id.get()];
        debug_assert!(slot.is_none(), "slot {} filled twice", node.id.get());
        *slot = Some(FlatNode {
            id: node.id,
            bound: node.bound,
            first: node.start,
            last: node.start + len - 1,
            depth: node.depth,
            leaf,
        });
    }
}

impl<B> NodeSink<B> for ArenaSink<'_, B> {
    type Node = ();

    fn leaf(&mut self, node: NodeInfo<B>, primitives: &[PrimitiveIndex]) -> Result<(), BuildError> {
        self.place(node, primitives.len(), true);
        Ok(())
    }

    fn interior(
        &mut self,
        node: NodeInfo<B>,
        primitives: &[PrimitiveIndex],
        _children: [(); 2],
    ) -> Result<(), BuildError> {
        self.place(node, primitives.len(), false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{OrthogonalLineAxis, VolumeAxis};
    use crate::options::MAX_HEIGHT;
    use crate::source::TriangleMesh;
    use crate::volume::{Aabb3, BoundingSphere};
    use alloc::vec;
    use glam::Vec3;

    fn line(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect()
    }

    fn build_default(points: &[Vec3]) -> FlatBVH<Aabb3> {
        FlatBVH::build(points, &VolumeAxis, BuildOptions::default()).unwrap()
    }

    #[test]
    fn ten_primitives_at_height_two_fill_seven_slots() {
        let pts = line(10);
        let tree = FlatBVH::<Aabb3>::build(
            pts.as_slice(),
            &VolumeAxis,
            BuildOptions::default().with_target_height(2),
        )
        .unwrap();
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.node_count(), 7);
        assert_eq!(tree.nodes().count(), 7);
        let leaves: Vec<_> = tree.nodes().filter(|n| n.is_leaf()).collect();
        assert_eq!(leaves.len(), 4);
        for leaf in leaves {
            assert_eq!(leaf.depth(), 2);
            assert!(
                leaf.len() == 2 || leaf.len() == 3,
                "leaf size {}",
                leaf.len()
            );
        }
    }

    #[test]
    fn auto_height_allocates_the_complete_arena() {
        let pts = line(10);
        let tree = build_default(&pts);
        assert_eq!(tree.height(), 4);
        assert_eq!(tree.node_count(), 31);
        // A full build over n primitives with singleton leaves has 2n - 1 nodes.
        assert_eq!(tree.nodes().count(), 19);
        assert_eq!(tree.stats().node_count(), 19);
        assert_eq!(tree.nodes().filter(|n| n.is_leaf()).count(), 10);
        assert!(tree.node(NodeId(30)).is_none(), "10 is not a power of two");
    }

    #[test]
    fn requested_height_beyond_natural_is_bounded() {
        let pts = line(4);
        let tree = FlatBVH::<Aabb3>::build(
            pts.as_slice(),
            &VolumeAxis,
            BuildOptions::default().with_target_height(20),
        )
        .unwrap();
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.node_count(), 7);
    }

    #[test]
    fn children_follow_heap_layout() {
        let pts = line(8);
        let tree = build_default(&pts);
        for node in tree.nodes() {
            if let Some([l, r]) = node.children() {
                assert_eq!(l.get(), 2 * node.id().get() + 1);
                assert_eq!(r.get(), 2 * node.id().get() + 2);
                let (left, right) = (tree.node(l).unwrap(), tree.node(r).unwrap());
                assert_eq!(left.depth(), node.depth() + 1);
                assert_eq!(*left.range().start(), *node.range().start());
                assert_eq!(*right.range().end(), *node.range().end());
                assert_eq!(left.range().end() + 1, *right.range().start());
            }
        }
    }

    #[test]
    fn interior_primitives_are_the_union_of_children() {
        let pts: Vec<Vec3> = (0..11)
            .map(|i| Vec3::new((i * 4 % 11) as f32, (i % 2) as f32, 0.0))
            .collect();
        let options = BuildOptions::default();
        let tree =
            FlatBVH::<BoundingSphere>::build(pts.as_slice(), &OrthogonalLineAxis, options).unwrap();
        let root = tree.primitives(NodeId::ROOT).unwrap();
        assert_eq!(root.len(), 11);
        let [l, r] = tree.root().children().unwrap();
        let mut union = tree.primitives(l).unwrap().to_vec();
        union.extend_from_slice(tree.primitives(r).unwrap());
        assert_eq!(union, root);
        assert_eq!(tree.primitives(l).unwrap().len(), 6);
    }

    #[test]
    fn bounds_enclose_their_primitives() {
        let mesh = TriangleMesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(5.0, 5.0, 5.0),
                Vec3::new(6.0, 5.0, 5.0),
                Vec3::new(5.0, 6.0, 5.0),
            ],
            vec![[0, 1, 2], [3, 4, 5], [1, 4, 2]],
        )
        .unwrap();
        let tree = FlatBVH::<Aabb3>::build(&mesh, &VolumeAxis, BuildOptions::default()).unwrap();
        for node in tree.nodes() {
            for &p in tree.primitives(node.id()).unwrap() {
                for &v in &mesh.triangles()[p.get()] {
                    let corner = mesh.vertices()[v as usize];
                    assert!(node.bound().contains_point(corner, 0.0));
                }
            }
        }
    }

    #[test]
    fn requested_height_is_reduced_to_what_the_primitives_fill() {
        // Within the height cap but past the natural height of 5 primitives.
        let pts = line(5);
        let options = BuildOptions::default().with_target_height(MAX_HEIGHT);
        let tree = FlatBVH::<Aabb3>::build(pts.as_slice(), &VolumeAxis, options).unwrap();
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.node_count(), 15);
        assert_eq!(tree.stats().max_depth, 3);
    }

    #[test]
    fn arena_slot_count_overflow_is_an_error() {
        assert_eq!(arena_slots(4), Ok(31));
        assert_eq!(
            arena_slots(usize::BITS),
            Err(BuildError::NodeCountOverflow {
                height: usize::BITS,
            })
        );
    }

    #[test]
    fn empty_source_is_rejected() {
        let pts: &[Vec3] = &[];
        let err = FlatBVH::<Aabb3>::build(pts, &VolumeAxis, BuildOptions::default()).unwrap_err();
        assert_eq!(err, BuildError::EmptySource);
    }
}
