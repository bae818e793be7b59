// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer-linked form: each interior node owns its two children.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::axis::AxisStrategy;
use crate::builder::{HierarchyBuilder, NodeInfo, NodeSink, Prepared};
use crate::centroid::CentroidTable;
use crate::error::BuildError;
use crate::options::BuildOptions;
use crate::source::PrimitiveSource;
use crate::stats::BuildStats;
use crate::types::PrimitiveIndex;
use crate::volume::BoundingVolume;

/// A bounding volume hierarchy whose nodes own their subtrees.
///
/// Leaves always keep the list of primitives they own. Interior nodes keep theirs
/// only when built with [`BuildOptions::store_interior_primitives`].
pub struct LinkedBVH<B> {
    root: LinkedNode<B>,
    centroids: CentroidTable,
    stats: BuildStats,
}

/// A node of a [`LinkedBVH`].
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedNode<B> {
    bound: B,
    depth: u32,
    primitive_count: usize,
    primitives: Vec<PrimitiveIndex>,
    children: Option<Box<[Self; 2]>>,
}

impl<B> LinkedNode<B> {
    /// Bounding volume of every vertex of the node's primitives.
    pub fn bound(&self) -> &B {
        &self.bound
    }

    /// Depth of the node; the root is at depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The two children, or `None` for a leaf.
    pub fn children(&self) -> Option<&[Self; 2]> {
        self.children.as_deref()
    }

    /// Whether the node is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Primitives kept on this node.
    ///
    /// Complete for leaves. For interior nodes this is empty unless the tree was
    /// built with interior primitive lists.
    pub fn primitives(&self) -> &[PrimitiveIndex] {
        &self.primitives
    }

    /// Number of nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |[l, r]| l.node_count() + r.node_count())
    }

    /// Number of primitives in this subtree, whether or not they are listed here.
    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }
}

impl<B: BoundingVolume> LinkedBVH<B> {
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
            termination,
        } = Prepared::new(source, &options)?;

        log::debug!(
            "building linked BVH: {} primitives, height {}, max leaf size {}, interior lists {}",
            centroids.len(),
            termination.height,
            termination.max_leaf_size,
            options.store_interior_primitives
        );
        let mut sink = LinkSink {
            store_interior: options.store_interior_primitives,
        };
        let builder = HierarchyBuilder::new(source, strategy, &centroids, termination)?;
        let (root, stats) = builder.run(&mut sink, &mut buffers)?;
        log::debug!("linked BVH built: {stats:?}");

        Ok(Self {
            root,
            centroids,
            stats,
        })
    }
}

impl<B> LinkedBVH<B> {
    /// The root node.
    pub fn root(&self) -> &LinkedNode<B> {
        &self.root
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Total number of primitives.
    pub fn primitive_count(&self) -> usize {
        self.root.primitive_count()
    }

    /// Depth of the deepest node.
    pub fn height(&self) -> u32 {
        self.stats.max_depth
    }

    /// Centroids computed for the build, indexed by primitive.
    pub fn centroids(&self) -> &CentroidTable {
        &self.centroids
    }

    /// Counters collected during the build.
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Take the root node, dropping the centroid table.
    pub fn into_root(self) -> LinkedNode<B> {
        self.root
    }
}

impl<B> Debug for LinkedBVH<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LinkedBVH")
            .field("height", &self.stats.max_depth)
            .field("nodes", &self.stats.node_count())
            .field("primitives", &self.root.primitive_count)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

struct LinkSink {
    store_interior: bool,
}

fn owned_list(primitives: &[PrimitiveIndex]) -> Result<Vec<PrimitiveIndex>, BuildError> {
    let mut list = Vec::new();
    list.try_reserve_exact(primitives.len())
        .map_err(|error| BuildError::Allocation {
            what: "node primitive list",
            error,
        })?;
    list.extend_from_slice(primitives);
    Ok(list)
}

impl<B> NodeSink<B> for LinkSink {
    type Node = LinkedNode<B>;

    fn leaf(
        &mut self,
        node: NodeInfo<B>,
        primitives: &[PrimitiveIndex],
    ) -> Result<LinkedNode<B>, BuildError> {
        Ok(LinkedNode {
            bound: node.bound,
            depth: node.depth,
            primitive_count: primitives.len(),
            primitives: owned_list(primitives)?,
            children: None,
        })
    }

    fn interior(
        &mut self,
        node: NodeInfo<B>,
        primitives: &[PrimitiveIndex],
        children: [LinkedNode<B>; 2],
    ) -> Result<LinkedNode<B>, BuildError> {
        let list = if self.store_interior {
            owned_list(primitives)?
        } else {
            Vec::new()
        };
        Ok(LinkedNode {
            bound: node.bound,
            depth: node.depth,
            primitive_count: primitives.len(),
            primitives: list,
            children: Some(Box::new(children)),
        })
    }
}
