// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recursive top-down construction shared by both tree forms.
//!
//! The builder walks the hierarchy depth first. At every node it gathers the
//! vertex positions of the node's primitives, fits a bounding volume to them and
//! either stops (leaf) or asks the axis strategy for a line, median-splits the
//! node's range into the other partition buffer and recurses into both halves
//! with the buffer roles swapped.
//!
//! What happens to a finished node is up to a [`NodeSink`]: the flat form writes
//! it into its arena slot, the linked form wraps it in an owned node.

use alloc::vec::Vec;

use glam::Vec3;

use crate::axis::AxisStrategy;
use crate::centroid::CentroidTable;
use crate::error::BuildError;
use crate::options::{BuildOptions, Termination};
use crate::partition::{MedianSplit, PartitionBuffers};
use crate::source::{MAX_CORNERS, PrimitiveSource, VertexMarks};
use crate::stats::BuildStats;
use crate::types::{NodeId, PrimitiveIndex};
use crate::volume::BoundingVolume;

/// A node handed to a [`NodeSink`].
#[derive(Clone, Debug)]
pub(crate) struct NodeInfo<B> {
    /// Slot the node would occupy in a complete binary tree.
    pub(crate) id: NodeId,
    pub(crate) depth: u32,
    /// Position of the node's first primitive in the partition array.
    pub(crate) start: usize,
    pub(crate) bound: B,
}

/// Receives finished nodes, children before parents.
pub(crate) trait NodeSink<B> {
    /// What the recursion hands back up for a finished subtree.
    type Node;

    /// Accept a leaf. `primitives` is the leaf's range of the final partition array.
    fn leaf(
        &mut self,
        node: NodeInfo<B>,
        primitives: &[PrimitiveIndex],
    ) -> Result<Self::Node, BuildError>;

    /// Accept an interior node. `primitives` is the node's range of the final
    /// partition array, which by now is the concatenation of its children's ranges.
    fn interior(
        &mut self,
        node: NodeInfo<B>,
        primitives: &[PrimitiveIndex],
        children: [Self::Node; 2],
    ) -> Result<Self::Node, BuildError>;
}

/// Per-build state set up before recursion starts.
#[derive(Debug)]
pub(crate) struct Prepared {
    pub(crate) centroids: CentroidTable,
    pub(crate) buffers: PartitionBuffers,
    pub(crate) termination: Termination,
}

impl Prepared {
    /// Validate `options`, compute the centroid table and seed the partition buffers.
    ///
    /// Fails before any recursion happens, so an error never leaves a partial tree.
    pub(crate) fn new<S: PrimitiveSource + ?Sized>(
        source: &S,
        options: &BuildOptions,
    ) -> Result<Self, BuildError> {
        let termination = options.termination(source.count())?;
        let centroids = CentroidTable::compute(source)?;
        let buffers = PartitionBuffers::identity(centroids.len())?;
        Ok(Self {
            centroids,
            buffers,
            termination,
        })
    }
}

/// Recursion state of one build.
pub(crate) struct HierarchyBuilder<'a, S: ?Sized, A> {
    source: &'a S,
    strategy: &'a A,
    centroids: &'a CentroidTable,
    termination: Termination,
    positions: Vec<Vec3>,
    marks: VertexMarks,
    splitter: MedianSplit,
    stats: BuildStats,
}

impl<S: ?Sized, A> core::fmt::Debug for HierarchyBuilder<'_, S, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HierarchyBuilder")
            .field("termination", &self.termination)
            .field("primitives", &self.centroids.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<'a, S: PrimitiveSource + ?Sized, A> HierarchyBuilder<'a, S, A> {
    pub(crate) fn new(
        source: &'a S,
        strategy: &'a A,
        centroids: &'a CentroidTable,
        termination: Termination,
    ) -> Result<Self, BuildError> {
        let count = centroids.len();
        let mut positions = Vec::new();
        positions
            .try_reserve_exact(count.saturating_mul(MAX_CORNERS))
            .map_err(|error| BuildError::Allocation {
                what: "position scratch",
                error,
            })?;
        Ok(Self {
            source,
            strategy,
            centroids,
            termination,
            positions,
            marks: VertexMarks::with_vertex_count(source.vertex_count())?,
            splitter: MedianSplit::with_capacity(count)?,
            stats: BuildStats::default(),
        })
    }

    /// Build the whole hierarchy over `buffers`, leaving the final permutation in
    /// the primary buffer. Returns the root and the collected counters.
    pub(crate) fn run<B, K>(
        mut self,
        sink: &mut K,
        buffers: &mut PartitionBuffers,
    ) -> Result<(K::Node, BuildStats), BuildError>
    where
        B: BoundingVolume,
        A: AxisStrategy<B>,
        K: NodeSink<B>,
    {
        let (primary, scratch) = buffers.split_mut();
        let root = self.node(sink, NodeId::ROOT, 0, 0, primary, scratch, true)?;
        self.stats.vertex_visits = self.marks.visits();
        Ok((root, self.stats))
    }

    /// Build the subtree whose primitives currently sit in `input`.
    ///
    /// `input` and `output` are the node's ranges in the two partition buffers;
    /// `input_is_primary` tells which of them belongs to the primary buffer.
    fn node<B, K>(
        &mut self,
        sink: &mut K,
        id: NodeId,
        depth: u32,
        start: usize,
        input: &mut [PrimitiveIndex],
        output: &mut [PrimitiveIndex],
        input_is_primary: bool,
    ) -> Result<K::Node, BuildError>
    where
        B: BoundingVolume,
        A: AxisStrategy<B>,
        K: NodeSink<B>,
    {
        let len = input.len();
        assert!(len > 0, "node range must not be empty or inverted");

        self.positions.clear();
        self.source
            .gather_positions(input, &mut self.marks, &mut self.positions);
        self.stats.fitted_positions += self.positions.len();
        let mut bound = B::default();
        bound.fit(&self.positions);

        if self.termination.is_leaf(depth, len) {
            // The final partition array is the primary buffer.
            if !input_is_primary {
                output.copy_from_slice(input);
            }
            self.stats.record_leaf(depth);
            let primitives = if input_is_primary { &*input } else { &*output };
            let info = NodeInfo {
                id,
                depth,
                start,
                bound,
            };
            return sink.leaf(info, primitives);
        }

        let axis = self.strategy.splitting_axis(&self.positions, &bound);
        let low = self.splitter.split(self.centroids, &axis, input, output);
        self.stats.record_split(len);
        log::trace!(
            "split depth={depth} start={start} len={len} low={low} high={}",
            len - low
        );

        let (in_low, in_high) = input.split_at_mut(low);
        let (out_low, out_high) = output.split_at_mut(low);
        let left = self.node(
            sink,
            id.left(),
            depth + 1,
            start,
            out_low,
            in_low,
            !input_is_primary,
        )?;
        let right = self.node(
            sink,
            id.right(),
            depth + 1,
            start + low,
            out_high,
            in_high,
            !input_is_primary,
        )?;

        let primitives = if input_is_primary { &*input } else { &*output };
        let info = NodeInfo {
            id,
            depth,
            start,
            bound,
        };
        sink.interior(info, primitives, [left, right])
    }
}
