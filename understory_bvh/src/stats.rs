// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Counters collected while building a hierarchy.

/// Operation counts of one build.
///
/// These are exact, deterministic counts rather than timings, so they can be
/// compared across runs and asserted on in tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Nodes that were split.
    pub interior_nodes: usize,
    /// Nodes that became leaves.
    pub leaf_nodes: usize,
    /// Greatest depth of any node; the root is at depth 0.
    pub max_depth: u32,
    /// Centroid projections performed by all median splits together.
    ///
    /// Every primitive is projected once per level it is split at, so this is
    /// bounded by `n * height`.
    pub projections: usize,
    /// Vertex positions handed to bounding volume fits, summed over all nodes.
    pub fitted_positions: usize,
    /// Vertex references checked while emitting shared vertices once per node.
    ///
    /// Each node checks every corner reference of its primitives once, so this
    /// is bounded by `corners * n * (height + 1)`. Zero for sources without a
    /// shared vertex buffer.
    pub vertex_visits: usize,
}

impl BuildStats {
    /// Total number of nodes that were built.
    pub fn node_count(&self) -> usize {
        self.interior_nodes + self.leaf_nodes
    }

    pub(crate) fn record_leaf(&mut self, depth: u32) {
        self.leaf_nodes += 1;
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn record_split(&mut self, len: usize) {
        self.interior_nodes += 1;
        self.projections += len;
    }
}
