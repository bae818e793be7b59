// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Partition buffers and the median split.
//!
//! A build keeps two equally long arrays of [`PrimitiveIndex`]. At any moment the
//! node being built owns one contiguous range in both arrays: it reads its
//! primitives from the range in one buffer and writes the reordered primitives to
//! the same range in the other. Children swap the roles. Because every step only
//! touches its own ranges, sibling subtrees never share memory.
//!
//! The split itself projects each centroid onto the splitting axis and selects the
//! median rank with `select_nth_unstable_by` (linear time, no full sort). Keys are
//! ordered by projection and then by primitive index, a strict total order, so the
//! two halves depend only on the input set and the axis.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::centroid::CentroidTable;
use crate::error::BuildError;
use crate::types::{Axis, PrimitiveIndex};

/// The two ping-pong index buffers of a build.
#[derive(Clone, Debug)]
pub struct PartitionBuffers {
    primary: Vec<PrimitiveIndex>,
    scratch: Vec<PrimitiveIndex>,
}

impl PartitionBuffers {
    /// Seed `primary` with the identity permutation `0..count` and size `scratch` to match.
    pub fn identity(count: usize) -> Result<Self, BuildError> {
        let limit = u32::try_from(count)
            .map_err(|_| BuildError::TooManyPrimitives { count })?;
        let mut primary = Vec::new();
        let mut scratch = Vec::new();
        for buffer in [&mut primary, &mut scratch] {
            buffer
                .try_reserve_exact(count)
                .map_err(|error| BuildError::Allocation {
                    what: "partition buffers",
                    error,
                })?;
        }
        primary.extend((0..limit).map(PrimitiveIndex));
        scratch.resize(count, PrimitiveIndex(0));
        Ok(Self { primary, scratch })
    }

    /// Both buffers as disjoint mutable slices: `(primary, scratch)`.
    pub fn split_mut(&mut self) -> (&mut [PrimitiveIndex], &mut [PrimitiveIndex]) {
        (&mut self.primary, &mut self.scratch)
    }

    /// The primary buffer, which holds the final permutation once a build is done.
    pub fn primary(&self) -> &[PrimitiveIndex] {
        &self.primary
    }

    /// Drop the scratch buffer and keep the final permutation.
    pub fn into_primary(self) -> Vec<PrimitiveIndex> {
        self.primary
    }
}

#[derive(Copy, Clone, Debug)]
struct Projection {
    index: PrimitiveIndex,
    value: f32,
}

impl Projection {
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(self.index.cmp(&other.index))
    }
}

/// Median partitioner with a reusable projection buffer.
#[derive(Clone, Debug, Default)]
pub struct MedianSplit {
    projections: Vec<Projection>,
}

impl MedianSplit {
    /// Create a partitioner with no preallocated storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a partitioner able to split `count` primitives without reallocating.
    pub fn with_capacity(count: usize) -> Result<Self, BuildError> {
        let mut projections = Vec::new();
        projections
            .try_reserve_exact(count)
            .map_err(|error| BuildError::Allocation {
                what: "projection buffer",
                error,
            })?;
        Ok(Self { projections })
    }

    /// Split `input` around the median centroid projection onto `axis`, writing into `output`.
    ///
    /// For `n = input.len()`, the `⌈n/2⌉` primitives with the lowest keys (the median
    /// included) are written forward from `output[0]`, the remaining `⌊n/2⌋` backward
    /// from `output[n - 1]`. Returns the size of the low group. `input` is not
    /// modified and nothing outside `output` is written.
    ///
    /// # Panics
    ///
    /// If `input` is empty or the slices differ in length.
    pub fn split(
        &mut self,
        centroids: &CentroidTable,
        axis: &Axis,
        input: &[PrimitiveIndex],
        output: &mut [PrimitiveIndex],
    ) -> usize {
        assert!(!input.is_empty(), "cannot split an empty primitive range");
        assert_eq!(
            input.len(),
            output.len(),
            "input and output ranges must have the same length"
        );

        self.projections.clear();
        self.projections
            .extend(input.iter().map(|&index| Projection {
                index,
                value: axis.project(centroids.get(index)),
            }));

        let n = self.projections.len();
        let median = (n - 1) / 2;
        self.projections
            .select_nth_unstable_by(median, Projection::cmp_key);

        let (low, high) = self.projections.split_at(median + 1);
        for (slot, p) in output.iter_mut().zip(low) {
            *slot = p.index;
        }
        for (slot, p) in output.iter_mut().rev().zip(high) {
            *slot = p.index;
        }
        low.len()
    }
}
