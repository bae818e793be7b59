// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-primitive centroids, computed once per build.

use alloc::vec::Vec;

use glam::Vec3;

use crate::error::BuildError;
use crate::source::PrimitiveSource;
use crate::types::PrimitiveIndex;

/// One centroid per primitive, in primitive order.
///
/// Computed exactly once when a build starts and read-only afterwards; partition
/// steps look centroids up here instead of recomputing them per node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CentroidTable {
    centroids: Vec<Vec3>,
}

impl CentroidTable {
    /// Compute the centroid of every primitive in `source`.
    pub fn compute<S: PrimitiveSource + ?Sized>(source: &S) -> Result<Self, BuildError> {
        let count = source.count();
        let index_limit = u32::try_from(count)
            .map_err(|_| BuildError::TooManyPrimitives { count })?;
        let mut centroids = Vec::new();
        centroids
            .try_reserve_exact(count)
            .map_err(|error| BuildError::Allocation {
                what: "centroid table",
                error,
            })?;
        for i in 0..index_limit {
            centroids.push(source.primitive(PrimitiveIndex(i)).centroid());
        }
        Ok(Self { centroids })
    }

    /// Centroid of one primitive.
    #[inline]
    pub fn get(&self, index: PrimitiveIndex) -> Vec3 {
        self.centroids[index.get()]
    }

    /// Number of centroids (the primitive count).
    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// All centroids, indexed by primitive.
    pub fn as_slice(&self) -> &[Vec3] {
        &self.centroids
    }
}
