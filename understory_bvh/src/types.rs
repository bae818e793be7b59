// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small value types shared by the builder and both tree forms.

use glam::Vec3;

/// Identifier of one primitive in a [`PrimitiveSource`](crate::PrimitiveSource).
///
/// Indices are assigned by the source (`0..count`) and are never renumbered by the
/// builder; trees only permute them.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimitiveIndex(pub u32);

impl PrimitiveIndex {
    /// Wrap a raw index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The index as a `usize`, for slice access.
    pub const fn get(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for PrimitiveIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// A line used as a one-dimensional projection axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Axis {
    /// A point on the line.
    pub origin: Vec3,
    /// Direction of the line. Usually unit length; a zero direction is tolerated
    /// and collapses every projection to `0.0`.
    pub direction: Vec3,
}

impl Axis {
    /// Create an axis through `origin` along `direction`.
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Signed projection of `point` onto the axis: `direction · (point − origin)`.
    #[inline]
    pub fn project(&self, point: Vec3) -> f32 {
        self.direction.dot(point - self.origin)
    }
}

/// Slot index of a node in a [`FlatBVH`](crate::FlatBVH) arena.
///
/// The arena uses the implicit complete-binary-tree layout: the root is slot `0`
/// and the children of slot `i` are `2i + 1` and `2i + 2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root slot.
    pub const ROOT: Self = Self(0);

    /// Raw slot index into the arena.
    pub const fn get(self) -> usize {
        self.0
    }

    /// Slot of the left child.
    pub const fn left(self) -> Self {
        Self(2 * self.0 + 1)
    }

    /// Slot of the right child.
    pub const fn right(self) -> Self {
        Self(2 * self.0 + 2)
    }
}
