// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding volume contract and the stock volumes.
//!
//! The builder only needs to default-construct a volume and fit it to a set of
//! positions. Volumes that also know a good splitting direction implement
//! [`SplitAxisHint`] and can be paired with [`VolumeAxis`](crate::VolumeAxis).

use glam::Vec3;

use crate::fit;
use crate::types::Axis;

/// A bounding volume that can be fit to vertex positions.
pub trait BoundingVolume: Default + Clone {
    /// Replace `self` with a volume enclosing every position in `positions`.
    ///
    /// `positions` is never empty when called by the builder.
    fn fit(&mut self, positions: &[Vec3]);
}

/// A bounding volume that can propose a splitting axis for the positions it was fit to.
pub trait SplitAxisHint: BoundingVolume {
    /// Origin and direction of the preferred splitting line.
    fn splitting_axis(&self) -> Axis;
}

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb3 {
    /// An inverted box that contains nothing.
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    /// Create a box from its corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Whether the box is inverted (contains no point).
    pub fn is_empty(&self) -> bool {
        self.max.cmplt(self.min).any()
    }

    /// Center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether `point` lies inside the box grown by `tolerance` on every side.
    pub fn contains_point(&self, point: Vec3, tolerance: f32) -> bool {
        let t = Vec3::splat(tolerance);
        (self.min - t).cmple(point).all() && point.cmple(self.max + t).all()
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingVolume for Aabb3 {
    fn fit(&mut self, positions: &[Vec3]) {
        *self = positions.iter().fold(Self::EMPTY, |acc, p| Self {
            min: acc.min.min(*p),
            max: acc.max.max(*p),
        });
    }
}

impl SplitAxisHint for Aabb3 {
    /// The world axis along which the box is longest, through the box center.
    fn splitting_axis(&self) -> Axis {
        let size = self.size();
        let direction = if size.x >= size.y && size.x >= size.z {
            Vec3::X
        } else if size.y >= size.z {
            Vec3::Y
        } else {
            Vec3::Z
        };
        Axis::new(self.center(), direction)
    }
}

/// Bounding sphere.
///
/// Centered on the positions' box center; not minimal, but cheap and stable.
/// Spheres have no preferred direction, so they pair with a line-fit axis strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BoundingSphere {
    /// Center.
    pub center: Vec3,
    /// Radius.
    pub radius: f32,
}

impl BoundingSphere {
    /// Whether `point` lies inside the sphere grown by `tolerance`.
    pub fn contains_point(&self, point: Vec3, tolerance: f32) -> bool {
        self.center.distance(point) <= self.radius + tolerance
    }
}

impl BoundingVolume for BoundingSphere {
    fn fit(&mut self, positions: &[Vec3]) {
        let mut bbox = Aabb3::EMPTY;
        bbox.fit(positions);
        let center = bbox.center();
        self.radius = positions
            .iter()
            .map(|p| center.distance(*p))
            .fold(0.0_f32, f32::max);
        self.center = center;
    }
}

/// Oriented bounding box whose axes follow the principal directions of the fitted positions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrientedBox3 {
    /// Center of the box.
    pub center: Vec3,
    /// Orthonormal box axes, ordered by decreasing positional variance.
    pub axes: [Vec3; 3],
    /// Half-lengths along each axis.
    pub extents: Vec3,
}

impl Default for OrientedBox3 {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            axes: [Vec3::X, Vec3::Y, Vec3::Z],
            extents: Vec3::ZERO,
        }
    }
}

impl OrientedBox3 {
    /// Coordinates of `point` in the box frame, relative to the center.
    pub fn local(&self, point: Vec3) -> Vec3 {
        let d = point - self.center;
        Vec3::from_array(self.axes.map(|axis| axis.dot(d)))
    }

    /// Whether `point` lies inside the box grown by `tolerance` along every axis.
    pub fn contains_point(&self, point: Vec3, tolerance: f32) -> bool {
        let local = self.local(point);
        let limit = self.extents + Vec3::splat(tolerance);
        local.cmpge(-limit).all() && local.cmple(limit).all()
    }
}

impl BoundingVolume for OrientedBox3 {
    fn fit(&mut self, positions: &[Vec3]) {
        let mean = fit::mean(positions);
        let (axes, _) = fit::principal_axes(fit::covariance(positions, mean));
        let mut lo = Vec3::INFINITY;
        let mut hi = Vec3::NEG_INFINITY;
        for p in positions {
            let d = *p - mean;
            let local = Vec3::new(d.dot(axes[0]), d.dot(axes[1]), d.dot(axes[2]));
            lo = lo.min(local);
            hi = hi.max(local);
        }
        let mid = (lo + hi) * 0.5;
        self.center = mean + axes[0] * mid.x + axes[1] * mid.y + axes[2] * mid.z;
        self.axes = axes;
        self.extents = (hi - lo) * 0.5;
    }
}

impl SplitAxisHint for OrientedBox3 {
    /// The box axis with the largest extent, through the box center.
    fn splitting_axis(&self) -> Axis {
        let e = self.extents;
        let i = if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        };
        Axis::new(self.center, self.axes[i])
    }
}
