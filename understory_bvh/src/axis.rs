// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting-axis strategies.
//!
//! At every interior node the builder asks a strategy for a line, then projects
//! the primitives' *centroids* onto it. The strategy itself only ever sees the
//! node's *vertex positions* and its freshly fitted bound: vertices choose the
//! axis, centroids drive the split.

use glam::Vec3;

use crate::fit;
use crate::types::Axis;
use crate::volume::SplitAxisHint;

/// Chooses the line used to split a node.
pub trait AxisStrategy<B> {
    /// Splitting axis for a node whose primitives have the given vertex positions
    /// and were bounded by `bound`.
    fn splitting_axis(&self, positions: &[Vec3], bound: &B) -> Axis;
}

/// Fit the node's vertex positions with an orthogonal-regression line.
///
/// Splits across the direction of maximal positional variance, independent of the
/// bounding volume type.
#[derive(Copy, Clone, Debug, Default)]
pub struct OrthogonalLineAxis;

impl<B> AxisStrategy<B> for OrthogonalLineAxis {
    fn splitting_axis(&self, positions: &[Vec3], _bound: &B) -> Axis {
        fit::orthogonal_line(positions)
    }
}

/// Use the bounding volume's own [`SplitAxisHint`].
///
/// Cheaper than a line fit; the axis choice follows whatever volume is in use.
#[derive(Copy, Clone, Debug, Default)]
pub struct VolumeAxis;

impl<B: SplitAxisHint> AxisStrategy<B> for VolumeAxis {
    fn splitting_axis(&self, _positions: &[Vec3], bound: &B) -> Axis {
        bound.splitting_axis()
    }
}

impl<B, F> AxisStrategy<B> for F
where
    F: Fn(&[Vec3], &B) -> Axis,
{
    fn splitting_axis(&self, positions: &[Vec3], bound: &B) -> Axis {
        self(positions, bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::{Aabb3, BoundingVolume};

    fn positions() -> [Vec3; 4] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::new(3.0, 3.0, 0.0),
        ]
    }

    #[test]
    fn line_fit_ignores_bound() {
        let pts = positions();
        let axis = OrthogonalLineAxis.splitting_axis(&pts, &Aabb3::default());
        let d = axis.direction.dot(Vec3::new(1.0, 1.0, 0.0).normalize());
        assert!(d * d > 0.999, "direction {:?}", axis.direction);
        assert_eq!(axis.origin, Vec3::new(1.5, 1.5, 0.0));
    }

    #[test]
    fn volume_axis_delegates_to_hint() {
        let pts = positions();
        let mut b = Aabb3::default();
        b.fit(&pts);
        // Square footprint: ties go to x.
        assert_eq!(VolumeAxis.splitting_axis(&pts, &b), b.splitting_axis());
        assert_eq!(b.splitting_axis().direction, Vec3::X);
    }

    #[test]
    fn closures_are_strategies() {
        let fixed = |_: &[Vec3], _: &Aabb3| Axis::new(Vec3::ZERO, Vec3::Z);
        let axis = fixed.splitting_axis(&positions(), &Aabb3::default());
        assert_eq!(axis.direction, Vec3::Z);
    }
}
