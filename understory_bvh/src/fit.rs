// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional statistics: mean, covariance, principal axes, and best-fit lines.
//!
//! These feed the splitting-axis heuristics and the oriented box volume. Principal
//! axes come from a cyclic Jacobi eigen decomposition of the 3×3 covariance.

use glam::{Mat3, Vec2, Vec3};

use crate::types::Axis;

/// Upper bound on Jacobi sweeps; a 3×3 matrix converges in a handful.
const MAX_SWEEPS: usize = 16;

/// Arithmetic mean of `positions`, or the origin when empty.
pub fn mean(positions: &[Vec3]) -> Vec3 {
    if positions.is_empty() {
        return Vec3::ZERO;
    }
    let sum = positions.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
    sum / positions.len() as f32
}

/// Covariance of `positions` about `center`, normalized by the number of positions.
pub fn covariance(positions: &[Vec3], center: Vec3) -> Mat3 {
    if positions.is_empty() {
        return Mat3::ZERO;
    }
    let mut cov = Mat3::ZERO;
    for p in positions {
        cov += outer(*p - center);
    }
    cov * (1.0 / positions.len() as f32)
}

/// Eigenvectors and eigenvalues of a symmetric positive semi-definite matrix.
///
/// Axes come back orthonormal and right-handed, ordered by decreasing eigenvalue;
/// equal eigenvalues keep world-axis order. A zero matrix yields the world basis
/// with zero eigenvalues.
pub fn principal_axes(cov: Mat3) -> ([Vec3; 3], Vec3) {
    let (vectors, values) = jacobi_eigen(cov);
    let mut order = [0, 1, 2];
    order.sort_unstable_by(|&i, &j| values[j].total_cmp(&values[i]).then(i.cmp(&j)));
    let [first, second, third] = order;
    let u0 = vectors[first];
    let u1 = vectors[second];
    (
        [u0, u1, u0.cross(u1)],
        Vec3::new(values[first], values[second], values[third]),
    )
}

/// Orthogonal-regression line through `positions`.
///
/// The origin is the mean and the direction is the eigenvector of the largest
/// covariance eigenvalue, the direction of maximal positional variance. For
/// coincident positions the direction falls back to the world x axis.
pub fn orthogonal_line(positions: &[Vec3]) -> Axis {
    let origin = mean(positions);
    let (axes, _) = principal_axes(covariance(positions, origin));
    Axis::new(origin, axes[0])
}

fn outer(v: Vec3) -> Mat3 {
    Mat3::from_cols(v * v.x, v * v.y, v * v.z)
}

/// Unordered eigenvectors and eigenvalues of a symmetric matrix.
fn jacobi_eigen(m: Mat3) -> ([Vec3; 3], [f32; 3]) {
    let mut a = m.to_cols_array_2d();
    let mut v = [Vec3::X, Vec3::Y, Vec3::Z];
    let scale: f32 = a.iter().flatten().map(|x| x * x).sum();
    if scale > 0.0 {
        for _ in 0..MAX_SWEEPS {
            let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
            if off <= scale * f32::EPSILON * f32::EPSILON {
                break;
            }
            for (p, q) in [(0, 1), (0, 2), (1, 2)] {
                rotate(&mut a, &mut v, p, q);
            }
        }
    }
    (v, [a[0][0], a[1][1], a[2][2]])
}

/// Zero `a[p][q]` with one Jacobi rotation and accumulate the rotation into `v`.
fn rotate(a: &mut [[f32; 3]; 3], v: &mut [Vec3; 3], p: usize, q: usize) {
    let apq = a[p][q];
    if apq == 0.0 {
        return;
    }
    // t is the smaller root of t² + 2θt − 1 = 0. Square roots go through glam so
    // they resolve to std or libm.
    let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
    let root = Vec2::new(theta, 1.0).length();
    let t = if theta >= 0.0 {
        1.0 / (theta + root)
    } else {
        -1.0 / (root - theta)
    };
    let c = 1.0 / Vec2::new(t, 1.0).length();
    let s = t * c;

    a[p][p] -= t * apq;
    a[q][q] += t * apq;
    a[p][q] = 0.0;
    a[q][p] = 0.0;
    let r = 3 - p - q;
    let (arp, arq) = (a[r][p], a[r][q]);
    a[r][p] = c * arp - s * arq;
    a[p][r] = a[r][p];
    a[r][q] = s * arp + c * arq;
    a[q][r] = a[r][q];

    let (vp, vq) = (v[p], v[q]);
    v[p] = vp * c - vq * s;
    v[q] = vp * s + vq * c;
}
