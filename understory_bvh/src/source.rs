// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive sources: the geometry a hierarchy is built over.
//!
//! A [`PrimitiveSource`] is an immutable collection of points, segments, or
//! triangles addressed by [`PrimitiveIndex`]. The builder asks it for two things:
//!
//! - each primitive's corners, once per build, to derive its centroid;
//! - the vertex positions of a subset of primitives, once per node, to fit a
//!   bounding volume and choose a splitting axis.
//!
//! Indexed sources emit each shared vertex once per subset. They track which
//! vertices a gather has already emitted in [`VertexMarks`], a per-build stamp
//! buffer, so deduplication is linear in the subset size.

use alloc::vec::Vec;

use glam::Vec3;

use crate::error::{BuildError, SourceError};
use crate::types::PrimitiveIndex;

/// Most corners any stock primitive has.
pub(crate) const MAX_CORNERS: usize = 3;

/// One primitive with its corner positions resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A single point.
    Point(Vec3),
    /// A line segment given by its two endpoints.
    Segment([Vec3; 2]),
    /// A triangle given by its three corners.
    Triangle([Vec3; 3]),
}

impl Primitive {
    /// The corner positions: one for a point, two for a segment, three for a triangle.
    pub fn corners(&self) -> &[Vec3] {
        match self {
            Self::Point(p) => core::slice::from_ref(p),
            Self::Segment(s) => s,
            Self::Triangle(t) => t,
        }
    }

    /// Representative point used to decide which side of a split the primitive falls on.
    ///
    /// The point itself, the segment midpoint, or the mean of the triangle corners.
    pub fn centroid(&self) -> Vec3 {
        match self {
            Self::Point(p) => *p,
            Self::Segment([a, b]) => (*a + *b) * 0.5,
            Self::Triangle([a, b, c]) => (*a + *b + *c) / 3.0,
        }
    }
}

/// Read-only access to the primitives a hierarchy indexes.
///
/// Implementations must answer consistently for the whole duration of a build;
/// any change to the underlying geometry requires building a new tree.
pub trait PrimitiveSource {
    /// Number of primitives. Valid indices are `0..count()`.
    fn count(&self) -> usize;

    /// The primitive at `index`. `index` is always below [`count`](Self::count).
    fn primitive(&self, index: PrimitiveIndex) -> Primitive;

    /// Length of the shared vertex buffer, for sources that index one.
    ///
    /// The builder sizes its [`VertexMarks`] from this once per build. Sources
    /// without shared vertices keep the default of zero.
    fn vertex_count(&self) -> usize {
        0
    }

    /// Append the vertex positions of `primitives` to `out`.
    ///
    /// The default appends every corner of every listed primitive and leaves
    /// `marks` alone. Indexed sources override this to emit each shared vertex
    /// once, using `marks` to remember what the current gather already emitted.
    fn gather_positions(
        &self,
        primitives: &[PrimitiveIndex],
        _marks: &mut VertexMarks,
        out: &mut Vec<Vec3>,
    ) {
        for &index in primitives {
            out.extend_from_slice(self.primitive(index).corners());
        }
    }
}

/// Per-build scratch that lets an indexed source emit each vertex once per gather.
///
/// Every vertex carries the stamp of the last gather that emitted it. Starting a
/// gather bumps the current stamp, so nothing is cleared or sorted between nodes.
#[derive(Clone, Debug, Default)]
pub struct VertexMarks {
    stamps: Vec<u32>,
    current: u32,
    visits: usize,
}

impl VertexMarks {
    /// Empty marks; they grow on the first gather.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks for a vertex buffer of `vertex_count` entries, reserved up front.
    pub fn with_vertex_count(vertex_count: usize) -> Result<Self, BuildError> {
        let mut stamps = Vec::new();
        stamps
            .try_reserve_exact(vertex_count)
            .map_err(|error| BuildError::Allocation {
                what: "vertex marks",
                error,
            })?;
        stamps.resize(vertex_count, 0);
        Ok(Self {
            stamps,
            current: 0,
            visits: 0,
        })
    }

    /// Start a new gather over a buffer of `vertex_count` vertices.
    pub fn begin(&mut self, vertex_count: usize) {
        if self.stamps.len() < vertex_count {
            self.stamps.resize(vertex_count, 0);
        }
        if self.current == u32::MAX {
            self.stamps.fill(0);
            self.current = 0;
        }
        self.current += 1;
    }

    /// Mark `vertex`, returning whether the current gather sees it for the first time.
    ///
    /// # Panics
    ///
    /// If `vertex` is beyond the `vertex_count` passed to [`begin`](Self::begin).
    pub fn first_visit(&mut self, vertex: u32) -> bool {
        self.visits += 1;
        let stamp = &mut self.stamps[vertex as usize];
        let first = *stamp != self.current;
        *stamp = self.current;
        first
    }

    /// Vertex references checked by [`first_visit`](Self::first_visit) so far.
    pub fn visits(&self) -> usize {
        self.visits
    }
}

impl PrimitiveSource for [Vec3] {
    fn count(&self) -> usize {
        self.len()
    }

    fn primitive(&self, index: PrimitiveIndex) -> Primitive {
        Primitive::Point(self[index.get()])
    }

    fn gather_positions(
        &self,
        primitives: &[PrimitiveIndex],
        _marks: &mut VertexMarks,
        out: &mut Vec<Vec3>,
    ) {
        out.extend(primitives.iter().map(|i| self[i.get()]));
    }
}

/// A set of point primitives.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Vec3>,
}

impl PointCloud {
    /// Wrap a list of points; point `i` becomes primitive `i`.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// The points.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

impl PrimitiveSource for PointCloud {
    fn count(&self) -> usize {
        self.points.len()
    }

    fn primitive(&self, index: PrimitiveIndex) -> Primitive {
        Primitive::Point(self.points[index.get()])
    }

    fn gather_positions(
        &self,
        primitives: &[PrimitiveIndex],
        marks: &mut VertexMarks,
        out: &mut Vec<Vec3>,
    ) {
        self.points
            .as_slice()
            .gather_positions(primitives, marks, out);
    }
}

/// Line segments sharing an indexed vertex buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentMesh {
    vertices: Vec<Vec3>,
    segments: Vec<[u32; 2]>,
}

impl SegmentMesh {
    /// Create a segment mesh, checking that every segment refers to existing vertices.
    pub fn new(vertices: Vec<Vec3>, segments: Vec<[u32; 2]>) -> Result<Self, SourceError> {
        validate_indices(vertices.len(), &segments)?;
        Ok(Self { vertices, segments })
    }

    /// The shared vertex buffer.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Vertex index pairs, one per segment.
    pub fn segments(&self) -> &[[u32; 2]] {
        &self.segments
    }
}

impl PrimitiveSource for SegmentMesh {
    fn count(&self) -> usize {
        self.segments.len()
    }

    fn primitive(&self, index: PrimitiveIndex) -> Primitive {
        let [a, b] = self.segments[index.get()];
        Primitive::Segment([self.vertices[a as usize], self.vertices[b as usize]])
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn gather_positions(
        &self,
        primitives: &[PrimitiveIndex],
        marks: &mut VertexMarks,
        out: &mut Vec<Vec3>,
    ) {
        gather_unique(&self.vertices, &self.segments, primitives, marks, out);
    }
}

/// Triangles sharing an indexed vertex buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a triangle mesh, checking that every triangle refers to existing vertices.
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self, SourceError> {
        validate_indices(vertices.len(), &triangles)?;
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// The shared vertex buffer.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Vertex index triples, one per triangle.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }
}

impl PrimitiveSource for TriangleMesh {
    fn count(&self) -> usize {
        self.triangles.len()
    }

    fn primitive(&self, index: PrimitiveIndex) -> Primitive {
        let [a, b, c] = self.triangles[index.get()];
        Primitive::Triangle([
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ])
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn gather_positions(
        &self,
        primitives: &[PrimitiveIndex],
        marks: &mut VertexMarks,
        out: &mut Vec<Vec3>,
    ) {
        gather_unique(&self.vertices, &self.triangles, primitives, marks, out);
    }
}

fn validate_indices<const N: usize>(
    vertex_count: usize,
    elements: &[[u32; N]],
) -> Result<(), SourceError> {
    for (primitive, element) in elements.iter().enumerate() {
        if let Some(&vertex) = element.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(SourceError::VertexOutOfRange {
                primitive,
                vertex,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Append each vertex referenced by `primitives` exactly once, in order of first reference.
fn gather_unique<const N: usize>(
    vertices: &[Vec3],
    elements: &[[u32; N]],
    primitives: &[PrimitiveIndex],
    marks: &mut VertexMarks,
    out: &mut Vec<Vec3>,
) {
    marks.begin(vertices.len());
    for &index in primitives {
        for &vertex in &elements[index.get()] {
            if marks.first_visit(vertex) {
                out.push(vertices[vertex as usize]);
            }
        }
    }
}
