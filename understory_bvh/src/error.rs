// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by primitive sources and by tree construction.

use alloc::collections::TryReserveError;

/// Reasons a hierarchy build is refused or abandoned.
///
/// A build that returns an error commits nothing: no partially built tree is
/// ever handed back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The primitive source holds no primitives.
    #[error("cannot build a hierarchy over an empty primitive source")]
    EmptySource,
    /// `max_leaf_size` was zero; every leaf must own at least one primitive.
    #[error("max_leaf_size must be at least 1")]
    InvalidLeafSize,
    /// The source has more primitives than a 32-bit primitive index can name.
    #[error("{count} primitives exceed the 32-bit primitive index range")]
    TooManyPrimitives {
        /// Primitive count reported by the source.
        count: usize,
    },
    /// `2^(height + 1) - 1` arena slots do not fit in `usize` on this target.
    #[error("a tree of height {height} needs more nodes than usize can count")]
    NodeCountOverflow {
        /// Effective height after clamping.
        height: u32,
    },
    /// Reserving storage for the build failed.
    #[error("failed to allocate {what}: {error}")]
    Allocation {
        /// Which buffer could not be allocated.
        what: &'static str,
        /// The allocator's report.
        error: TryReserveError,
    },
}

/// Problems found while validating an indexed primitive source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// A primitive refers to a vertex that does not exist.
    #[error("primitive {primitive} refers to vertex {vertex} of {vertex_count}")]
    VertexOutOfRange {
        /// Offending primitive.
        primitive: usize,
        /// Offending vertex index.
        vertex: u32,
        /// Number of vertices in the source.
        vertex_count: usize,
    },
}
