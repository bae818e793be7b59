// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build configuration and the termination policy derived from it.

use crate::error::BuildError;

/// Hard cap on tree height; `2^(MAX_HEIGHT + 1) - 1` node slots still fit a 64-bit `usize`.
pub const MAX_HEIGHT: u32 = 31;

/// Parameters of a hierarchy build.
///
/// Both termination bounds are always in effect: a node becomes a leaf once it owns
/// at most `max_leaf_size` primitives or sits at the effective height.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Largest number of primitives a leaf may own. Must be at least 1.
    pub max_leaf_size: usize,
    /// Requested tree height (root at depth 0). `None` picks `⌈log₂ n⌉`, the depth at
    /// which median splits reach single primitives. Requests above [`MAX_HEIGHT`]
    /// are clamped.
    pub target_height: Option<u32>,
    /// Keep the primitive list of interior nodes too, not only of leaves.
    ///
    /// Only affects [`LinkedBVH`](crate::LinkedBVH); flat trees expose every node's
    /// primitives through its range in the partition array at no extra cost.
    pub store_interior_primitives: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_leaf_size: 1,
            target_height: None,
            store_interior_primitives: false,
        }
    }
}

impl BuildOptions {
    /// Set the largest leaf size.
    pub const fn with_max_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size;
        self
    }

    /// Request a tree height.
    pub const fn with_target_height(mut self, height: u32) -> Self {
        self.target_height = Some(height);
        self
    }

    /// Keep primitive lists on interior nodes.
    pub const fn with_interior_primitives(mut self, store: bool) -> Self {
        self.store_interior_primitives = store;
        self
    }

    /// Validate the options against a primitive count and resolve the termination policy.
    pub(crate) fn termination(&self, count: usize) -> Result<Termination, BuildError> {
        if count == 0 {
            return Err(BuildError::EmptySource);
        }
        if self.max_leaf_size == 0 {
            return Err(BuildError::InvalidLeafSize);
        }
        if u32::try_from(count).is_err() {
            return Err(BuildError::TooManyPrimitives { count });
        }
        let height = match self.target_height {
            None => natural_height(count).min(MAX_HEIGHT),
            Some(requested) if requested > MAX_HEIGHT => {
                log::warn!("target height {requested} clamped to {MAX_HEIGHT}");
                MAX_HEIGHT
            }
            Some(requested) => requested,
        };
        Ok(Termination {
            max_leaf_size: self.max_leaf_size,
            height,
        })
    }
}

/// `⌈log₂ count⌉`, the height at which balanced median splits reach single primitives.
///
/// Zero for `count <= 1`.
pub fn natural_height(count: usize) -> u32 {
    if count <= 1 {
        0
    } else {
        usize::BITS - (count - 1).leading_zeros()
    }
}

/// Number of slots in a complete binary tree of the given height: `2^(height + 1) - 1`.
pub fn complete_node_count(height: u32) -> Option<usize> {
    let shift = height.checked_add(1)?;
    1_usize.checked_shl(shift).map(|n| n - 1)
}

/// Resolved leaf test for one build.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Termination {
    /// Largest leaf size.
    pub max_leaf_size: usize,
    /// Effective height; nodes at this depth are leaves.
    pub height: u32,
}

impl Termination {
    /// Whether a node at `depth` owning `len` primitives is a leaf.
    #[inline]
    pub fn is_leaf(&self, depth: u32, len: usize) -> bool {
        len <= self.max_leaf_size || depth >= self.height
    }
}
