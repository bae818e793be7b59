// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view shared by both tree forms.
//!
//! Query and traversal code written against [`Hierarchy`] works unchanged over a
//! [`FlatBVH`] or a [`LinkedBVH`]. Everything here borrows the tree immutably, so
//! any number of readers can walk a finished tree at once.

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::flat::{FlatBVH, FlatNode};
use crate::linked::{LinkedBVH, LinkedNode};
use crate::types::PrimitiveIndex;

/// A finished bounding volume hierarchy.
pub trait Hierarchy {
    /// Bounding volume type stored on every node.
    type Bound;

    /// Cheap handle to one node.
    type Node<'a>: Copy
    where
        Self: 'a;

    /// The root node.
    fn root(&self) -> Self::Node<'_>;

    /// Bounding volume of `node`.
    fn bound<'a>(&'a self, node: Self::Node<'a>) -> &'a Self::Bound;

    /// Left and right child of `node`, or `None` for a leaf.
    fn children<'a>(&'a self, node: Self::Node<'a>) -> Option<[Self::Node<'a>; 2]>;

    /// Primitives listed on `node`.
    ///
    /// Always the complete list for leaves. Interior nodes of a [`LinkedBVH`]
    /// built without interior lists report an empty slice.
    fn primitives<'a>(&'a self, node: Self::Node<'a>) -> &'a [PrimitiveIndex];

    /// Pre-order walk yielding every node with its depth, left subtrees first.
    fn depth_first(&self) -> DepthFirst<'_, Self> {
        DepthFirst {
            tree: self,
            stack: Vec::from([(self.root(), 0)]),
        }
    }

    /// Leaves from left to right.
    fn leaves(&self) -> impl Iterator<Item = Self::Node<'_>> {
        self.depth_first()
            .filter_map(|(node, _)| self.children(node).is_none().then_some(node))
    }

    /// Concatenated primitive lists of all leaves from left to right.
    ///
    /// Every primitive of the source appears exactly once.
    fn leaf_primitives(&self) -> impl Iterator<Item = PrimitiveIndex> {
        self.leaves()
            .flat_map(|node| self.primitives(node).iter().copied())
    }
}

/// Iterator returned by [`Hierarchy::depth_first`].
pub struct DepthFirst<'a, H: Hierarchy + ?Sized + 'a> {
    tree: &'a H,
    stack: Vec<(H::Node<'a>, u32)>,
}

impl<'a, H: Hierarchy + ?Sized + 'a> Iterator for DepthFirst<'a, H> {
    type Item = (H::Node<'a>, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if let Some([left, right]) = self.tree.children(node) {
            self.stack.push((right, depth + 1));
            self.stack.push((left, depth + 1));
        }
        Some((node, depth))
    }
}

impl<H: Hierarchy + ?Sized> Debug for DepthFirst<'_, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DepthFirst")
            .field("pending", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl<B> Hierarchy for FlatBVH<B> {
    type Bound = B;
    type Node<'a>
        = &'a FlatNode<B>
    where
        Self: 'a;

    fn root(&self) -> &FlatNode<B> {
        Self::root(self)
    }

    fn bound<'a>(&'a self, node: &'a FlatNode<B>) -> &'a B {
        node.bound()
    }

    fn children<'a>(&'a self, node: &'a FlatNode<B>) -> Option<[&'a FlatNode<B>; 2]> {
        let [l, r] = node.children()?;
        Some([self.node(l)?, self.node(r)?])
    }

    fn primitives<'a>(&'a self, node: &'a FlatNode<B>) -> &'a [PrimitiveIndex] {
        &self.partition()[node.range()]
    }
}

impl<B> Hierarchy for LinkedBVH<B> {
    type Bound = B;
    type Node<'a>
        = &'a LinkedNode<B>
    where
        Self: 'a;

    fn root(&self) -> &LinkedNode<B> {
        Self::root(self)
    }

    fn bound<'a>(&'a self, node: &'a LinkedNode<B>) -> &'a B {
        node.bound()
    }

    fn children<'a>(&'a self, node: &'a LinkedNode<B>) -> Option<[&'a LinkedNode<B>; 2]> {
        node.children().map(|[l, r]| [l, r])
    }

    fn primitives<'a>(&'a self, node: &'a LinkedNode<B>) -> &'a [PrimitiveIndex] {
        node.primitives()
    }
}
