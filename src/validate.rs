//! Invariant checks
//!
//! These walk the whole tree and are meant for tests and debugging. They
//! report the first violation found.
#![allow(unsafe_op_in_unsafe_fn)]
use core::{cmp::Ordering, ptr::NonNull};

use crate::{
    link::{Color, Dir, Links},
    root::Root,
    standard::Node,
};


/// A broken tree invariant.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum InvariantViolation {
    #[cfg_attr(feature = "std", error("the root is red"))]
    RedRoot,
    #[cfg_attr(feature = "std", error("a red node has a red child"))]
    RedRedEdge,
    /// The two subtrees of a node have different black heights.
    #[cfg_attr(
        feature = "std",
        error("black height mismatch (left: {left}, right: {right})")
    )]
    BlackHeightMismatch { left: usize, right: usize },
    /// An in-order neighbor pair is not strictly ascending.
    #[cfg_attr(feature = "std", error("nodes are out of order"))]
    OutOfOrder,
    #[cfg_attr(feature = "std", error("a parent link does not point to the parent"))]
    BrokenParentLink,
}

/// Check the coloring and return the black height (`0` for an empty tree).
///
/// # Safety
///
///  - The tree and all included nodes must be (still) valid.
///  - All traversed nodes are considered to be borrowed throughout the
///    duration of the function call.
///
pub unsafe fn black_height<N: Links>(root: &Root<N>) -> Result<usize, InvariantViolation> {
    match root.node {
        None => Ok(0),
        Some(node) if node.as_ref().color() == Color::Red => Err(InvariantViolation::RedRoot),
        Some(node) => subtree_black_height(node),
    }
}

unsafe fn subtree_black_height<N: Links>(node: NonNull<N>) -> Result<usize, InvariantViolation> {
    let node = node.as_ref();
    let mut heights = [0; 2];
    for dir in [Dir::Left, Dir::Right] {
        if let Some(child) = node.child(dir) {
            if node.color() == Color::Red && child.as_ref().color() == Color::Red {
                return Err(InvariantViolation::RedRedEdge);
            }
            heights[dir.index()] = subtree_black_height(child)?;
        }
    }

    let [left, right] = heights;
    if left != right {
        return Err(InvariantViolation::BlackHeightMismatch { left, right });
    }

    Ok(left + (node.color() == Color::Black) as usize)
}

/// Check that an in-order walk visits nodes in strictly ascending order
/// according to `cmp`. Returns the number of nodes.
///
/// # Safety
///
/// See [`black_height`].
pub unsafe fn check_order<N: Links>(
    root: &Root<N>,
    mut cmp: impl FnMut(NonNull<N>, NonNull<N>) -> Ordering,
) -> Result<usize, InvariantViolation> {
    let mut prev = None;
    let mut count = 0;
    walk_in_order(root.node, &mut |node| {
        if let Some(prev) = prev {
            if cmp(prev, node) != Ordering::Less {
                return Err(InvariantViolation::OutOfOrder);
            }
        }
        prev = Some(node);
        count += 1;
        Ok(())
    })?;
    Ok(count)
}

unsafe fn walk_in_order<N: Links>(
    node: Option<NonNull<N>>,
    f: &mut impl FnMut(NonNull<N>) -> Result<(), InvariantViolation>,
) -> Result<(), InvariantViolation> {
    if let Some(node) = node {
        walk_in_order(node.as_ref().child(Dir::Left), f)?;
        f(node)?;
        walk_in_order(node.as_ref().child(Dir::Right), f)?;
    }
    Ok(())
}

/// Check that every parent link of a [`Node`] tree points to the node's
/// actual parent.
///
/// # Safety
///
/// See [`black_height`].
pub unsafe fn check_parent_links(root: &Root<Node>) -> Result<(), InvariantViolation> {
    guard::guard!(let Some(node) = root.node else { return Ok(()); });
    if node.as_ref().parent().is_some() {
        return Err(InvariantViolation::BrokenParentLink);
    }
    check_children_parents(node)
}

unsafe fn check_children_parents(node: NonNull<Node>) -> Result<(), InvariantViolation> {
    for dir in [Dir::Left, Dir::Right] {
        if let Some(child) = node.as_ref().child(dir) {
            if child.as_ref().parent() != Some(node) {
                return Err(InvariantViolation::BrokenParentLink);
            }
            check_children_parents(child)?;
        }
    }
    Ok(())
}
