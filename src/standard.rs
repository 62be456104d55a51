//! Nodes that link to their parent
//!
//! A [`Node`] has four fields: a color and three links. Because every node
//! knows its parent, finding the neighbors of a node and removing a node need
//! nothing but the node itself.
#![allow(unsafe_op_in_unsafe_fn)]
use core::{cmp::Ordering, fmt, marker::PhantomPinned, ptr::NonNull};

use crate::{
    engine,
    link::{Ancestry, Color, Dir, Layout, Links, Step},
    root::Root,
};


/// A node, meant to be embedded in a record.
///
/// The operation functions mutate linked nodes behind a raw pointer. This is
/// obviously `!Unpin`.
pub struct Node {
    children: [Option<NonNull<Self>>; 2],
    parent: Option<NonNull<Self>>,
    color: Color,
    _pin: PhantomPinned,
}

impl Node {
    /// An unlinked node.
    pub const fn new() -> Self {
        Self {
            children: [None, None],
            parent: None,
            color: Color::Black,
            _pin: PhantomPinned,
        }
    }

    /// Meaningful only while the node is linked.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Meaningful only while the node is linked.
    #[inline]
    pub fn child(&self, dir: Dir) -> Option<NonNull<Self>> {
        self.children[dir.index()]
    }

    /// Meaningful only while the node is linked.
    #[inline]
    pub fn parent(&self) -> Option<NonNull<Self>> {
        self.parent
    }
}

impl Default for Node {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("children", &self.children)
            .field("parent", &self.parent)
            .field("color", &self.color)
            .finish()
    }
}

unsafe impl Links for Node {
    #[inline]
    fn child(&self, dir: Dir) -> Option<NonNull<Self>> {
        self.children[dir.index()]
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Option<NonNull<Self>>) {
        self.children[dir.index()] = child;
    }

    #[inline]
    fn color(&self) -> Color {
        self.color
    }

    #[inline]
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    #[inline]
    fn set_parent(&mut self, parent: Option<NonNull<Self>>) {
        self.parent = parent;
    }
}

/// The [`Ancestry`] of [`Node`], backed by the parent links.
///
/// It only remembers the parent of the focus. Everything above that is read
/// from the nodes when needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parents {
    above: Option<Step<Node>>,
}

impl Parents {
    /// Focus on the root slot.
    pub const fn new() -> Self {
        Self { above: None }
    }

    /// Focus on `node`.
    ///
    /// # Safety
    ///
    /// `node` and its parent must be (still) valid.
    #[inline]
    pub unsafe fn of(node: NonNull<Node>) -> Self {
        Self {
            above: node
                .as_ref()
                .parent
                .map(|parent| (parent, Self::side_of(parent, node))),
        }
    }

    #[inline]
    unsafe fn side_of(parent: NonNull<Node>, node: NonNull<Node>) -> Dir {
        if parent.as_ref().children[1] == Some(node) {
            Dir::Right
        } else {
            debug_assert_eq!(parent.as_ref().children[0], Some(node));
            Dir::Left
        }
    }
}

unsafe impl Ancestry<Node> for Parents {
    #[inline]
    unsafe fn peek(&self) -> Option<Step<Node>> {
        self.above
    }

    #[inline]
    unsafe fn pop(&mut self) -> Option<Step<Node>> {
        let step = self.above?;
        *self = Self::of(step.0);
        Some(step)
    }

    #[inline]
    unsafe fn push(&mut self, node: NonNull<Node>, dir: Dir) {
        self.above = Some((node, dir));
    }

    #[inline]
    unsafe fn replace(&mut self, old: NonNull<Node>, new: NonNull<Node>) {
        if let Some((parent, _)) = &mut self.above {
            if *parent == old {
                *parent = new;
            }
        }
    }

    #[inline]
    fn clear(&mut self) {
        self.above = None;
    }
}

unsafe impl Layout for Node {
    type Path = Parents;

    #[inline]
    unsafe fn seek(path: &mut Parents, node: NonNull<Self>) {
        *path = Parents::of(node);
    }
}

impl Node {
    /// Insert `new_node` to a tree. `cmp` determines the ordering between
    /// `new_node` and a given existing node.
    ///
    /// If there's a node that compares equal to `new_node`, the tree is left
    /// untouched and that node is returned.
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - `new_node` must not be already included in the tree. (If it's already
    ///    part of another tree, that tree will be corrupted.)
    ///  - All existing nodes in the tree and `new_node` are considered to be
    ///    mutably borrowed throughout the duration of the function call.
    ///
    pub unsafe fn insert(
        root: &mut Root<Self>,
        new_node: NonNull<Self>,
        cmp: impl FnMut(NonNull<Self>) -> Ordering,
    ) -> Option<NonNull<Self>> {
        let mut parents = Parents::new();
        if let Some(existing) = engine::descend(&root.node, &mut parents, cmp) {
            return Some(existing);
        }
        engine::link(&mut root.node, &mut parents, new_node);
        None
    }

    /// Remove `node` from a tree.
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - `node` must be already included in the tree.
    ///  - All existing nodes in the tree are considered to be mutably
    ///    borrowed throughout the duration of the function call.
    ///
    pub unsafe fn remove(root: &mut Root<Self>, node: NonNull<Self>) {
        let mut parents = Parents::of(node);
        engine::unlink(&mut root.node, &mut parents, node);
    }

    /// Find a node. `cmp` tells where the wanted node lies relative to a given
    /// node (`Less` if the wanted node precedes it).
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - All traversed nodes are considered to be borrowed throughout the
    ///    duration of the function call.
    ///
    pub unsafe fn find(
        root: &Root<Self>,
        cmp: impl FnMut(NonNull<Self>) -> Ordering,
    ) -> Option<NonNull<Self>> {
        engine::descend(&root.node, &mut Parents::new(), cmp)
    }

    /// Find the minimum (leftmost) node in the subtree rooted by `this`.
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - All traversed nodes are considered to be borrowed throughout the
    ///    duration of the function call.
    ///
    #[inline]
    pub unsafe fn min(this: NonNull<Self>) -> NonNull<Self> {
        engine::extreme(this, Dir::Left, &mut Parents::new())
    }

    /// Find the maximum (rightmost) node in the subtree rooted by `this`.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    #[inline]
    pub unsafe fn max(this: NonNull<Self>) -> NonNull<Self> {
        engine::extreme(this, Dir::Right, &mut Parents::new())
    }

    /// The minimum node of a tree.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    #[inline]
    pub unsafe fn first(root: &Root<Self>) -> Option<NonNull<Self>> {
        root.node.map(|node| Self::min(node))
    }

    /// The maximum node of a tree.
    ///
    /// # Safety
    ///
    /// See [`Self::min`].
    #[inline]
    pub unsafe fn last(root: &Root<Self>) -> Option<NonNull<Self>> {
        root.node.map(|node| Self::max(node))
    }

    /// Find the in-order successor of `this`.
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - All traversed nodes are considered to be borrowed throughout the
    ///    duration of the function call.
    ///
    #[inline]
    pub unsafe fn successor(this: NonNull<Self>) -> Option<NonNull<Self>> {
        engine::step(this, Dir::Right, &mut Parents::of(this))
    }

    /// Find the in-order predecessor of `this`.
    ///
    /// # Safety
    ///
    /// See [`Self::successor`].
    #[inline]
    pub unsafe fn predecessor(this: NonNull<Self>) -> Option<NonNull<Self>> {
        engine::step(this, Dir::Left, &mut Parents::of(this))
    }
}
