//! Nodes without a parent link
//!
//! A [`CompactNode`] has three fields: a color and two child links, saving one
//! pointer per node compared to [`crate::standard::Node`]. The price is that
//! every operation that needs to walk upward (finding a neighbor, removing a
//! node) takes a caller-supplied [`Path`] that records the route from the root
//! to the node in question.
//!
//! # Paths
//!
//! A path is valid for exactly one position in one snapshot of a tree. It is
//! produced by [`CompactNode::find`], [`CompactNode::first`], or
//! [`CompactNode::last`] and kept up to date by [`CompactNode::next`] and
//! [`CompactNode::prev`]. Any mutation of the tree invalidates every path
//! except the one passed to the mutating call, which is cleared.
#![allow(unsafe_op_in_unsafe_fn)]
use core::{cmp::Ordering, fmt, marker::PhantomPinned, mem::MaybeUninit, ptr::NonNull};

use crate::{
    engine,
    link::{Ancestry, Color, Dir, Layout, Links, Step},
    root::Root,
};


/// The default capacity of [`Path`]. Enough for any tree that fits in the
/// address space.
pub const DEFAULT_DEPTH: usize = 2 * usize::BITS as usize;

/// The path capacity needed for a tree of up to `len` nodes,
/// `2 * ceil(log2(len + 1))`.
///
/// ```
/// assert_eq!(rbnest::compact::depth_for(0), 0);
/// assert_eq!(rbnest::compact::depth_for(1), 2);
/// assert_eq!(rbnest::compact::depth_for(10), 8);
/// assert_eq!(rbnest::compact::depth_for(1000), 20);
/// ```
pub const fn depth_for(len: usize) -> usize {
    // ceil(log2(len + 1)) == bit_length(len)
    2 * (usize::BITS - len.leading_zeros()) as usize
}

/// A node without a parent link, meant to be embedded in a record.
///
/// The operation functions mutate linked nodes behind a raw pointer. This is
/// obviously `!Unpin`.
pub struct CompactNode {
    children: [Option<NonNull<Self>>; 2],
    color: Color,
    _pin: PhantomPinned,
}

impl CompactNode {
    /// An unlinked node.
    pub const fn new() -> Self {
        Self {
            children: [None, None],
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
}

impl Default for CompactNode {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompactNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompactNode")
            .field("children", &self.children)
            .field("color", &self.color)
            .finish()
    }
}

unsafe impl Links for CompactNode {
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
    fn set_parent(&mut self, _parent: Option<NonNull<Self>>) {}
}

/// A traversal path: the ancestors of a position in a tree of
/// [`CompactNode`]s, each with the side taken from it, root first.
///
/// `DEPTH` bounds the number of ancestors. A tree of up to `n` nodes needs
/// [`depth_for`]`(n)`. Exceeding it panics.
pub struct Path<const DEPTH: usize = DEFAULT_DEPTH> {
    steps: [MaybeUninit<Step<CompactNode>>; DEPTH],
    len: usize,
}

impl<const DEPTH: usize> Path<DEPTH> {
    /// A path focusing on the root slot.
    pub const fn new() -> Self {
        Self {
            // Safety: An array of `MaybeUninit` doesn't need initialization
            steps: unsafe { MaybeUninit::uninit().assume_init() },
            len: 0,
        }
    }

    /// The number of recorded ancestors.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the focus is the root slot (or the traversal ran off
    /// the end of the tree).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn steps(&self) -> &[MaybeUninit<Step<CompactNode>>] {
        &self.steps[..self.len]
    }
}

impl<const DEPTH: usize> Default for Path<DEPTH> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEPTH: usize> fmt::Debug for Path<DEPTH> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            // Safety: The first `len` steps are initialized
            .entries(self.steps().iter().map(|step| unsafe { step.assume_init() }))
            .finish()
    }
}

unsafe impl<const DEPTH: usize> Ancestry<CompactNode> for Path<DEPTH> {
    #[inline]
    unsafe fn peek(&self) -> Option<Step<CompactNode>> {
        self.steps().last().map(|step| step.assume_init())
    }

    #[inline]
    unsafe fn pop(&mut self) -> Option<Step<CompactNode>> {
        let step = self.peek()?;
        self.len -= 1;
        Some(step)
    }

    #[inline]
    unsafe fn push(&mut self, node: NonNull<CompactNode>, dir: Dir) {
        assert!(
            self.len < DEPTH,
            "traversal path overflow (capacity {})",
            DEPTH
        );
        self.steps[self.len] = MaybeUninit::new((node, dir));
        self.len += 1;
    }

    unsafe fn replace(&mut self, old: NonNull<CompactNode>, new: NonNull<CompactNode>) {
        for step in self.steps[..self.len].iter_mut().rev() {
            let (node, dir) = step.assume_init();
            if node == old {
                *step = MaybeUninit::new((new, dir));
                return;
            }
        }
    }

    #[inline]
    fn clear(&mut self) {
        self.len = 0;
    }
}

unsafe impl Layout for CompactNode {
    type Path = Path;

    #[inline]
    unsafe fn seek(path: &mut Path, node: NonNull<Self>) {
        debug_assert!(
            path.peek().map_or(true, |(parent, dir)| parent.as_ref().child(dir) == Some(node)),
            "the path does not lead to {:?}",
            node
        );
    }
}

impl CompactNode {
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
        Self::insert_with_path(root, new_node, &mut Path::<DEFAULT_DEPTH>::new(), cmp)
    }

    /// [`Self::insert`] with a caller-supplied scratch path. The path is
    /// cleared on return.
    ///
    /// # Safety
    ///
    /// See [`Self::insert`].
    pub unsafe fn insert_with_path<const DEPTH: usize>(
        root: &mut Root<Self>,
        new_node: NonNull<Self>,
        path: &mut Path<DEPTH>,
        cmp: impl FnMut(NonNull<Self>) -> Ordering,
    ) -> Option<NonNull<Self>> {
        if let Some(existing) = engine::descend(&root.node, path, cmp) {
            path.clear();
            return Some(existing);
        }
        engine::link(&mut root.node, path, new_node);
        None
    }

    /// Remove `node` from a tree. `path` must lead to `node`. It is cleared on
    /// return.
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - `node` must be already included in the tree.
    ///  - `path` must be the route to `node` in the current state of the tree.
    ///  - All existing nodes in the tree are considered to be mutably
    ///    borrowed throughout the duration of the function call.
    ///
    pub unsafe fn remove<const DEPTH: usize>(
        root: &mut Root<Self>,
        node: NonNull<Self>,
        path: &mut Path<DEPTH>,
    ) {
        engine::unlink(&mut root.node, path, node);
    }

    /// Find a node. `cmp` tells where the wanted node lies relative to a given
    /// node (`Less` if the wanted node precedes it). On return, `path` leads
    /// to the found node (or to the empty slot where it would be).
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - All traversed nodes are considered to be borrowed throughout the
    ///    duration of the function call.
    ///
    pub unsafe fn find<const DEPTH: usize>(
        root: &Root<Self>,
        path: &mut Path<DEPTH>,
        cmp: impl FnMut(NonNull<Self>) -> Ordering,
    ) -> Option<NonNull<Self>> {
        engine::descend(&root.node, path, cmp)
    }

    /// The minimum node of a tree. On return, `path` leads to it.
    ///
    /// # Safety
    ///
    /// See [`Self::find`].
    #[inline]
    pub unsafe fn first<const DEPTH: usize>(
        root: &Root<Self>,
        path: &mut Path<DEPTH>,
    ) -> Option<NonNull<Self>> {
        engine::first(&root.node, Dir::Left, path)
    }

    /// The maximum node of a tree. On return, `path` leads to it.
    ///
    /// # Safety
    ///
    /// See [`Self::find`].
    #[inline]
    pub unsafe fn last<const DEPTH: usize>(
        root: &Root<Self>,
        path: &mut Path<DEPTH>,
    ) -> Option<NonNull<Self>> {
        engine::first(&root.node, Dir::Right, path)
    }

    /// The in-order successor of `this`, which `path` must lead to. The path
    /// follows the cursor; it is empty once the traversal runs off the end.
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - `path` must be the route to `this` in the current state of the tree.
    ///  - All traversed nodes are considered to be borrowed throughout the
    ///    duration of the function call.
    ///
    #[inline]
    pub unsafe fn next<const DEPTH: usize>(
        this: NonNull<Self>,
        path: &mut Path<DEPTH>,
    ) -> Option<NonNull<Self>> {
        engine::step(this, Dir::Right, path)
    }

    /// The in-order predecessor of `this`. See [`Self::next`].
    ///
    /// # Safety
    ///
    /// See [`Self::next`].
    #[inline]
    pub unsafe fn prev<const DEPTH: usize>(
        this: NonNull<Self>,
        path: &mut Path<DEPTH>,
    ) -> Option<NonNull<Self>> {
        engine::step(this, Dir::Left, path)
    }
}
