//! Link fields and the capabilities the balancing code is written against.
//!
//! A node layout implements [`Links`] (children and color) and [`Layout`]
//! (how the ancestors of a node are found). The rebalancing algorithms only
//! ever talk to these traits, so the parent-linked
//! layout ([`crate::standard`]) and the parent-less layout
//! ([`crate::compact`]) share a single implementation of every case
//! analysis.
use core::{ops::Not, ptr::NonNull};

/// The color of a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
}

/// A side of a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    #[inline]
    pub const fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl Not for Dir {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        self.flip()
    }
}

/// The link fields of a node.
///
/// # Safety
///
/// The accessors must read back exactly what the corresponding setters
/// stored. [`Links::set_parent`] must either store the parent (so that it can
/// be read back by the layout's [`Ancestry`]) or do nothing.
pub unsafe trait Links: Sized {
    fn child(&self, dir: Dir) -> Option<NonNull<Self>>;
    fn set_child(&mut self, dir: Dir, child: Option<NonNull<Self>>);
    fn color(&self) -> Color;
    fn set_color(&mut self, color: Color);
    /// Layouts without a parent field ignore this.
    fn set_parent(&mut self, parent: Option<NonNull<Self>>);
}

/// A parent and the side of it we came from.
pub type Step<N> = (NonNull<N>, Dir);

/// The knowledge of the ancestors of a position in a tree, the *focus*.
///
/// The focus is a child slot. It either holds a node or is empty, in which
/// case the focus is a place where a node could be linked. The balancing code
/// never asks a node for its parent; it asks the ancestry instead.
///
/// # Safety
///
/// `pop` must return the parent of the focus (and the side the focus hangs
/// on) as of the time of the call, provided that the tree structure above the
/// focus was only modified through the operations described by `push` and
/// `replace`.
pub unsafe trait Ancestry<N> {
    /// The parent of the focus, or `None` if the focus is the root slot.
    ///
    /// # Safety
    ///
    /// The tree and all included nodes must be (still) valid.
    unsafe fn peek(&self) -> Option<Step<N>>;

    /// Move the focus to its parent and return it.
    ///
    /// # Safety
    ///
    /// The tree and all included nodes must be (still) valid.
    unsafe fn pop(&mut self) -> Option<Step<N>>;

    /// Move the focus from `node` (which must be the current focus) to its
    /// child slot on `dir`.
    ///
    /// # Safety
    ///
    /// The tree and all included nodes must be (still) valid.
    unsafe fn push(&mut self, node: NonNull<N>, dir: Dir);

    /// `old` has traded its position in the tree with `new`.
    ///
    /// # Safety
    ///
    /// The tree and all included nodes must be (still) valid.
    unsafe fn replace(&mut self, old: NonNull<N>, new: NonNull<N>);

    /// Move the focus to the root slot.
    fn clear(&mut self);
}

unsafe impl<N, A: Ancestry<N> + ?Sized> Ancestry<N> for &mut A {
    #[inline]
    unsafe fn peek(&self) -> Option<Step<N>> {
        unsafe { (**self).peek() }
    }

    #[inline]
    unsafe fn pop(&mut self) -> Option<Step<N>> {
        unsafe { (**self).pop() }
    }

    #[inline]
    unsafe fn push(&mut self, node: NonNull<N>, dir: Dir) {
        unsafe { (**self).push(node, dir) }
    }

    #[inline]
    unsafe fn replace(&mut self, old: NonNull<N>, new: NonNull<N>) {
        unsafe { (**self).replace(old, new) }
    }

    #[inline]
    fn clear(&mut self) {
        (**self).clear()
    }
}

/// A node layout together with the traversal state its callers keep between
/// calls.
///
/// # Safety
///
/// After `seek(path, node)` returns, `path` must be an [`Ancestry`] whose
/// focus is `node`, given that the caller upheld the layout's documented
/// requirements on `path`.
pub unsafe trait Layout: Links {
    /// The traversal state. Parent-linked layouts can recompute it from any
    /// node, so theirs is trivially cheap to create.
    type Path: Ancestry<Self> + Default;

    /// Make `path` focus on `node`.
    ///
    /// # Safety
    ///
    ///  - The tree and all included nodes must be (still) valid.
    ///  - `node` must be linked in the tree.
    ///  - For layouts without parent links, `path` must already describe the
    ///    route to `node` (i.e., it was produced by a traversal or search that
    ///    ended at `node`, and the tree has not been mutated since).
    ///
    unsafe fn seek(path: &mut Self::Path, node: NonNull<Self>);
}
