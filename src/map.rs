//! Typed map operations over records that embed a node
//!
//! An [`Adapter`] binds a record type, the node embedded in it, a key type,
//! and two comparators. [`Map`] turns an adapter into insert/remove/find and
//! traversal operations on records. Everything is resolved at compile time;
//! there are no trait objects or function tables involved. The adapter is
//! usually generated by [`rb_map!`](crate::rb_map).
//!
//! The comparators are only called while searching, before any link is
//! modified. A panicking comparator leaves the tree intact.
#![allow(unsafe_op_in_unsafe_fn)]
use core::{cmp::Ordering, marker::PhantomData, ptr::NonNull};

use crate::{
    engine,
    link::{Dir, Layout},
    root::Root,
    validate::{self, InvariantViolation},
};

#[cfg(test)]
mod tests;

/// Binds a record type to a tree.
///
/// # Safety
///
/// [`Adapter::link`] and [`Adapter::record`] must be inverse of each other,
/// mapping a record to the node embedded in it and back.
pub unsafe trait Adapter {
    /// The type to look records up by.
    type Key: ?Sized;
    type Record;
    /// The embedded node type, which selects the layout.
    type Link: Layout;

    /// Get the node embedded in `record`.
    ///
    /// # Safety
    ///
    /// `record` must point to a valid `Record`.
    unsafe fn link(record: NonNull<Self::Record>) -> NonNull<Self::Link>;

    /// Get the record containing `link`.
    ///
    /// # Safety
    ///
    /// `link` must be the node embedded in a valid `Record`.
    unsafe fn record(link: NonNull<Self::Link>) -> NonNull<Self::Record>;

    /// Determine the ordering between `key` and the key of `record`.
    fn cmp_key(key: &Self::Key, record: &Self::Record) -> Ordering;

    /// Determine the ordering between two records. Must be consistent with
    /// [`Adapter::cmp_key`].
    fn cmp_records(a: &Self::Record, b: &Self::Record) -> Ordering;
}

/// Map operations for records bound by `A`.
///
/// Every operation takes the layout's traversal state,
/// `&mut <A::Link as Layout>::Path`. For [`crate::standard::Node`] it's a
/// trivially constructed [`crate::standard::Parents`] that can be created
/// afresh for each call; for [`crate::compact::CompactNode`] it's a
/// [`crate::compact::Path`] that must be carried from the call that located a
/// record to the calls that step from or remove it.
///
/// # Safety
///
/// All functions require that the tree and all included records be (still)
/// valid, and consider the traversed records to be borrowed (mutably, for
/// the mutating functions) throughout the duration of the call.
pub struct Map<A>(PhantomData<fn() -> A>);

type PathOf<A> = <<A as Adapter>::Link as Layout>::Path;

impl<A: Adapter> Map<A> {
    /// Insert `record`.
    ///
    /// If the tree already has a record whose key compares equal, the tree is
    /// left untouched and that record is returned.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self). `record` must not be already
    /// included in the tree.
    pub unsafe fn insert(
        root: &mut Root<A::Link>,
        record: NonNull<A::Record>,
    ) -> Option<NonNull<A::Record>> {
        let mut path = PathOf::<A>::default();
        let new = record.as_ref();
        if let Some(existing) = engine::descend(&root.node, &mut path, |node| {
            A::cmp_records(new, A::record(node).as_ref())
        }) {
            return Some(A::record(existing));
        }
        engine::link(&mut root.node, &mut path, A::link(record));
        None
    }

    /// Remove the record whose key compares equal to `key`. Returns the
    /// removed record, or `None` (leaving the tree untouched) if there's none.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self).
    pub unsafe fn remove(root: &mut Root<A::Link>, key: &A::Key) -> Option<NonNull<A::Record>> {
        let mut path = PathOf::<A>::default();
        let node = engine::descend(&root.node, &mut path, |node| {
            A::cmp_key(key, A::record(node).as_ref())
        })?;
        engine::unlink(&mut root.node, &mut path, node);
        Some(A::record(node))
    }

    /// Remove `record` from the tree. `path` must lead to `record` (ignored
    /// by layouts with parent links). It is cleared on return.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self). `record` must be included
    /// in the tree, and `path` must be the route to it in the current state
    /// of the tree (see [`Layout::seek`]).
    pub unsafe fn remove_record(
        root: &mut Root<A::Link>,
        record: NonNull<A::Record>,
        path: &mut PathOf<A>,
    ) {
        let node = A::link(record);
        <A::Link as Layout>::seek(path, node);
        engine::unlink(&mut root.node, path, node);
    }

    /// Find the record whose key compares equal to `key`. On return, `path`
    /// leads to the record.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self).
    pub unsafe fn find(
        root: &Root<A::Link>,
        key: &A::Key,
        path: &mut PathOf<A>,
    ) -> Option<NonNull<A::Record>> {
        engine::descend(&root.node, path, |node| {
            A::cmp_key(key, A::record(node).as_ref())
        })
        .map(|node| A::record(node))
    }

    /// The record with the minimum key. On return, `path` leads to it.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self).
    #[inline]
    pub unsafe fn first(root: &Root<A::Link>, path: &mut PathOf<A>) -> Option<NonNull<A::Record>> {
        engine::first(&root.node, Dir::Left, path).map(|node| A::record(node))
    }

    /// The record with the maximum key. On return, `path` leads to it.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self).
    #[inline]
    pub unsafe fn last(root: &Root<A::Link>, path: &mut PathOf<A>) -> Option<NonNull<A::Record>> {
        engine::first(&root.node, Dir::Right, path).map(|node| A::record(node))
    }

    /// The record following `record`. `path` must lead to `record` and
    /// follows the cursor.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self) and [`Layout::seek`].
    #[inline]
    pub unsafe fn next(
        record: NonNull<A::Record>,
        path: &mut PathOf<A>,
    ) -> Option<NonNull<A::Record>> {
        Self::step(record, Dir::Right, path)
    }

    /// The record preceding `record`. See [`Self::next`].
    ///
    /// # Safety
    ///
    /// See [`Self::next`].
    #[inline]
    pub unsafe fn prev(
        record: NonNull<A::Record>,
        path: &mut PathOf<A>,
    ) -> Option<NonNull<A::Record>> {
        Self::step(record, Dir::Left, path)
    }

    #[inline]
    unsafe fn step(
        record: NonNull<A::Record>,
        dir: Dir,
        path: &mut PathOf<A>,
    ) -> Option<NonNull<A::Record>> {
        let node = A::link(record);
        <A::Link as Layout>::seek(path, node);
        engine::step(node, dir, path).map(|node| A::record(node))
    }

    /// Check the coloring and the ordering of the tree. Returns the black
    /// height.
    ///
    /// # Safety
    ///
    /// See [the type-level documentation](Self).
    pub unsafe fn validate(root: &Root<A::Link>) -> Result<usize, InvariantViolation> {
        let black_height = validate::black_height(root)?;
        validate::check_order(root, |a, b| {
            A::cmp_records(A::record(a).as_ref(), A::record(b).as_ref())
        })?;
        Ok(black_height)
    }
}
