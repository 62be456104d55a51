//! Fixtures shared by the unit tests
#![allow(unsafe_op_in_unsafe_fn)]
use core::{fmt, ptr::NonNull};
use std::{boxed::Box, prelude::v1::*};

use crate::{
    compact::CompactNode,
    link::{Dir, Layout, Links},
    map::{Adapter, Map},
    root::Root,
    standard::Node,
};

/// A record keyed by `val`.
pub(crate) struct Entry<L> {
    pub(crate) val: u32,
    pub(crate) link: L,
}

rb_map! {
    pub(crate) struct StdMap for Entry<Node> {
        key: u32,
        node: Node = link,
        cmp_key: |key, entry| key.cmp(&entry.val),
        cmp: |a, b| a.val.cmp(&b.val),
    }
}

rb_map! {
    pub(crate) struct CompactMap for Entry<CompactNode> {
        key: u32,
        node: CompactNode = link,
        cmp_key: |key, entry| key.cmp(&entry.val),
        cmp: |a, b| a.val.cmp(&b.val),
    }
}

/// Records that stay in place until the arena is dropped.
pub(crate) struct Arena<L> {
    records: Vec<NonNull<Entry<L>>>,
}

impl<L: Default> Arena<L> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub(crate) fn with_keys(keys: impl IntoIterator<Item = u32>) -> Self {
        let mut this = Self::new();
        for key in keys {
            this.alloc(key);
        }
        this
    }

    pub(crate) fn alloc(&mut self, val: u32) -> NonNull<Entry<L>> {
        let record = NonNull::from(Box::leak(Box::new(Entry {
            val,
            link: L::default(),
        })));
        self.records.push(record);
        record
    }
}

impl<L> Arena<L> {
    pub(crate) fn get(&self, i: usize) -> NonNull<Entry<L>> {
        self.records[i]
    }

    /// The record with key `val`.
    pub(crate) fn by_key(&self, val: u32) -> NonNull<Entry<L>> {
        *self
            .records
            .iter()
            .find(|record| unsafe { record.as_ref().val } == val)
            .unwrap_or_else(|| core::panic!("no record with key {}", val))
    }
}

impl<L> Drop for Arena<L> {
    fn drop(&mut self) {
        for record in self.records.drain(..) {
            drop(unsafe { Box::from_raw(record.as_ptr()) });
        }
    }
}

/// Insert the records with the given keys in the given order.
pub(crate) unsafe fn insert_keys<L, A>(
    root: &mut Root<L>,
    arena: &Arena<L>,
    keys: impl IntoIterator<Item = u32>,
) where
    L: Layout,
    A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
{
    for key in keys {
        let existing = Map::<A>::insert(root, arena.by_key(key));
        assert!(existing.is_none(), "{} was already present", key);
    }
}

/// Collect the keys in ascending order by `first` + `next`.
pub(crate) unsafe fn keys_ascending<L, A>(root: &Root<L>) -> Vec<u32>
where
    L: Layout,
    A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
{
    let mut path = Default::default();
    let mut out = Vec::new();
    let mut cursor = Map::<A>::first(root, &mut path);
    while let Some(record) = cursor {
        out.push(record.as_ref().val);
        cursor = Map::<A>::next(record, &mut path);
    }
    out
}

/// Collect the keys in descending order by `last` + `prev`.
pub(crate) unsafe fn keys_descending<L, A>(root: &Root<L>) -> Vec<u32>
where
    L: Layout,
    A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
{
    let mut path = Default::default();
    let mut out = Vec::new();
    let mut cursor = Map::<A>::last(root, &mut path);
    while let Some(record) = cursor {
        out.push(record.as_ref().val);
        cursor = Map::<A>::prev(record, &mut path);
    }
    out
}

/// Render a tree for `log::trace!`.
pub(crate) struct Dump<'a, L, A> {
    root: &'a Root<L>,
    _adapter: core::marker::PhantomData<fn() -> A>,
}

impl<'a, L, A> Dump<'a, L, A> {
    pub(crate) fn new(root: &'a Root<L>) -> Self {
        Self {
            root,
            _adapter: core::marker::PhantomData,
        }
    }
}

impl<L, A> fmt::Display for Dump<'_, L, A>
where
    L: Links,
    A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        unsafe fn dump_node<L, A>(
            node: Option<NonNull<L>>,
            level: usize,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result
        where
            L: Links,
            A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
        {
            for _ in 0..level {
                write!(f, "  ")?;
            }
            if let Some(node) = node {
                writeln!(
                    f,
                    "{} {:?}",
                    A::record(node).as_ref().val,
                    node.as_ref().color()
                )?;
                for dir in [Dir::Left, Dir::Right] {
                    dump_node::<L, A>(node.as_ref().child(dir), level + 1, f)?;
                }
            } else {
                writeln!(f, "nil")?;
            }
            Ok(())
        }

        unsafe { dump_node::<L, A>(self.root.get(), 0, f) }
    }
}
