use quickcheck_macros::quickcheck;
use rand::prelude::*;
use std::{collections::BTreeMap, prelude::v1::*};

use super::*;
use crate::{
    compact::CompactNode,
    standard::Node,
    testing::{
        insert_keys, keys_ascending, keys_descending, Arena, CompactMap, Dump, Entry, StdMap,
    },
};

macro_rules! gen_map_test {
    ($modname:ident, $adapter:ty, $link:ty) => {
        mod $modname {
            use super::*;

            type A = $adapter;
            type L = $link;

            #[test]
            fn init() {
                scenarios::init::<L, A>();
            }

            #[test]
            fn insert_left() {
                scenarios::insert_with_heights::<L, A>(
                    &[8, 7, 2, 4, 1, 3, 6, 5],
                    &[1, 1, 1, 2, 2, 2, 2, 2],
                );
            }

            #[test]
            fn insert_right() {
                scenarios::insert_with_heights::<L, A>(
                    &[1, 2, 7, 5, 8, 6, 3, 4],
                    &[1, 1, 1, 2, 2, 2, 2, 2],
                );
            }

            #[test]
            fn remove_simple() {
                scenarios::remove_one::<L, A>(&[3, 1, 4, 2], 4, 2);
                scenarios::remove_one::<L, A>(&[3, 1, 4, 2], 1, 2);
            }

            #[test]
            fn remove_simple2() {
                // `3` has two children; its successor is its right child
                scenarios::remove_one::<L, A>(&[6, 1, 10, 3, 7, 4, 8, 9, 5, 2], 3, 2);
                // `8` has two children; its successor is further down
                scenarios::remove_one::<L, A>(&[6, 1, 10, 3, 7, 4, 8, 9, 5, 2], 8, 2);
            }

            #[test]
            fn duplicate() {
                scenarios::duplicate::<L, A>();
            }

            #[test]
            fn traverse() {
                scenarios::traverse::<L, A>();
            }

            #[test]
            fn find_then_walk() {
                scenarios::find_then_walk::<L, A>(10);
                scenarios::find_then_walk::<L, A>(100);
            }

            #[test]
            fn remove_at_cursor() {
                scenarios::remove_at_cursor::<L, A>();
            }

            #[test]
            fn insert_remove_all() {
                scenarios::insert_remove_all::<L, A>(100);
            }

            #[test]
            fn random() {
                scenarios::random::<L, A>(if cfg!(debug_assertions) { 4 } else { 1000 });
            }

            #[test]
            #[ignore = "slow in debug builds; run with `--release -- --ignored`"]
            fn random_full() {
                scenarios::random::<L, A>(1000);
            }

            #[quickcheck]
            fn qc_commands(cmds: Vec<u8>) {
                scenarios::commands::<L, A>(cmds);
            }
        }
    };
}

gen_map_test!(standard, StdMap, Node);
gen_map_test!(compact, CompactMap, CompactNode);

mod scenarios {
    use super::*;

    pub(super) fn init<L, A>()
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        let arena = Arena::<L>::with_keys([1]);
        let mut root = Root::new();
        unsafe {
            assert_eq!(Map::<A>::validate(&root), Ok(0));
            assert_eq!(Map::<A>::insert(&mut root, arena.get(0)), None);
            assert_eq!(Map::<A>::validate(&root), Ok(1));
            assert_eq!(Map::<A>::remove(&mut root, &1), Some(arena.get(0)));
            assert!(root.is_empty());
            assert_eq!(Map::<A>::validate(&root), Ok(0));

            // Forgetting the nodes leaves them reusable
            assert_eq!(Map::<A>::insert(&mut root, arena.get(0)), None);
            root.clear();
            assert!(root.is_empty());
            assert_eq!(Map::<A>::insert(&mut root, arena.get(0)), None);
            assert_eq!(root.get(), Some(A::link(arena.get(0))));
        }
    }

    pub(super) fn insert_with_heights<L, A>(keys: &[u32], heights: &[usize])
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        let arena = Arena::<L>::with_keys(keys.iter().copied());
        let mut root = Root::new();
        for (&key, &height) in keys.iter().zip(heights) {
            unsafe {
                assert_eq!(Map::<A>::insert(&mut root, arena.by_key(key)), None);
                log::trace!("after inserting {}:\n{}", key, Dump::<L, A>::new(&root));
                assert_eq!(
                    Map::<A>::validate(&root),
                    Ok(height),
                    "after inserting {}",
                    key
                );
            }
        }

        let mut sorted = keys.to_vec();
        sorted.sort_unstable();
        assert_eq!(unsafe { keys_ascending::<L, A>(&root) }, sorted);
    }

    pub(super) fn remove_one<L, A>(keys: &[u32], removed: u32, height: usize)
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        let arena = Arena::<L>::with_keys(keys.iter().copied());
        let mut root = Root::new();
        unsafe {
            insert_keys::<L, A>(&mut root, &arena, keys.iter().copied());
            log::trace!("before removing {}:\n{}", removed, Dump::<L, A>::new(&root));

            assert_eq!(
                Map::<A>::remove(&mut root, &removed),
                Some(arena.by_key(removed))
            );
            log::trace!("after removing {}:\n{}", removed, Dump::<L, A>::new(&root));
            assert_eq!(Map::<A>::validate(&root), Ok(height));

            let mut expected: Vec<u32> = keys.iter().copied().filter(|&k| k != removed).collect();
            expected.sort_unstable();
            assert_eq!(keys_ascending::<L, A>(&root), expected);

            // Already gone
            assert_eq!(Map::<A>::remove(&mut root, &removed), None);
            assert_eq!(keys_ascending::<L, A>(&root), expected);
        }
    }

    pub(super) fn duplicate<L, A>()
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        let arena = Arena::<L>::with_keys([3, 5, 7, 5]);
        let mut root = Root::new();
        unsafe {
            for i in 0..3 {
                assert_eq!(Map::<A>::insert(&mut root, arena.get(i)), None);
            }

            // The second `5` is rejected in favor of the first one
            assert_eq!(Map::<A>::insert(&mut root, arena.get(3)), Some(arena.get(1)));
            assert_eq!(Map::<A>::validate(&root), Ok(1));
            assert_eq!(keys_ascending::<L, A>(&root), [3, 5, 7]);

            let mut path = Default::default();
            assert_eq!(Map::<A>::find(&root, &5, &mut path), Some(arena.get(1)));

            assert_eq!(Map::<A>::remove(&mut root, &4), None);
            assert_eq!(keys_ascending::<L, A>(&root), [3, 5, 7]);
        }
    }

    pub(super) fn traverse<L, A>()
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        let keys = [4, 9, 1, 7, 10, 3, 6, 2, 8, 5];
        let arena = Arena::<L>::with_keys(keys);
        let mut root = Root::new();
        unsafe {
            assert!(keys_ascending::<L, A>(&root).is_empty());
            assert!(keys_descending::<L, A>(&root).is_empty());

            insert_keys::<L, A>(&mut root, &arena, keys);
            assert_eq!(keys_ascending::<L, A>(&root), (1..=10).collect::<Vec<_>>());
            assert_eq!(keys_descending::<L, A>(&root), (1..=10).rev().collect::<Vec<_>>());

            // Start in the middle and wander around
            let mut path = Default::default();
            let five = Map::<A>::find(&root, &5, &mut path);
            assert_eq!(five, Some(arena.by_key(5)));
            let six = Map::<A>::next(arena.by_key(5), &mut path);
            assert_eq!(six, Some(arena.by_key(6)));
            let seven = Map::<A>::next(arena.by_key(6), &mut path);
            assert_eq!(seven, Some(arena.by_key(7)));
            let six = Map::<A>::prev(arena.by_key(7), &mut path);
            assert_eq!(six, Some(arena.by_key(6)));

            // Run off both ends
            assert_eq!(Map::<A>::find(&root, &10, &mut path), Some(arena.by_key(10)));
            assert_eq!(Map::<A>::next(arena.by_key(10), &mut path), None);
            assert_eq!(Map::<A>::first(&root, &mut path), Some(arena.by_key(1)));
            assert_eq!(Map::<A>::prev(arena.by_key(1), &mut path), None);
            assert_eq!(Map::<A>::last(&root, &mut path), Some(arena.by_key(10)));

            assert_eq!(Map::<A>::find(&root, &11, &mut path), None);
            assert_eq!(Map::<A>::find(&root, &0, &mut path), None);
        }
    }

    /// `find(len / 2)`, then `next` until the end.
    pub(super) fn find_then_walk<L, A>(len: u32)
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        let mut keys: Vec<u32> = (1..=len).collect();
        keys.shuffle(&mut StdRng::seed_from_u64(u64::from(len)));
        let arena = Arena::<L>::with_keys(keys.iter().copied());
        let mut root = Root::new();
        unsafe {
            insert_keys::<L, A>(&mut root, &arena, keys.iter().copied());

            let mut path = Default::default();
            let mut cursor = Map::<A>::find(&root, &(len / 2), &mut path);
            let mut visited = Vec::new();
            while let Some(record) = cursor {
                visited.push(record.as_ref().val);
                cursor = Map::<A>::next(record, &mut path);
            }
            assert_eq!(visited, (len / 2..=len).collect::<Vec<_>>());
        }
    }

    /// Insert `1..=len`, then remove everything in a different order.
    pub(super) fn insert_remove_all<L, A>(len: u32)
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        let mut rng = StdRng::seed_from_u64(u64::from(len));
        let mut keys: Vec<u32> = (1..=len).collect();
        keys.shuffle(&mut rng);
        let arena = Arena::<L>::with_keys(keys.iter().copied());
        let mut root = Root::new();
        unsafe {
            insert_keys::<L, A>(&mut root, &arena, keys.iter().copied());
            Map::<A>::validate(&root).unwrap();

            keys.shuffle(&mut rng);
            for (i, &key) in keys.iter().enumerate() {
                let record = arena.by_key(key);
                if i % 2 == 0 {
                    assert_eq!(Map::<A>::remove(&mut root, &key), Some(record));
                } else {
                    let mut path = Default::default();
                    assert_eq!(Map::<A>::find(&root, &key, &mut path), Some(record));
                    Map::<A>::remove_record(&mut root, record, &mut path);
                }
                Map::<A>::validate(&root).unwrap();
            }

            assert!(root.is_empty());
            assert_eq!(Map::<A>::validate(&root), Ok(0));
        }
    }

    pub(super) fn remove_at_cursor<L, A>()
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        const LEN: u32 = 10;
        for target in 1..=LEN {
            let keys = [4, 9, 1, 7, 10, 3, 6, 2, 8, 5];
            let arena = Arena::<L>::with_keys(keys);
            let mut root = Root::new();
            unsafe {
                insert_keys::<L, A>(&mut root, &arena, keys);

                // Walk to `target` and remove it from there
                let mut path = Default::default();
                let mut cursor = Map::<A>::first(&root, &mut path);
                while let Some(record) = cursor {
                    if record.as_ref().val == target {
                        break;
                    }
                    cursor = Map::<A>::next(record, &mut path);
                }
                let record = cursor.unwrap();
                log::debug!("Removing {} at cursor", target);
                Map::<A>::remove_record(&mut root, record, &mut path);

                Map::<A>::validate(&root).unwrap();
                let expected: Vec<u32> = (1..=LEN).filter(|&k| k != target).collect();
                assert_eq!(keys_ascending::<L, A>(&root), expected);
                assert_eq!(Map::<A>::find(&root, &target, &mut path), None);
            }
        }
    }

    pub(super) fn random<L, A>(runs: u64)
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        const LEN: u32 = 1000;

        for run in 0..runs {
            let mut rng = StdRng::seed_from_u64(run);
            log::info!("run {}", run);

            // `arena.get(k - 1)` has key `k`
            let arena = Arena::<L>::with_keys(1..=LEN);
            let mut root = Root::new();

            let mut keys: Vec<u32> = (1..=LEN).collect();
            keys.shuffle(&mut rng);
            for &key in keys.iter() {
                unsafe {
                    assert_eq!(Map::<A>::insert(&mut root, arena.get(key as usize - 1)), None);
                    Map::<A>::validate(&root).unwrap();
                }
            }

            keys.shuffle(&mut rng);
            let (removed, kept) = keys.split_at(keys.len() / 4);
            for (i, &key) in removed.iter().enumerate() {
                let record = arena.get(key as usize - 1);
                unsafe {
                    if i % 2 == 0 {
                        assert_eq!(Map::<A>::remove(&mut root, &key), Some(record));
                    } else {
                        let mut path = Default::default();
                        assert_eq!(Map::<A>::find(&root, &key, &mut path), Some(record));
                        Map::<A>::remove_record(&mut root, record, &mut path);
                    }
                    Map::<A>::validate(&root).unwrap();
                }
            }

            let mut kept = kept.to_vec();
            kept.sort_unstable();
            assert_eq!(unsafe { keys_ascending::<L, A>(&root) }, kept);
            for &key in removed {
                let mut path = Default::default();
                assert_eq!(unsafe { Map::<A>::find(&root, &key, &mut path) }, None);
            }
        }
    }

    pub(super) fn commands<L, A>(cmds: Vec<u8>)
    where
        L: Layout + Default,
        A: Adapter<Key = u32, Record = Entry<L>, Link = L>,
    {
        log::info!("cmds = {:?}", cmds);

        let mut arena = Arena::<L>::new();
        let mut reference: BTreeMap<u32, NonNull<Entry<L>>> = BTreeMap::new();
        let mut root = Root::new();

        for cmd in cmds {
            let key = u32::from(cmd >> 2);
            unsafe {
                match cmd % 4 {
                    0 | 1 => {
                        log::debug!("Inserting {}", key);
                        let record = arena.alloc(key);
                        let existing = Map::<A>::insert(&mut root, record);
                        assert_eq!(existing, reference.get(&key).copied());
                        reference.entry(key).or_insert(record);
                    }
                    2 => {
                        log::debug!("Removing {}", key);
                        assert_eq!(Map::<A>::remove(&mut root, &key), reference.remove(&key));
                    }
                    _ => {
                        log::debug!("Removing {} by record", key);
                        let mut path = Default::default();
                        let found = Map::<A>::find(&root, &key, &mut path);
                        assert_eq!(found, reference.remove(&key));
                        if let Some(record) = found {
                            Map::<A>::remove_record(&mut root, record, &mut path);
                        }
                    }
                }

                log::trace!("{}", Dump::<L, A>::new(&root));
                Map::<A>::validate(&root).unwrap();
                assert_eq!(
                    keys_ascending::<L, A>(&root),
                    reference.keys().copied().collect::<Vec<_>>()
                );
            }
        }
    }
}
