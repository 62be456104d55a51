//! Layout-independent [red-black][1] [tree][2] algorithms
//!
//! [1]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
//! [2]: https://en.wikipedia.org/wiki/Binary_search_tree
//!
//! Every function here is written against [`Links`] and [`Ancestry`]. Upward
//! movement always goes through the ancestry, never through a parent field,
//! so the same code serves layouts that store parent pointers and layouts that
//! keep an explicit path.
//!
//! # Panic Safety
//!
//! **The mutation functions are not panic safe.** They don't call back into
//! user code, but a panic from a debug assertion leaves the tree corrupted.
#![allow(unsafe_op_in_unsafe_fn)]
use core::{cmp::Ordering, mem::swap, ptr::NonNull};
use guard::guard;

use crate::link::{Ancestry, Color, Dir, Links, Step};

cfg_if::cfg_if! {
    if #[cfg(debug_assertions)] {
        #[track_caller]
        fn unreachable_unchecked() -> ! {
            unreachable!();
        }
    } else {
        use core::hint::unreachable_unchecked;
    }
}

pub(crate) type Tree<N> = Option<NonNull<N>>;

/// Nil nodes are black.
#[inline]
unsafe fn color_of<N: Links>(node: Option<NonNull<N>>) -> Color {
    match node {
        Some(n) => n.as_ref().color(),
        None => Color::Black,
    }
}

/// Read the slot `slot` designates. `None` designates the root slot.
#[inline]
unsafe fn slot_get<N: Links>(tree: &Tree<N>, slot: Option<Step<N>>) -> Option<NonNull<N>> {
    match slot {
        Some((parent, dir)) => parent.as_ref().child(dir),
        None => *tree,
    }
}

#[inline]
unsafe fn slot_set<N: Links>(
    tree: &mut Tree<N>,
    slot: Option<Step<N>>,
    node: Option<NonNull<N>>,
) {
    match slot {
        Some((mut parent, dir)) => parent.as_mut().set_child(dir, node),
        None => *tree = node,
    }
}

/// Search the tree. `cmp` tells where the target lies relative to the given
/// node.
///
/// On return, the focus of `ancestry` is the found node or, if there is none,
/// the empty slot where such a node would be linked.
pub(crate) unsafe fn descend<N: Links>(
    tree: &Tree<N>,
    ancestry: &mut impl Ancestry<N>,
    mut cmp: impl FnMut(NonNull<N>) -> Ordering,
) -> Option<NonNull<N>> {
    ancestry.clear();
    let mut cursor = *tree;
    while let Some(node) = cursor {
        let dir = match cmp(node) {
            Ordering::Less => Dir::Left,
            Ordering::Greater => Dir::Right,
            Ordering::Equal => return Some(node),
        };
        ancestry.push(node, dir);
        cursor = node.as_ref().child(dir);
    }
    None
}

/// Rotate `node`. `dir` specifies `node`'s position after rotation. `slot`
/// is where `node` currently hangs. Returns the new subtree root.
pub(crate) unsafe fn rotate<N: Links>(
    tree: &mut Tree<N>,
    mut node: NonNull<N>,
    dir: Dir,
    slot: Option<Step<N>>,
) -> NonNull<N> {
    debug_assert_eq!(slot_get(tree, slot), Some(node));

    //          node            new_root
    //          /  \            /  \
    //         /    \          /    \
    //  new_root    y   ==>   x     node
    //    /  \                      /  \
    //   x  mid                    mid  y

    let mut new_root = node
        .as_ref()
        .child(!dir)
        .expect("post-rotation root does not exist");
    let mid = new_root.as_ref().child(dir);
    node.as_mut().set_child(!dir, mid);
    new_root.as_mut().set_child(dir, Some(node));

    new_root.as_mut().set_parent(slot.map(|(parent, _)| parent));
    node.as_mut().set_parent(Some(new_root));
    if let Some(mut mid) = mid {
        mid.as_mut().set_parent(Some(node));
    }

    slot_set(tree, slot, Some(new_root));
    new_root
}

/// Link `new_node` into the empty slot at the focus of `ancestry` and restore
/// the color invariant.
///
/// On return, `ancestry` is cleared.
///
/// # Safety
///
///  - The tree and all included nodes must be (still) valid.
///  - The focus of `ancestry` must be an empty slot whose position is
///    consistent with the ordering (as left by [`descend`]).
///  - `new_node` must not be already included in the tree. (If it's already
///    part of another tree, that tree will be corrupted.)
///
pub(crate) unsafe fn link<N: Links>(
    tree: &mut Tree<N>,
    ancestry: &mut impl Ancestry<N>,
    new_node: NonNull<N>,
) {
    link_inner(tree, ancestry, new_node);
    ancestry.clear();
}

unsafe fn link_inner<N: Links>(
    tree: &mut Tree<N>,
    ancestry: &mut impl Ancestry<N>,
    mut new_node: NonNull<N>,
) {
    let slot = ancestry.peek();
    debug_assert_eq!(slot_get(tree, slot), None);
    debug_assert!(slot.map_or(true, |(parent, _)| parent != new_node));

    {
        let n = new_node.as_mut();
        n.set_child(Dir::Left, None);
        n.set_child(Dir::Right, None);
        n.set_parent(slot.map(|(parent, _)| parent));
        n.set_color(Color::Red);
    }
    slot_set(tree, slot, Some(new_node));

    let mut node = new_node;
    loop {
        guard!(let Some((mut parent, node_side)) = ancestry.pop() else {
            // `node` is the root. Repaint it black, increasing the black
            // height by one.
            node.as_mut().set_color(Color::Black);
            return;
        });
        debug_assert_eq!(node.as_ref().color(), Color::Red);
        debug_assert_eq!(parent.as_ref().child(node_side), Some(node));

        // Color invariant fulfilled?
        if parent.as_ref().color() == Color::Black {
            return;
        }

        // `parent` is red, so `node` cannot be red. What do we do now?
        guard!(let Some((mut grandparent, parent_side)) = ancestry.pop() else {
            // `parent` is the root
            parent.as_mut().set_color(Color::Black);
            return;
        });
        debug_assert_eq!(grandparent.as_ref().child(parent_side), Some(parent));

        // Due to the color invariant, `grandparent` must be black.
        debug_assert_eq!(grandparent.as_ref().color(), Color::Black);

        let uncle = grandparent.as_ref().child(!parent_side);
        if let Some(mut uncle) = uncle.filter(|u| u.as_ref().color() == Color::Red) {
            // Both `parent` and `uncle` are red. Repaint them to black and
            // `grandparent` to red. (This doesn't change `grandparent`'s
            // subtree's black height.)
            parent.as_mut().set_color(Color::Black);
            uncle.as_mut().set_color(Color::Black);
            grandparent.as_mut().set_color(Color::Red);

            // `grandparent` might now violate the color invariant. The
            // ancestry's focus is already on it.
            node = grandparent;
            continue;
        }

        // `uncle` is black (a nil node counts as black). If `node` is on the
        // inner side, straighten the line first.
        if parent_side != node_side {
            rotate(tree, parent, parent_side, Some((grandparent, parent_side)));

            // The rotation flips the relationship between `node` and
            // `parent`.
            swap(&mut parent, &mut node);
            debug_assert_eq!(grandparent.as_ref().child(parent_side), Some(parent));
            debug_assert_eq!(parent.as_ref().child(parent_side), Some(node));
        }

        // Push `grandparent` to `uncle`'s position, making `parent` the
        // parent of `node` and `grandparent`.
        rotate(tree, grandparent, !parent_side, ancestry.peek());

        // The paths through `node` now have one less black node. Repaint
        // `parent` to black and `grandparent` to red.
        parent.as_mut().set_color(Color::Black);
        grandparent.as_mut().set_color(Color::Red);
        return;
    }
}

/// Remove `node`, the focus of `ancestry`, from the tree.
///
/// On return, `ancestry` is cleared. The link fields of `node` are left in an
/// unspecified state.
///
/// # Safety
///
///  - The tree and all included nodes must be (still) valid.
///  - The focus of `ancestry` must be `node`.
///
pub(crate) unsafe fn unlink<N: Links>(
    tree: &mut Tree<N>,
    ancestry: &mut impl Ancestry<N>,
    node: NonNull<N>,
) {
    unlink_inner(tree, ancestry, node);
    ancestry.clear();
}

unsafe fn unlink_inner<N: Links>(
    tree: &mut Tree<N>,
    ancestry: &mut impl Ancestry<N>,
    node: NonNull<N>,
) {
    debug_assert_eq!(
        slot_get(tree, ancestry.peek()),
        Some(node),
        "the ancestry does not lead to the node being removed"
    );

    if let (Some(left), Some(right)) = (
        node.as_ref().child(Dir::Left),
        node.as_ref().child(Dir::Right),
    ) {
        swap_with_successor(tree, ancestry, node, left, right);
    }

    // `node` has at most one child now
    let slot = ancestry.peek();
    let child = match (node.as_ref().child(Dir::Left), node.as_ref().child(Dir::Right)) {
        (Some(_), Some(_)) => unreachable_unchecked(),
        (Some(child), None) | (None, Some(child)) => Some(child),
        (None, None) => None,
    };
    slot_set(tree, slot, child);

    match (node.as_ref().color(), child) {
        (Color::Red, child) => {
            // If `child` is non-nil, it must be black as per the color
            // invariant. However, having a black child at this position
            // would violate the black height invariant. Therefore, `child`
            // is nil, and `node` could simply be removed.
            debug_assert_eq!(child, None);
            return;
        }
        (Color::Black, Some(mut child)) => {
            // `child` must be red because of the black height invariant.
            // Move `child` to `node`'s position and repaint it black.
            debug_assert_eq!(child.as_ref().color(), Color::Red);
            child.as_mut().set_parent(slot.map(|(parent, _)| parent));
            child.as_mut().set_color(Color::Black);
            return;
        }
        (Color::Black, None) => {
            // The focus is now an empty slot whose black height is one less
            // than it should be. We will restore the invariant by traveling
            // up the tree.
        }
    }

    loop {
        // If there's no parent, the black height change propagated up to the
        // root
        guard!(let Some((mut parent, node_side)) = ancestry.pop() else { return; });

        //       parent
        //        /   \
        //       /     \
        //     node  sibling
        //            /   \
        //           /     \
        //  close_nephew distant_nephew
        //
        // `node`'s sibling must exist because of the black height invariant
        guard!(let Some(mut sibling) = parent.as_ref().child(!node_side) else {
            unreachable_unchecked()
        });
        let close_nephew = sibling.as_ref().child(node_side);
        let distant_nephew = sibling.as_ref().child(!node_side);

        match (
            parent.as_ref().color(),
            color_of(close_nephew),
            sibling.as_ref().color(),
            color_of(distant_nephew),
        ) {
            (_, _, Color::Red, _) => {
                // Due to the color invariant, `parent` and both nephews are
                // black, and the nephews exist because of the black height
                // invariant.
                debug_assert_eq!(parent.as_ref().color(), Color::Black);
                debug_assert!(close_nephew.is_some() && distant_nephew.is_some());

                // Move `sibling` into `parent`'s position. `parent` adopts
                // `close_nephew`.
                rotate(tree, parent, node_side, ancestry.peek());
                parent.as_mut().set_color(Color::Red);
                sibling.as_mut().set_color(Color::Black);

                // `sibling` now sits between `parent` and the rest of the
                // ancestry. `close_nephew` (now sibling) is black, so if we
                // iterate again, we will fall through to the below cases.
                ancestry.push(sibling, node_side);
                ancestry.push(parent, node_side);
            }
            (_, _, Color::Black, Color::Red) => {
                guard!(let Some(mut distant_nephew) = distant_nephew else {
                    unreachable_unchecked()
                });

                // Move `sibling` to `parent`'s position. `parent` adopts
                // `close_nephew`.
                rotate(tree, parent, node_side, ancestry.peek());

                // `sibling` takes over `parent`'s color. `parent` becomes the
                // extra black on `node`'s side.
                let parent_color = parent.as_ref().color();
                parent.as_mut().set_color(Color::Black);
                sibling.as_mut().set_color(parent_color);
                distant_nephew.as_mut().set_color(Color::Black);
                return;
            }
            (_, Color::Red, Color::Black, Color::Black) => {
                guard!(let Some(mut close_nephew) = close_nephew else {
                    unreachable_unchecked()
                });

                // Move `close_nephew` to `sibling`'s position.
                rotate(tree, sibling, !node_side, Some((parent, !node_side)));
                sibling.as_mut().set_color(Color::Red);
                close_nephew.as_mut().set_color(Color::Black);

                // `sibling` (now distant nephew) is red, so if we iterate
                // again, we will take the above case
                ancestry.push(parent, node_side);
            }
            (Color::Red, Color::Black, Color::Black, Color::Black) => {
                // Repaint `parent` and `sibling` to black and red. This
                // restores `node`'s black height and keeps `sibling`'s
                // intact.
                parent.as_mut().set_color(Color::Black);
                sibling.as_mut().set_color(Color::Red);
                return;
            }
            (Color::Black, Color::Black, Color::Black, Color::Black) => {
                // Repaint `sibling` to red. This rectifies the black height
                // difference between `node` and `sibling`. However, `parent`
                // still has one less black height than the rest of the tree,
                // and the focus is already on it.
                sibling.as_mut().set_color(Color::Red);
            }
        }
    }
}

/// Trade the positions of `node` (which has two children) and its in-order
/// successor. The colors stay with the positions, so the ordering is
/// temporarily broken but the coloring is not.
///
/// On return, the focus of `ancestry` is `node`, which has no left child.
unsafe fn swap_with_successor<N: Links>(
    tree: &mut Tree<N>,
    ancestry: &mut impl Ancestry<N>,
    mut node: NonNull<N>,
    mut left: NonNull<N>,
    mut right: NonNull<N>,
) {
    let slot = ancestry.peek();

    // The successor is the minimum of the right subtree
    ancestry.push(node, Dir::Right);
    let mut successor = right;
    while let Some(next) = successor.as_ref().child(Dir::Left) {
        ancestry.push(successor, Dir::Left);
        successor = next;
    }
    guard!(let Some((mut successor_parent, _)) = ancestry.peek() else {
        unreachable_unchecked()
    });
    debug_assert_ne!(node, successor);
    debug_assert_eq!(successor.as_ref().child(Dir::Left), None);

    let node_color = node.as_ref().color();
    node.as_mut().set_color(successor.as_ref().color());
    successor.as_mut().set_color(node_color);

    let successor_right = successor.as_ref().child(Dir::Right);

    successor.as_mut().set_child(Dir::Left, Some(left));
    left.as_mut().set_parent(Some(successor));

    if successor_parent == node {
        // `successor` is `node`'s right child
        debug_assert_eq!(successor, right);
        successor.as_mut().set_child(Dir::Right, Some(node));
        node.as_mut().set_parent(Some(successor));
    } else {
        successor.as_mut().set_child(Dir::Right, Some(right));
        right.as_mut().set_parent(Some(successor));
        successor_parent.as_mut().set_child(Dir::Left, Some(node));
        node.as_mut().set_parent(Some(successor_parent));
    }

    node.as_mut().set_child(Dir::Left, None);
    node.as_mut().set_child(Dir::Right, successor_right);
    if let Some(mut child) = successor_right {
        child.as_mut().set_parent(Some(node));
    }

    successor.as_mut().set_parent(slot.map(|(parent, _)| parent));
    debug_assert_eq!(slot_get(tree, slot), Some(node));
    slot_set(tree, slot, Some(successor));

    ancestry.replace(node, successor);
}

/// Descend from `node` toward `dir` as far as possible. The focus follows.
#[inline]
pub(crate) unsafe fn extreme<N: Links>(
    mut node: NonNull<N>,
    dir: Dir,
    ancestry: &mut impl Ancestry<N>,
) -> NonNull<N> {
    while let Some(child) = node.as_ref().child(dir) {
        ancestry.push(node, dir);
        node = child;
    }
    node
}

/// The first node toward `dir` (`Left` for the minimum) in the tree.
#[inline]
pub(crate) unsafe fn first<N: Links>(
    tree: &Tree<N>,
    dir: Dir,
    ancestry: &mut impl Ancestry<N>,
) -> Option<NonNull<N>> {
    ancestry.clear();
    tree.map(|root| extreme(root, dir, ancestry))
}

/// The in-order neighbor of `node`, the focus of `ancestry`, toward `dir`
/// (`Right` for the successor). The focus follows. If there is none, the
/// ancestry is left exhausted.
pub(crate) unsafe fn step<N: Links>(
    node: NonNull<N>,
    dir: Dir,
    ancestry: &mut impl Ancestry<N>,
) -> Option<NonNull<N>> {
    if let Some(child) = node.as_ref().child(dir) {
        ancestry.push(node, dir);
        return Some(extreme(child, !dir, ancestry));
    }

    // Climb until we leave a subtree hanging on the other side
    while let Some((parent, side)) = ancestry.pop() {
        if side != dir {
            return Some(parent);
        }
    }

    // There's none
    None
}
