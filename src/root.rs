use core::{fmt, ptr::NonNull};

/// The root handle of a tree.
///
/// A tree never owns its nodes. Dropping or [clearing](Root::clear) a root
/// leaves the link fields of the formerly included nodes untouched.
pub struct Root<N> {
    pub(crate) node: Option<NonNull<N>>,
}

impl<N> Root<N> {
    /// An empty tree.
    pub const fn new() -> Self {
        Self { node: None }
    }

    /// The root node, or `None` if the tree is empty.
    #[inline]
    pub fn get(&self) -> Option<NonNull<N>> {
        self.node
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// Forget all nodes. The nodes themselves are not visited.
    #[inline]
    pub fn clear(&mut self) {
        self.node = None;
    }
}

impl<N> Default for Root<N> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for Root<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Root").field(&self.node).finish()
    }
}
