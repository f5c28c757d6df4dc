use std::iter::FusedIterator;

use crate::node::NodeId;
use crate::tree::RbTree;

/// In-order iterator over `(NodeId, &T)`, driven by the successor walk.
pub struct Iter<'a, T, C> {
    tree: &'a RbTree<T, C>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, T, C> Iter<'a, T, C> {
    pub(crate) fn new(tree: &'a RbTree<T, C>) -> Self {
        Self {
            tree,
            cursor: tree.first(),
            remaining: tree.len(),
        }
    }
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.tree.successor(id);
        self.remaining -= 1;
        Some((id, self.tree.get(id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, C> ExactSizeIterator for Iter<'_, T, C> {}

impl<T, C> FusedIterator for Iter<'_, T, C> {}

impl<'a, T, C> IntoIterator for &'a RbTree<T, C> {
    type Item = (NodeId, &'a T);
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
