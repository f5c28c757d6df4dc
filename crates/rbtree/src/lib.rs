mod iter;
mod node;
mod tree;

use std::cmp::Ordering;

pub use iter::Iter;
pub use node::NodeId;
pub use tree::RbTree;

/// Total order over the values linked in a tree.
///
/// - Must answer consistently for as long as both values are linked;
///   a comparator that changes its mind silently corrupts the search
///   order (the structure stays memory safe).
/// - Values comparing `Equal` descend into the right subtree on
///   insertion, so relative order among equals follows insertion
///   history rather than any stable rule.
pub trait Comparator<T> {
    fn cmp(&self, a: &T, b: &T) -> Ordering;
}

/// `T`'s own `Ord` as a comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    #[inline(always)]
    fn cmp(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T, F: Fn(&T, &T) -> Ordering> Comparator<T> for F {
    #[inline(always)]
    fn cmp(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}
