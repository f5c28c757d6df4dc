use std::fmt;

/// Handle to a node linked in an [`RbTree`](crate::RbTree).
///
/// A handle stays valid from the `insert` that produced it until the
/// matching `remove`. Handles are plain slot indices: using one after
/// removal panics, or addresses whatever node has reused the slot since.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Reserved index standing in for "no node". Never handed out.
    pub(crate) const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub(crate) fn opt(self) -> Option<Self> {
        if self.is_nil() { None } else { Some(self) }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "NodeId(nil)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) color: Color,
    pub(crate) parent: NodeId,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
}

impl<T> Node<T> {
    /// Fresh leaf: red, both children absent, attached under `parent`.
    pub(crate) fn new_leaf(value: T, parent: NodeId) -> Self {
        Self {
            value,
            color: Color::Red,
            parent,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }
}

/// Arena slot. `None` marks a slot waiting on the free list.
pub(crate) type Slot<T> = Option<Node<T>>;
