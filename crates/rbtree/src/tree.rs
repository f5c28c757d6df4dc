use std::fmt;

use crate::iter::Iter;
use crate::node::{Color, Node, NodeId, Slot};
use crate::{Comparator, NaturalOrder};

/// Ordered binary search tree balanced by red-black coloring.
///
/// Nodes live in an internal slot arena and are addressed by [`NodeId`]
/// handles; structural links are indices, and "no child" is a reserved
/// index rather than a shared sentinel node. Freed slots are recycled,
/// so a long-lived tree does not grow past its high-water mark.
///
/// - `insert` routes equal values into the right subtree, so the
///   relative order of equal values depends on insertion history.
/// - Every mutation takes `&mut self`; the structure is single-writer.
pub struct RbTree<T, C = NaturalOrder> {
    slots: Vec<Slot<T>>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
    comparator: C,
}

impl<T: Ord> RbTree<T> {
    /// Empty tree ordered by `T`'s `Ord`.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Empty tree with `capacity` node slots preallocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            root: NodeId::NIL,
            len: 0,
            comparator: NaturalOrder,
        }
    }
}

impl<T, C: Comparator<T>> RbTree<T, C> {
    /// Empty tree ordered by `comparator`.
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::NIL,
            len: 0,
            comparator,
        }
    }

    /// Links `value` into the tree and returns its handle.
    ///
    /// Values comparing equal to an existing value descend right.
    pub fn insert(&mut self, value: T) -> NodeId {
        let mut parent = NodeId::NIL;
        let mut cursor = self.root;
        let mut goes_left = false;
        while !cursor.is_nil() {
            parent = cursor;
            let node = self.node(cursor);
            goes_left = self.comparator.cmp(&value, &node.value).is_lt();
            cursor = if goes_left { node.left } else { node.right };
        }

        let z = self.alloc_node(value, parent);
        if parent.is_nil() {
            self.root = z;
        } else if goes_left {
            self.node_mut(parent).left = z;
        } else {
            self.node_mut(parent).right = z;
        }
        self.len += 1;
        self.insert_fixup(z);
        z
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        loop {
            if z == self.root {
                self.set_color(z, Color::Black);
                return;
            }
            let mut p = self.node(z).parent;
            if self.is_black(p) {
                return;
            }
            // p is red, so the grandparent exists and is black.
            let g = self.node(p).parent;
            if self.node(g).left == p {
                let u = self.node(g).right;
                if self.is_red(u) {
                    // Red uncle: recolor and push the violation up.
                    self.set_color(g, Color::Red);
                    self.set_color(u, Color::Black);
                    self.set_color(p, Color::Black);
                    z = g;
                } else {
                    if self.node(p).right == z {
                        // Inner grandchild: straighten before rotating g.
                        self.rotate_left(p);
                        z = p;
                        p = self.node(z).parent;
                    }
                    self.rotate_right(g);
                    self.set_color(g, Color::Red);
                    self.set_color(p, Color::Black);
                }
            } else {
                let u = self.node(g).left;
                if self.is_red(u) {
                    self.set_color(g, Color::Red);
                    self.set_color(u, Color::Black);
                    self.set_color(p, Color::Black);
                    z = g;
                } else {
                    if self.node(p).left == z {
                        self.rotate_right(p);
                        z = p;
                        p = self.node(z).parent;
                    }
                    self.rotate_left(g);
                    self.set_color(g, Color::Red);
                    self.set_color(p, Color::Black);
                }
            }
        }
    }
}

impl<T, C> RbTree<T, C> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Unlinks every node and releases their slots. Outstanding handles
    /// become stale.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = NodeId::NIL;
        self.len = 0;
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.opt()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent.opt()
    }

    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).left.opt()
    }

    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).right.opt()
    }

    /// Shared reference to the payload. Panics if the handle is stale.
    pub fn get(&self, node: NodeId) -> &T {
        &self.node(node).value
    }

    /// Mutable reference to the payload. Changing the parts of the
    /// payload the comparator looks at while the node is linked
    /// silently corrupts the ordering.
    pub fn get_mut(&mut self, node: NodeId) -> &mut T {
        &mut self.node_mut(node).value
    }

    /// Minimum node in comparator order.
    pub fn first(&self) -> Option<NodeId> {
        self.root.opt().map(|root| self.min_node(root))
    }

    /// Maximum node in comparator order.
    pub fn last(&self) -> Option<NodeId> {
        self.root.opt().map(|root| self.max_node(root))
    }

    /// Node just after `node` in comparator order, `None` at the maximum.
    pub fn successor(&self, node: NodeId) -> Option<NodeId> {
        let right = self.node(node).right;
        if !right.is_nil() {
            return Some(self.min_node(right));
        }
        // No right subtree: climb until the walk comes up a left link.
        let mut x = node;
        let mut parent = self.node(x).parent;
        while !parent.is_nil() {
            if self.node(parent).left == x {
                return Some(parent);
            }
            x = parent;
            parent = self.node(x).parent;
        }
        None
    }

    /// Node just before `node` in comparator order, `None` at the minimum.
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        let left = self.node(node).left;
        if !left.is_nil() {
            return Some(self.max_node(left));
        }
        let mut x = node;
        let mut parent = self.node(x).parent;
        while !parent.is_nil() {
            if self.node(parent).right == x {
                return Some(parent);
            }
            x = parent;
            parent = self.node(x).parent;
        }
        None
    }

    /// In-order iterator over `(NodeId, &T)`.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter::new(self)
    }

    /// Left rotation at `node`, promoting its right child.
    ///
    /// Keeps the in-order sequence and touches no colors; restoring the
    /// color invariants afterwards is the caller's affair. The right
    /// child must exist.
    pub fn rotate_left(&mut self, node: NodeId) {
        let right = self.node(node).right;
        debug_assert!(!right.is_nil(), "rotate_left needs a right child");
        let parent = self.node(node).parent;
        let right_left = self.node(right).left;

        self.node_mut(right).parent = parent;
        if parent.is_nil() {
            self.root = right;
        } else if self.node(parent).left == node {
            self.node_mut(parent).left = right;
        } else {
            self.node_mut(parent).right = right;
        }

        self.node_mut(right).left = node;
        self.node_mut(node).parent = right;

        self.node_mut(node).right = right_left;
        if !right_left.is_nil() {
            self.node_mut(right_left).parent = node;
        }
    }

    /// Right rotation at `node`, promoting its left child. Mirror of
    /// [`rotate_left`](Self::rotate_left); the left child must exist.
    pub fn rotate_right(&mut self, node: NodeId) {
        let left = self.node(node).left;
        debug_assert!(!left.is_nil(), "rotate_right needs a left child");
        let parent = self.node(node).parent;
        let left_right = self.node(left).right;

        self.node_mut(left).parent = parent;
        if parent.is_nil() {
            self.root = left;
        } else if self.node(parent).left == node {
            self.node_mut(parent).left = left;
        } else {
            self.node_mut(parent).right = left;
        }

        self.node_mut(left).right = node;
        self.node_mut(node).parent = left;

        self.node_mut(node).left = left_right;
        if !left_right.is_nil() {
            self.node_mut(left_right).parent = node;
        }
    }

    /// Unlinks `node` and returns its payload. The handle and any other
    /// handle to the same node become stale. Purely structural: the
    /// comparator is never consulted.
    pub fn remove(&mut self, node: NodeId) -> T {
        let z = node;
        let z_left = self.node(z).left;
        let z_right = self.node(z).right;

        // y is the node spliced out of the structure (z itself, or its
        // successor when z has two children); x takes y's place and
        // x_parent tracks x's logical parent even when x is absent.
        let spliced_color;
        let x;
        let x_parent;

        if z_left.is_nil() {
            spliced_color = self.node(z).color;
            x = z_right;
            x_parent = self.node(z).parent;
            self.transplant(z, z_right);
        } else if z_right.is_nil() {
            spliced_color = self.node(z).color;
            x = z_left;
            x_parent = self.node(z).parent;
            self.transplant(z, z_left);
        } else {
            let y = self.min_node(z_right);
            spliced_color = self.node(y).color;
            x = self.node(y).right;
            if self.node(y).parent == z {
                x_parent = y;
            } else {
                x_parent = self.node(y).parent;
                self.transplant(y, x);
                self.node_mut(y).right = z_right;
                self.node_mut(z_right).parent = y;
            }
            self.transplant(z, y);
            self.node_mut(y).left = z_left;
            self.node_mut(z_left).parent = y;
            let z_color = self.node(z).color;
            self.node_mut(y).color = z_color;
        }

        if spliced_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }

        self.len -= 1;
        self.free_node(z)
    }

    /// Repoints `u`'s parent link (or the root) to `v`. When `v` is
    /// absent the caller keeps track of the detached position itself.
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let parent = self.node(u).parent;
        if parent.is_nil() {
            self.root = v;
        } else if self.node(parent).left == u {
            self.node_mut(parent).left = v;
        } else {
            self.node_mut(parent).right = v;
        }
        if !v.is_nil() {
            self.node_mut(v).parent = parent;
        }
    }

    /// Restores equal black counts after a black node left the tree.
    ///
    /// `x` took the spliced node's place and its subtree is one black
    /// node short; `parent` is x's logical parent, carried explicitly
    /// because `x` may be absent.
    fn delete_fixup(&mut self, mut x: NodeId, mut parent: NodeId) {
        while x != self.root && self.is_black(x) {
            if x == self.node(parent).left {
                let mut s = self.node(parent).right;
                if self.is_red(s) {
                    // Red sibling: rotate it above parent and re-derive.
                    self.rotate_left(parent);
                    self.set_color(parent, Color::Red);
                    self.set_color(s, Color::Black);
                    continue;
                }
                let mut sl = self.node(s).left;
                let mut sr = self.node(s).right;
                if self.is_red(sl) && self.is_black(sr) {
                    // Near child red, far child black: rotate the
                    // sibling so its far child turns red.
                    self.rotate_right(s);
                    self.set_color(s, Color::Red);
                    self.set_color(sl, Color::Black);
                    s = self.node(parent).right;
                    sl = self.node(s).left;
                    sr = self.node(s).right;
                }
                if self.is_red(sr) {
                    // Far child red: one rotation at parent settles it.
                    self.rotate_left(parent);
                    let s_color = self.node(s).color;
                    let p_color = self.node(parent).color;
                    self.node_mut(parent).color = s_color;
                    self.node_mut(s).color = p_color;
                    self.set_color(sr, Color::Black);
                    return;
                }
                if self.is_black(sl) && self.is_black(sr) {
                    if self.is_red(parent) {
                        self.set_color(s, Color::Red);
                        self.set_color(parent, Color::Black);
                        return;
                    }
                    // Whole subtree under parent is now one short:
                    // push the deficit up a level.
                    self.set_color(s, Color::Red);
                    x = parent;
                    parent = self.node(x).parent;
                }
            } else {
                let mut s = self.node(parent).left;
                if self.is_red(s) {
                    self.rotate_right(parent);
                    self.set_color(parent, Color::Red);
                    self.set_color(s, Color::Black);
                    continue;
                }
                let mut sl = self.node(s).left;
                let mut sr = self.node(s).right;
                if self.is_red(sr) && self.is_black(sl) {
                    self.rotate_left(s);
                    self.set_color(s, Color::Red);
                    self.set_color(sr, Color::Black);
                    s = self.node(parent).left;
                    sl = self.node(s).left;
                    sr = self.node(s).right;
                }
                if self.is_red(sl) {
                    self.rotate_right(parent);
                    let s_color = self.node(s).color;
                    let p_color = self.node(parent).color;
                    self.node_mut(parent).color = s_color;
                    self.node_mut(s).color = p_color;
                    self.set_color(sl, Color::Black);
                    return;
                }
                if self.is_black(sl) && self.is_black(sr) {
                    if self.is_red(parent) {
                        self.set_color(s, Color::Red);
                        self.set_color(parent, Color::Black);
                        return;
                    }
                    self.set_color(s, Color::Red);
                    x = parent;
                    parent = self.node(x).parent;
                }
            }
        }
        // Covers both loop exits: x reached the root, or x is red and
        // absorbing the extra black restores the count.
        self.set_color(x, Color::Black);
    }

    fn min_node(&self, mut x: NodeId) -> NodeId {
        debug_assert!(!x.is_nil());
        while !self.node(x).left.is_nil() {
            x = self.node(x).left;
        }
        x
    }

    fn max_node(&self, mut x: NodeId) -> NodeId {
        debug_assert!(!x.is_nil());
        while !self.node(x).right.is_nil() {
            x = self.node(x).right;
        }
        x
    }

    #[inline(always)]
    pub(crate) fn node(&self, x: NodeId) -> &Node<T> {
        debug_assert!(!x.is_nil());
        self.slots[x.idx()]
            .as_ref()
            .expect("stale NodeId: node was removed")
    }

    #[inline(always)]
    fn node_mut(&mut self, x: NodeId) -> &mut Node<T> {
        debug_assert!(!x.is_nil());
        self.slots[x.idx()]
            .as_mut()
            .expect("stale NodeId: node was removed")
    }

    #[inline(always)]
    fn is_red(&self, x: NodeId) -> bool {
        !x.is_nil() && self.node(x).color == Color::Red
    }

    #[inline(always)]
    fn is_black(&self, x: NodeId) -> bool {
        !self.is_red(x)
    }

    /// Color writes on an absent node are dropped; absence reads black.
    #[inline(always)]
    fn set_color(&mut self, x: NodeId, color: Color) {
        if !x.is_nil() {
            self.node_mut(x).color = color;
        }
    }

    fn alloc_node(&mut self, value: T, parent: NodeId) -> NodeId {
        let node = Node::new_leaf(value, parent);
        if let Some(id) = self.free.pop() {
            debug_assert!(self.slots[id.idx()].is_none());
            self.slots[id.idx()] = Some(node);
            id
        } else {
            debug_assert!(self.slots.len() < u32::MAX as usize);
            let id = NodeId(self.slots.len() as u32);
            self.slots.push(Some(node));
            id
        }
    }

    fn free_node(&mut self, id: NodeId) -> T {
        let node = self.slots[id.idx()]
            .take()
            .expect("stale NodeId: node was removed");
        self.free.push(id);
        node.value
    }
}

impl<T: Ord> Default for RbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clone> Clone for RbTree<T, C> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free: self.free.clone(),
            root: self.root,
            len: self.len,
            comparator: self.comparator.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for RbTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(_, value)| value))
            .finish()
    }
}

#[cfg(test)]
impl<T, C> RbTree<T, C> {
    pub(crate) fn preorder_ids(&self) -> Vec<NodeId> {
        fn walk<T, C>(tree: &RbTree<T, C>, x: NodeId, out: &mut Vec<NodeId>) {
            if x.is_nil() {
                return;
            }
            out.push(x);
            walk(tree, tree.node(x).left, out);
            walk(tree, tree.node(x).right, out);
        }
        let mut out = Vec::new();
        walk(self, self.root, &mut out);
        out
    }

    /// Panics unless coloring, black counts, ordering, and the link
    /// bookkeeping all hold.
    pub(crate) fn check_invariants(&self)
    where
        C: Comparator<T>,
    {
        if self.root.is_nil() {
            assert_eq!(self.len, 0);
            return;
        }
        assert!(self.node(self.root).parent.is_nil());
        let mut count = 0;
        self.check_subtree(self.root, &mut count);
        assert_eq!(count, self.len, "len does not match linked node count");

        let mut prev: Option<NodeId> = None;
        let mut cursor = self.first();
        while let Some(id) = cursor {
            if let Some(prev) = prev {
                let ord = self
                    .comparator
                    .cmp(&self.node(prev).value, &self.node(id).value);
                assert_ne!(ord, std::cmp::Ordering::Greater, "search order violated");
            }
            prev = Some(id);
            cursor = self.successor(id);
        }
    }

    /// Returns the subtree's black count, asserting the red and link
    /// rules along the way.
    fn check_subtree(&self, x: NodeId, count: &mut usize) -> usize {
        if x.is_nil() {
            return 0;
        }
        *count += 1;
        let node = self.node(x);
        if node.color == Color::Red {
            assert!(self.is_black(node.left), "red node has a red left child");
            assert!(self.is_black(node.right), "red node has a red right child");
        }
        if !node.left.is_nil() {
            assert_eq!(self.node(node.left).parent, x, "broken left parent link");
        }
        if !node.right.is_nil() {
            assert_eq!(self.node(node.right).parent, x, "broken right parent link");
        }
        let left_black = self.check_subtree(node.left, count);
        let right_black = self.check_subtree(node.right, count);
        assert_eq!(left_black, right_black, "black counts differ under {x:?}");
        left_black + usize::from(node.color == Color::Black)
    }
}
