use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::node::Node;

/// Forward-only cursor over the leaves of a tree, left to right.
///
/// Holds the path currently being unwound on an explicit stack, so walking
/// a deep tree never grows the call stack. Borrows the tree's arena; the tree
/// cannot be mutated while the iterator is alive.
pub struct LeafIterator<'a, T> {
    arena: &'a Arena<Node<T>>,
    stack: Vec<Index>,
}

impl<'a, T> LeafIterator<'a, T> {
    #[instrument(level = "trace", skip(arena))]
    pub(crate) fn new(arena: &'a Arena<Node<T>>, root: Option<Index>) -> Self {
        let mut iter = Self {
            arena,
            stack: Vec::new(),
        };
        if let Some(root) = root {
            iter.push_left_spine(root);
        }
        iter
    }

    /// Push `start` and every left descendant until a node without a left child.
    fn push_left_spine(&mut self, start: Index) {
        let mut current = Some(start);
        while let Some(idx) = current {
            self.stack.push(idx);
            current = self.arena.get(idx).and_then(Node::left);
        }
    }

    pub fn has_next(&self) -> bool {
        !self.stack.is_empty()
    }
}

impl<'a, T> Iterator for LeafIterator<'a, T> {
    type Item = (Index, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.pop() {
            let Some(node) = self.arena.get(top) else {
                trace!(?top, "skipping index not present in arena");
                continue;
            };
            if let Some(right) = node.right() {
                self.push_left_spine(right);
            }
            if node.is_leaf() {
                return Some((top, node));
            }
        }
        None
    }
}
