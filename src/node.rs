use std::fmt;

use generational_arena::Index;

use crate::errors::{TreeError, TreeResult};

/// Tree cell stored in the tree's arena.
///
/// A node is either fully internal (two children, no value) or a leaf
/// (no children, one value slot). Mixed shapes cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<T> {
    /// Owns its two children through their arena indices.
    Internal { left: Index, right: Index },
    /// `value` is `None` until the leaf has been initialized.
    Leaf { value: Option<T> },
}

impl<T> Node<T> {
    pub(crate) fn internal(left: Index, right: Index) -> Self {
        Node::Internal { left, right }
    }

    pub fn leaf(value: T) -> Self {
        Node::Leaf { value: Some(value) }
    }

    pub fn empty_leaf() -> Self {
        Node::Leaf { value: None }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Value of an initialized leaf.
    pub fn value(&self) -> TreeResult<&T> {
        match self {
            Node::Leaf { value: Some(value) } => Ok(value),
            Node::Leaf { value: None } => Err(unset_leaf()),
            Node::Internal { .. } => Err(TreeError::IllegalState(
                "internal node holds no value".into(),
            )),
        }
    }

    pub fn value_mut(&mut self) -> TreeResult<&mut T> {
        match self {
            Node::Leaf { value: Some(value) } => Ok(value),
            Node::Leaf { value: None } => Err(unset_leaf()),
            Node::Internal { .. } => Err(TreeError::IllegalState(
                "internal node holds no value".into(),
            )),
        }
    }

    /// Sets (or replaces) the value of a leaf.
    pub fn set_value(&mut self, v: T) -> TreeResult<()> {
        match self {
            Node::Leaf { value } => {
                *value = Some(v);
                Ok(())
            }
            Node::Internal { .. } => Err(TreeError::IllegalState(
                "cannot set a value on an internal node".into(),
            )),
        }
    }

    pub fn left(&self) -> Option<Index> {
        match self {
            Node::Internal { left, .. } => Some(*left),
            Node::Leaf { .. } => None,
        }
    }

    pub fn right(&self) -> Option<Index> {
        match self {
            Node::Internal { right, .. } => Some(*right),
            Node::Leaf { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(Index, Index)> {
        match self {
            Node::Internal { left, right } => Some((*left, *right)),
            Node::Leaf { .. } => None,
        }
    }

    /// Mutable child slot, `false` = left, `true` = right.
    pub(crate) fn child_slot(&mut self, right_side: bool) -> TreeResult<&mut Index> {
        match self {
            Node::Internal { left, .. } if !right_side => Ok(left),
            Node::Internal { right, .. } => Ok(right),
            Node::Leaf { .. } => Err(TreeError::IllegalState(
                "leaf node has no children".into(),
            )),
        }
    }

    /// Exchanges the two children in O(1).
    pub fn swap_children(&mut self) -> TreeResult<()> {
        match self {
            Node::Internal { left, right } => {
                std::mem::swap(left, right);
                Ok(())
            }
            Node::Leaf { .. } => Err(TreeError::IllegalState(
                "cannot swap the children of a leaf".into(),
            )),
        }
    }
}

fn unset_leaf() -> TreeError {
    TreeError::IllegalState("leaf value is not set".into())
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf { value: Some(value) } => write!(f, "{}", value),
            Node::Leaf { value: None } => write!(f, "_"),
            Node::Internal { .. } => write!(f, "*"),
        }
    }
}

/// Mutable handle to one leaf value inside a live tree.
///
/// Writes go straight into the tree; nothing is copied.
#[derive(Debug)]
pub struct LeafHandle<'a, T> {
    index: Index,
    value: &'a mut T,
}

impl<'a, T> LeafHandle<'a, T> {
    pub(crate) fn new(index: Index, value: &'a mut T) -> Self {
        Self { index, value }
    }

    /// Arena index of the leaf.
    pub fn index(&self) -> Index {
        self.index
    }

    pub fn value(&self) -> &T {
        self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        self.value
    }

    /// Replaces the value, returning the previous one.
    pub fn set_value(&mut self, v: T) -> T {
        std::mem::replace(self.value, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Arena;

    fn two_indices() -> (Index, Index) {
        let mut arena: Arena<Node<i32>> = Arena::new();
        (arena.insert(Node::leaf(1)), arena.insert(Node::leaf(2)))
    }

    #[test]
    fn test_unset_leaf_value_is_illegal_state() {
        let node: Node<i32> = Node::empty_leaf();
        assert!(node.is_leaf());
        assert!(node.value().unwrap_err().is_illegal_state());
    }

    #[test]
    fn test_set_value_on_leaf() {
        let mut node = Node::empty_leaf();
        node.set_value(5).unwrap();
        assert_eq!(node.value(), Ok(&5));
        *node.value_mut().unwrap() += 1;
        assert_eq!(node.value(), Ok(&6));
    }

    #[test]
    fn test_internal_node_rejects_value_operations() {
        let (l, r) = two_indices();
        let mut node: Node<i32> = Node::internal(l, r);
        assert!(!node.is_leaf());
        assert!(node.value().unwrap_err().is_illegal_state());
        assert!(node.set_value(3).unwrap_err().is_illegal_state());
    }

    #[test]
    fn test_swap_children() {
        let (l, r) = two_indices();
        let mut node: Node<i32> = Node::internal(l, r);
        node.swap_children().unwrap();
        assert_eq!(node.left(), Some(r));
        assert_eq!(node.right(), Some(l));
        assert_eq!(node.children(), Some((r, l)));
    }

    #[test]
    fn test_leaf_has_no_children() {
        let mut node = Node::leaf(1);
        assert_eq!(node.left(), None);
        assert_eq!(node.right(), None);
        assert!(node.swap_children().unwrap_err().is_illegal_state());
        assert!(node.child_slot(false).is_err());
    }

    #[test]
    fn test_display() {
        let (l, r) = two_indices();
        assert_eq!(Node::leaf(7).to_string(), "7");
        assert_eq!(Node::<i32>::empty_leaf().to_string(), "_");
        assert_eq!(Node::<i32>::internal(l, r).to_string(), "*");
    }

    #[test]
    fn test_leaf_handle_writes_through() {
        let mut value = 1;
        let (idx, _) = two_indices();
        let mut handle = LeafHandle::new(idx, &mut value);
        assert_eq!(handle.set_value(400), 1);
        assert_eq!(*handle.value(), 400);
        assert_eq!(handle.index(), idx);
        assert_eq!(value, 400);
    }
}
