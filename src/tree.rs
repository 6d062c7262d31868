use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::errors::{TreeError, TreeResult};
use crate::iter::LeafIterator;
use crate::node::{LeafHandle, Node};
use crate::random::{RandomSource, SeededRandom};

/// Separator used by `Display` and the demo output.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Complete binary tree that stores values only at its leaves.
///
/// Every leaf sits exactly `depth` layers below (and including) the root, so a
/// populated tree has `2^(depth-1)` leaves. Nodes live in an arena owned by the
/// tree; resetting or dropping the tree releases all of them at once.
///
/// The tree owns its [`RandomSource`]; the swap family draws all path and
/// side decisions from it, so a fixed seed reproduces every permutation.
#[derive(Debug)]
pub struct Tree<T, R = SeededRandom> {
    arena: Arena<Node<T>>,
    root: Option<Index>,
    depth: usize,
    rng: R,
}

impl<T> Default for Tree<T, SeededRandom> {
    fn default() -> Self {
        Self::with_source(SeededRandom::from_entropy())
    }
}

impl<T> Tree<T, SeededRandom> {
    /// Empty tree with a reproducible random source.
    pub fn new(seed: u64) -> Self {
        Self::with_source(SeededRandom::new(seed))
    }

    /// Tree populated from `values`, see [`Tree::populate_by_vector`].
    pub fn from_values(values: Vec<T>, seed: u64) -> TreeResult<Self> {
        Self::from_values_with_source(values, SeededRandom::new(seed))
    }
}

impl<T, R: RandomSource> Tree<T, R> {
    pub fn with_source(rng: R) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            depth: 0,
            rng,
        }
    }

    pub fn from_values_with_source(values: Vec<T>, rng: R) -> TreeResult<Self> {
        let mut tree = Self::with_source(rng);
        tree.populate_by_vector(values)?;
        Ok(tree)
    }

    /// Number of layers from root to leaf inclusive, 0 for an empty tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn leaf_count(&self) -> usize {
        match self.depth {
            0 => 0,
            d => 1 << (d - 1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Read-only view of one node. Nodes can only be rewired by the tree's
    /// own operations:
    ///
    /// ```compile_fail
    /// let mut tree = hipstree::Tree::from_values(vec![1, 2, 3, 4], 0).unwrap();
    /// let root = tree.root().unwrap();
    /// *tree.node_mut(root).unwrap() = hipstree::Node::leaf(9);
    /// ```
    ///
    /// ```compile_fail
    /// let tree = hipstree::Tree::from_values(vec![1, 2], 0).unwrap();
    /// let root = tree.root().unwrap();
    /// let _cycle: hipstree::Node<i32> = hipstree::Node::internal(root, root);
    /// ```
    pub fn node(&self, idx: Index) -> TreeResult<&Node<T>> {
        self.arena
            .get(idx)
            .ok_or_else(|| TreeError::Internal(format!("node {:?} not in tree", idx)))
    }

    pub(crate) fn node_mut(&mut self, idx: Index) -> TreeResult<&mut Node<T>> {
        self.arena
            .get_mut(idx)
            .ok_or_else(|| TreeError::Internal(format!("node {:?} not in tree", idx)))
    }

    pub fn random_source(&self) -> &R {
        &self.rng
    }

    /// Leaf cursor starting at the leftmost leaf.
    pub fn iter(&self) -> LeafIterator<'_, T> {
        LeafIterator::new(&self.arena, self.root)
    }

    // ------------------------------------------------------------------
    // Construction and teardown
    // ------------------------------------------------------------------

    /// Replaces the tree with `level` layers of nodes whose leaves are unset.
    #[instrument(level = "debug", skip(self))]
    pub fn populate_to_level(&mut self, level: usize) -> TreeResult<()> {
        let leaves = allocatable_leaves::<T>(level)?;
        self.build(std::iter::repeat_with(Node::empty_leaf).take(leaves), leaves, level)
    }

    /// Same shape as [`Tree::populate_to_level`], every leaf set to a copy of `value`.
    #[instrument(level = "debug", skip(self, value))]
    pub fn populate_to_level_value(&mut self, level: usize, value: T) -> TreeResult<()>
    where
        T: Clone,
    {
        let leaves = allocatable_leaves::<T>(level)?;
        self.build(
            std::iter::repeat_with(|| Node::leaf(value.clone())).take(leaves),
            leaves,
            level,
        )
    }

    /// Replaces the tree with one whose leaves are `values`, in order.
    ///
    /// The length must be a non-zero power of two; otherwise the call fails
    /// with `InvalidArgument` and the current structure is kept.
    #[instrument(level = "debug", skip(self, values), fields(len = values.len()))]
    pub fn populate_by_vector(&mut self, values: Vec<T>) -> TreeResult<()> {
        if !values.len().is_power_of_two() {
            return Err(TreeError::InvalidArgument(format!(
                "length is not a power of two: {}",
                values.len()
            )));
        }
        let level = values.len().trailing_zeros() as usize + 1;
        self.populate_to_level(level)?;

        let slots: Vec<Index> = self.iter().map(|(idx, _)| idx).collect();
        for (idx, value) in slots.into_iter().zip(values) {
            self.node_mut(idx)?.set_value(value)?;
        }
        debug!(depth = self.depth, "populated from vector");
        Ok(())
    }

    /// Drops every node; safe to call on an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn reset_tree(&mut self) {
        self.arena.clear();
        self.root = None;
        self.depth = 0;
    }

    /// Bottom-up build: pair adjacent nodes of each layer under a new parent
    /// until one node remains.
    ///
    /// The new nodes go into a fresh arena that replaces the current one only
    /// once it is complete, so a failed reservation keeps the old tree.
    fn build(
        &mut self,
        leaves: impl Iterator<Item = Node<T>>,
        leaf_count: usize,
        level: usize,
    ) -> TreeResult<()> {
        let mut layer: Vec<Index> = Vec::new();
        layer.try_reserve_exact(leaf_count).map_err(|e| {
            TreeError::InvalidArgument(format!("cannot allocate {} leaves: {}", leaf_count, e))
        })?;

        let mut arena = Arena::new();
        layer.extend(leaves.map(|leaf| arena.insert(leaf)));
        while layer.len() > 1 {
            layer = layer
                .chunks_exact(2)
                .map(|pair| arena.insert(Node::internal(pair[0], pair[1])))
                .collect();
        }

        self.arena = arena;
        self.root = layer.first().copied();
        self.depth = level;
        trace!(nodes = self.arena.len(), depth = level, "tree built");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Copies of the leaf values, left to right.
    #[instrument(level = "trace", skip(self))]
    pub fn in_order_values(&self) -> TreeResult<Vec<T>>
    where
        T: Clone,
    {
        self.iter().map(|(_, node)| node.value().cloned()).collect()
    }

    /// Mutable handles to the leaf values, left to right.
    ///
    /// Writes through a handle land in the tree. Fails with `IllegalState`
    /// when any leaf is still unset.
    #[instrument(level = "trace", skip(self))]
    pub fn in_order_leaves(&mut self) -> TreeResult<Vec<LeafHandle<'_, T>>> {
        let order: Vec<Index> = self.iter().map(|(idx, _)| idx).collect();

        let mut slots: HashMap<Index, &mut T> = HashMap::with_capacity(order.len());
        for (idx, node) in self.arena.iter_mut() {
            if let Node::Leaf { value } = node {
                let value = value.as_mut().ok_or_else(|| {
                    TreeError::IllegalState(format!("leaf {:?} value is not set", idx))
                })?;
                slots.insert(idx, value);
            }
        }

        order
            .into_iter()
            .map(|idx| {
                slots
                    .remove(&idx)
                    .map(|value| LeafHandle::new(idx, value))
                    .ok_or_else(|| TreeError::Internal(format!("leaf {:?} not in arena", idx)))
            })
            .collect()
    }

    /// Joins the leaf values left to right; unset leaves render as `_`.
    pub fn to_string_with(&self, separator: &str) -> String
    where
        T: fmt::Display,
    {
        self.iter().map(|(_, node)| node).join(separator)
    }

    /// Structure rendered with `termtree`: `*` for internal nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn to_termtree(&self) -> termtree::Tree<String>
    where
        T: fmt::Display,
    {
        let Some(root) = self.root else {
            return termtree::Tree::new("(empty)".to_string());
        };

        // Post-order with an explicit stack; children are rendered before parents.
        let mut rendered: HashMap<Index, termtree::Tree<String>> = HashMap::new();
        let mut stack = vec![(root, false)];
        while let Some((idx, visited)) = stack.pop() {
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            match node.children() {
                Some((left, right)) if !visited => {
                    stack.push((idx, true));
                    stack.push((right, false));
                    stack.push((left, false));
                }
                Some((left, right)) => {
                    let leaves: Vec<_> = [left, right]
                        .iter()
                        .filter_map(|child| rendered.remove(child))
                        .collect();
                    rendered.insert(idx, termtree::Tree::new(node.to_string()).with_leaves(leaves));
                }
                None => {
                    rendered.insert(idx, termtree::Tree::new(node.to_string()));
                }
            }
        }
        rendered
            .remove(&root)
            .unwrap_or_else(|| termtree::Tree::new("(empty)".to_string()))
    }

    // ------------------------------------------------------------------
    // Randomized swaps
    // ------------------------------------------------------------------

    /// Swaps the children of a randomly reached node on a random level in
    /// `[0, depth - 2]`. Returns the level that was swapped.
    #[instrument(level = "debug", skip(self))]
    pub fn swap_at_random_level(&mut self) -> TreeResult<usize> {
        let max_level = self.depth.checked_sub(2).ok_or_else(|| {
            TreeError::InvalidArgument(format!(
                "random swap needs depth >= 2, tree has depth {}",
                self.depth
            ))
        })?;
        let level = self.rng.next_int(max_level);
        debug!(level, "drew swap level");
        self.walk_and_swap(level)?;
        Ok(level)
    }

    /// Walks randomly down to `level` and swaps that node's children.
    ///
    /// `level` must be in `[0, depth - 1]`. The leaf layer (`depth - 1`) is
    /// accepted; a leaf has no children, so nothing moves.
    #[instrument(level = "debug", skip(self))]
    pub fn swap_at_level(&mut self, level: usize) -> TreeResult<()> {
        match self.depth.checked_sub(1) {
            Some(max) if level <= max => self.walk_and_swap(level),
            _ => Err(level_out_of_range(level, self.depth, "depth - 1")),
        }
    }

    /// Walks randomly down to `level`, then moves one grandchild from under
    /// the left child across to the right child and vice versa.
    ///
    /// `level` must be in `[0, depth - 2]`. Two fresh bits choose which
    /// grandchild is taken on each side; the other two stay where they are.
    /// When the children at `level + 1` are leaves there are no grandchildren
    /// and the two leaves themselves are exchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn swap_grandchildren_at_level(&mut self, level: usize) -> TreeResult<()> {
        match self.depth.checked_sub(2) {
            Some(max) if level <= max => {}
            _ => return Err(level_out_of_range(level, self.depth, "depth - 2")),
        }

        let target = self.walk(level)?;
        let (left, right) = self.node(target)?.children().ok_or_else(|| {
            TreeError::Internal(format!("node at level {} has no children", level))
        })?;
        let left_side = self.rng.next_bit();
        let right_side = self.rng.next_bit();
        debug!(level, left_side, right_side, "drew grandchild sides");

        if self.node(left)?.is_leaf() {
            debug!("children are leaves, exchanging them");
            return self.node_mut(target)?.swap_children();
        }

        match self.arena.get2_mut(left, right) {
            (Some(left_node), Some(right_node)) => {
                std::mem::swap(
                    left_node.child_slot(left_side)?,
                    right_node.child_slot(right_side)?,
                );
                Ok(())
            }
            _ => Err(TreeError::Internal(format!(
                "children of node at level {} not in arena",
                level
            ))),
        }
    }

    /// Grandchild swap on a random level in `[0, depth - 3]`, the levels
    /// whose grandchildren exist. Returns the level used.
    #[instrument(level = "debug", skip(self))]
    pub fn swap_grandchildren_at_random_level(&mut self) -> TreeResult<usize> {
        let max_level = self.depth.checked_sub(3).ok_or_else(|| {
            TreeError::InvalidArgument(format!(
                "random grandchild swap needs depth >= 3, tree has depth {}",
                self.depth
            ))
        })?;
        let level = self.rng.next_int(max_level);
        self.swap_grandchildren_at_level(level)?;
        Ok(level)
    }

    fn walk_and_swap(&mut self, level: usize) -> TreeResult<()> {
        let target = self.walk(level)?;
        let node = self.node_mut(target)?;
        if node.is_leaf() {
            debug!(level, "walk ended on a leaf, nothing to swap");
            return Ok(());
        }
        node.swap_children()
    }

    /// From the root, take one random branch per layer until `level`.
    #[instrument(level = "trace", skip(self))]
    fn walk(&mut self, level: usize) -> TreeResult<Index> {
        let mut current = self
            .root
            .ok_or_else(|| TreeError::InvalidArgument("tree is empty".into()))?;
        for layer in 0..level {
            let go_right = self.rng.next_bit();
            let (left, right) = self.node(current)?.children().ok_or_else(|| {
                TreeError::Internal(format!("walk reached a leaf at layer {}", layer))
            })?;
            current = if go_right { right } else { left };
            trace!(layer, go_right, "walk step");
        }
        Ok(current)
    }
}

impl<T: fmt::Display, R: RandomSource> fmt::Display for Tree<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with(DEFAULT_SEPARATOR))
    }
}

/// Leaves in a complete tree of `level` layers.
///
/// `level` must be at least 1 and small enough that `2^level - 1` nodes can
/// be counted in a `usize`.
pub fn leaf_count_for_level(level: usize) -> TreeResult<usize> {
    if level == 0 {
        return Err(TreeError::InvalidArgument(
            "level must be at least 1".into(),
        ));
    }
    if level >= usize::BITS as usize {
        return Err(TreeError::InvalidArgument(format!(
            "level {} is too deep to address",
            level
        )));
    }
    Ok(1 << (level - 1))
}

/// Leaves for `level`, rejecting levels whose `2^level - 1` nodes could not
/// fit in one allocation.
fn allocatable_leaves<T>(level: usize) -> TreeResult<usize> {
    let leaves = leaf_count_for_level(level)?;
    let nodes = leaves * 2 - 1;
    let per_node = std::mem::size_of::<Node<T>>().max(1) + std::mem::size_of::<Index>();
    match nodes.checked_mul(per_node) {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(leaves),
        _ => Err(TreeError::InvalidArgument(format!(
            "level {} needs {} nodes, more than can be allocated",
            level, nodes
        ))),
    }
}

fn level_out_of_range(level: usize, depth: usize, bound: &str) -> TreeError {
    TreeError::InvalidArgument(format!(
        "level {} out of range for depth {} (must be <= {})",
        level, depth, bound
    ))
}
