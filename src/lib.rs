//! Complete binary leaf tree with seeded, depth-targeted permutations.
//!
//! Values live only at the leaves of a fixed-shape complete binary tree. The
//! tree can be reordered by swapping the two subtrees under a randomly reached
//! node, or by exchanging one grandchild from each side of such a node. Every
//! random decision comes from the tree's own [`RandomSource`], so a fixed seed
//! reproduces the same permutation sequence.
//!
//! ```
//! use hipstree::Tree;
//!
//! let mut tree = Tree::from_values(vec![5, 6, 7, 8], 42)?;
//! tree.swap_at_level(0)?;
//! assert_eq!(tree.in_order_values()?, vec![7, 8, 5, 6]);
//! # Ok::<(), hipstree::TreeError>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod exitcode;
pub mod iter;
pub mod node;
pub mod random;
pub mod tree;
pub mod util;

pub use errors::{TreeError, TreeResult};
pub use generational_arena::Index;
pub use iter::LeafIterator;
pub use node::{LeafHandle, Node};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use tree::{leaf_count_for_level, Tree, DEFAULT_SEPARATOR};
