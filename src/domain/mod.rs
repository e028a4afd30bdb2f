//! Domain layer: the tree model and tree construction
//!
//! This layer is independent of external concerns (no threads, no CLI, no config loading).

pub mod builder;
pub mod error;
pub mod source;
pub mod tree;

pub use builder::{generate, TreeBuilder, DEFAULT_TREE_SIZE};
pub use error::{DomainError, DomainResult};
pub use source::TreeSource;
pub use tree::{in_order, parse_tree, render, size_of, InOrder, Link, Tree};
