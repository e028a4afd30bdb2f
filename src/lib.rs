//! Concurrent binary tree walking.
//!
//! Two producer threads walk two trees in-order and hand their values over
//! channels to a consumer that decides whether both sequences are identical.
//!
//! - [`domain`]: the tree model, its text format and tree construction
//! - [`application`]: the channel walker and the comparator
//! - [`config`]: layered settings
//! - [`cli`]: the `treewalk` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::{same, same_sized, Comparator, Outcome, Strategy};
pub use domain::{Tree, TreeBuilder, TreeSource};
