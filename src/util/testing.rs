//! Shared helpers for unit and integration tests.

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{parse_tree, Link, Tree};

static TEST_SETUP: Once = Once::new();

/// Installs the global tracing subscriber once per test binary.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Parses a tree in the parenthesised format, panicking on bad input.
pub fn shape(input: &str) -> Link {
    parse_tree(input).unwrap_or_else(|e| panic!("bad test tree {input:?}: {e}"))
}

/// BST built by inserting `values` in order.
pub fn bst(values: &[i64]) -> Link {
    Tree::from_values(values.iter().copied())
}

/// `n` nodes, each with only a left child. In-order values are `0..n`.
pub fn left_chain(n: i64) -> Tree {
    let mut tree = Tree::leaf(0);
    for value in 1..n {
        tree = Tree::node(Some(Box::new(tree)), value, None);
    }
    tree
}

/// `n` nodes, each with only a right child. In-order values are `0..n`.
pub fn right_chain(n: i64) -> Tree {
    let mut tree = Tree::leaf(n - 1);
    for value in (0..n - 1).rev() {
        tree = Tree::node(None, value, Some(Box::new(tree)));
    }
    tree
}
