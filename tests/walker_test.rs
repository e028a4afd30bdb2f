//! Integration tests for the channel walker.

use std::thread;

use proptest::prelude::*;

use treewalk::application::walker::{channel, join, spawn_walker, walk, Side, WalkError};
use treewalk::application::collect_stream;
use treewalk::domain::Tree;
use treewalk::util::testing::{init_test_setup, left_chain, right_chain, shape};

#[test]
fn given_empty_tree_when_spawned_then_stream_is_empty_and_closed() {
    init_test_setup();
    thread::scope(|s| {
        let (rx, handle) = spawn_walker(s, Side::Left, None, 0).unwrap();
        assert!(rx.recv().is_err(), "stream should be closed without values");
        assert_eq!(join(Side::Left, handle).unwrap(), Ok(0));
    });
}

#[test]
fn given_non_bst_shape_when_walking_then_emits_in_order_not_sorted() {
    init_test_setup();
    //     1
    //    / \
    //   3   2
    let tree = shape("((3) 1 (2))");
    assert_eq!(collect_stream(tree.as_deref(), 0).unwrap(), vec![3, 1, 2]);
}

#[test]
fn given_shared_sender_when_walking_twice_then_streams_concatenate() {
    init_test_setup();
    let a = shape("((1) 2)");
    let b = shape("(3 (4))");
    let (tx, rx) = channel(8);
    assert_eq!(walk(a.as_deref(), &tx), Ok(2));
    assert_eq!(walk(b.as_deref(), &tx), Ok(2));
    drop(tx);
    assert_eq!(rx.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
}

#[test]
fn given_receiver_dropped_midway_when_walking_then_reports_values_sent() {
    init_test_setup();
    let tree = Tree::from_values(1..=10);
    thread::scope(|s| {
        let (rx, handle) = spawn_walker(s, Side::Right, tree.as_deref(), 0).unwrap();
        let first: Vec<i64> = rx.iter().take(3).collect();
        assert_eq!(first, vec![1, 2, 3]);
        drop(rx);
        assert_eq!(
            join(Side::Right, handle).unwrap(),
            Err(WalkError::Disconnected { sent: 3 })
        );
    });
}

#[test]
fn given_million_node_chains_when_walking_on_threads_then_every_value_arrives() {
    init_test_setup();
    let n = 1_000_000;
    for tree in [left_chain(n), right_chain(n)] {
        let streamed = collect_stream(Some(&tree), 1024).unwrap();
        assert_eq!(streamed.len(), n as usize);
        assert!(streamed.iter().copied().eq(0..n));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn walker_emits_exactly_the_in_order_values(
        values in prop::collection::vec(any::<i64>(), 0..60),
        capacity in 0usize..4,
    ) {
        let tree = Tree::from_values(values.clone());
        let streamed = collect_stream(tree.as_deref(), capacity).unwrap();
        prop_assert_eq!(streamed.len(), values.len());
        let expected = tree.as_deref().map(Tree::values).unwrap_or_default();
        prop_assert_eq!(streamed, expected);
    }
}
