//! In-order tree walker feeding a channel.
//!
//! The walker never closes the channel: the task that launched it drops the
//! `Sender` once the walk returns. A dropped `Receiver` stops the walk at the
//! next send, so an abandoned producer always terminates.

use std::any::Any;
use std::fmt;
use std::thread::{self, Scope, ScopedJoinHandle};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{in_order, Tree};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkError {
    #[error("receiver dropped after {sent} values")]
    Disconnected { sent: usize },
}

pub type WalkResult<T> = Result<T, WalkError>;

/// Which of the two compared trees a walker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Value channel. Capacity 0 is a rendezvous: every send waits for a receive.
pub fn channel(capacity: usize) -> (Sender<i64>, Receiver<i64>) {
    crossbeam_channel::bounded(capacity)
}

/// Sends every value of `tree` in-order on `tx` and returns the count sent.
///
/// Traversal state lives on the heap, so the walker thread's stack use does
/// not grow with the depth of the tree.
pub fn walk(tree: Option<&Tree>, tx: &Sender<i64>) -> WalkResult<usize> {
    let mut sent = 0;
    for value in in_order(tree) {
        tx.send(value).map_err(|_| WalkError::Disconnected { sent })?;
        sent += 1;
    }
    Ok(sent)
}

/// Launches a walker on a scoped thread named `walker-<side>`.
///
/// The thread owns the sender and drops it when the walk returns, which
/// closes the stream for the receiver handed back here.
pub fn spawn_walker<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    side: Side,
    tree: Option<&'env Tree>,
    capacity: usize,
) -> ApplicationResult<(Receiver<i64>, ScopedJoinHandle<'scope, WalkResult<usize>>)> {
    let (tx, rx) = channel(capacity);
    let handle = thread::Builder::new()
        .name(format!("walker-{}", side))
        .spawn_scoped(scope, move || {
            let result = walk(tree, &tx);
            drop(tx);
            result
        })
        .map_err(|e| ApplicationError::Walker {
            side: side.to_string(),
            message: format!("cannot spawn thread: {}", e),
        })?;
    Ok((rx, handle))
}

/// Joins a walker thread; a panic becomes `ApplicationError::Walker`.
pub fn join(
    side: Side,
    handle: ScopedJoinHandle<'_, WalkResult<usize>>,
) -> ApplicationResult<WalkResult<usize>> {
    handle.join().map_err(|payload| ApplicationError::Walker {
        side: side.to_string(),
        message: panic_message(&*payload),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

/// Walks `tree` on its own thread and collects the stream on the caller.
#[instrument(level = "debug", skip(tree))]
pub fn collect_stream(tree: Option<&Tree>, capacity: usize) -> ApplicationResult<Vec<i64>> {
    thread::scope(|s| -> ApplicationResult<Vec<i64>> {
        let (rx, handle) = spawn_walker(s, Side::Left, tree, capacity)?;
        let values: Vec<i64> = rx.iter().collect();
        let sent = join(Side::Left, handle)?.map_err(|e| ApplicationError::Walker {
            side: Side::Left.to_string(),
            message: e.to_string(),
        })?;
        debug!(sent, "walk complete");
        Ok(values)
    })
}
