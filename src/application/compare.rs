//! Concurrent tree comparison.
//!
//! Two walkers run on scoped threads, one per tree, and the calling thread
//! consumes both streams pairwise. Producers are always joined before
//! `compare` returns: after an early exit the receivers are dropped first,
//! which makes a producer blocked on send observe `Disconnected` and return.

use std::fmt;
use std::str::FromStr;
use std::thread;

use clap::ValueEnum;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::walker::{join, spawn_walker, Side};
use crate::application::ApplicationResult;
use crate::domain::Tree;

/// How the consumer reads the two streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Read both streams to closure, even after a mismatch.
    #[default]
    Drain,
    /// Stop at the first mismatch and abandon both streams.
    EarlyExit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Drain => f.write_str("drain"),
            Strategy::EarlyExit => f.write_str("early-exit"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drain" => Ok(Strategy::Drain),
            "early-exit" | "early_exit" => Ok(Strategy::EarlyExit),
            other => Err(format!(
                "unknown strategy '{}', expected 'drain' or 'early-exit'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Start,
    Draining,
    Done,
}

/// First pair that differed. `None` on a side means that stream was already closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub position: usize,
    pub left: Option<i64>,
    pub right: Option<i64>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<i64>| v.map_or_else(|| "<end>".to_string(), |v| v.to_string());
        write!(
            f,
            "position {}: left={} right={}",
            self.position,
            show(self.left),
            show(self.right)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub same: bool,
    /// Pairwise reads in which at least one side still had a value.
    pub pairs: usize,
    pub first_mismatch: Option<Mismatch>,
}

impl Outcome {
    fn new() -> Self {
        Self {
            same: true,
            pairs: 0,
            first_mismatch: None,
        }
    }

    fn record(&mut self, left: Option<i64>, right: Option<i64>) {
        if self.same && left != right {
            self.same = false;
            self.first_mismatch = Some(Mismatch {
                position: self.pairs,
                left,
                right,
            });
        }
        self.pairs += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Comparator {
    strategy: Strategy,
    capacity: usize,
}

impl Comparator {
    /// `capacity` 0 means unbuffered handoff between each walker and the consumer.
    pub fn new(strategy: Strategy, capacity: usize) -> Self {
        Self { strategy, capacity }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[instrument(level = "debug", skip_all, fields(strategy = %self.strategy, capacity = self.capacity))]
    pub fn compare(&self, left: Option<&Tree>, right: Option<&Tree>) -> ApplicationResult<Outcome> {
        let mut phase = Phase::Start;
        debug!(?phase);

        thread::scope(|s| -> ApplicationResult<Outcome> {
            let (left_rx, left_handle) = spawn_walker(s, Side::Left, left, self.capacity)?;
            let (right_rx, right_handle) = spawn_walker(s, Side::Right, right, self.capacity)?;
            advance(&mut phase, Phase::Draining);

            let outcome = match self.strategy {
                Strategy::Drain => drain(&left_rx, &right_rx),
                Strategy::EarlyExit => early_exit(&left_rx, &right_rx),
            };

            drop(left_rx);
            drop(right_rx);
            for (side, handle) in [(Side::Left, left_handle), (Side::Right, right_handle)] {
                match join(side, handle)? {
                    Ok(sent) => debug!(%side, sent, "walker finished"),
                    Err(e) => debug!(%side, "walker abandoned: {}", e),
                }
            }
            advance(&mut phase, Phase::Done);
            debug!(same = outcome.same, pairs = outcome.pairs, "comparison done");
            Ok(outcome)
        })
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    debug_assert!(next > *phase, "phase cannot go from {:?} to {:?}", phase, next);
    debug!(from = ?*phase, to = ?next, "phase");
    *phase = next;
}

fn drain(left: &Receiver<i64>, right: &Receiver<i64>) -> Outcome {
    let mut outcome = Outcome::new();
    loop {
        let l = left.recv().ok();
        let r = right.recv().ok();
        if l.is_none() && r.is_none() {
            return outcome;
        }
        outcome.record(l, r);
    }
}

fn early_exit(left: &Receiver<i64>, right: &Receiver<i64>) -> Outcome {
    let mut outcome = Outcome::new();
    for l in left.iter() {
        outcome.record(Some(l), right.recv().ok());
        if !outcome.same {
            return outcome;
        }
    }
    // left is closed; any further value on the right means it was longer
    if let Ok(r) = right.recv() {
        outcome.record(None, Some(r));
    }
    outcome
}

/// Whether both trees hold the same in-order sequence. Reads both streams to the end.
pub fn same(left: Option<&Tree>, right: Option<&Tree>) -> ApplicationResult<bool> {
    Comparator::new(Strategy::Drain, 0)
        .compare(left, right)
        .map(|o| o.same)
}

/// Like [`same`], but returns at the first mismatch.
///
/// Meant for trees of equal size; unequal sizes still report `false`.
pub fn same_sized(left: Option<&Tree>, right: Option<&Tree>) -> ApplicationResult<bool> {
    Comparator::new(Strategy::EarlyExit, 0)
        .compare(left, right)
        .map(|o| o.same)
}
