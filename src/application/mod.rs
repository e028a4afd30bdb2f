//! Application layer: concurrent walking and comparison
//!
//! This layer runs domain trees through producer threads and channels.

pub mod compare;
pub mod error;
pub mod walker;

pub use compare::{same, same_sized, Comparator, Mismatch, Outcome, Phase, Strategy};
pub use error::{ApplicationError, ApplicationResult};
pub use walker::{collect_stream, spawn_walker, walk, Side, WalkError, WalkResult};
