//! Tree construction: random tour trees and `TreeSource` resolution.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::source::TreeSource;
use crate::domain::tree::{Link, Tree};

/// Number of values in a generated tree unless configured otherwise.
pub const DEFAULT_TREE_SIZE: usize = 10;

/// Random BST holding `k, 2k, ..., size*k`, inserted in shuffled order.
///
/// Two calls with the same `k` and `size` hold the same values but
/// (usually) differ in shape.
pub fn generate<R: Rng + ?Sized>(k: i64, size: usize, rng: &mut R) -> DomainResult<Link> {
    let overflow = || DomainError::ValueOverflow { k, size };
    let mut values = (1..=size)
        .map(|i| {
            i64::try_from(i)
                .ok()
                .and_then(|i| i.checked_mul(k))
                .ok_or_else(overflow)
        })
        .collect::<DomainResult<Vec<i64>>>()?;
    values.shuffle(rng);
    Ok(Tree::from_values(values))
}

/// Builds trees from sources, owning the RNG so successive generated
/// trees get different shapes while a fixed seed stays reproducible.
#[derive(Debug)]
pub struct TreeBuilder {
    size: usize,
    rng: StdRng,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TREE_SIZE, None)
    }
}

impl TreeBuilder {
    pub fn new(size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { size, rng }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn build(&mut self, source: &TreeSource) -> DomainResult<Link> {
        let tree = match source {
            TreeSource::Empty => None,
            TreeSource::Generated { k } => generate(*k, self.size, &mut self.rng)?,
            TreeSource::Values(values) => Tree::from_values(values.iter().copied()),
            TreeSource::Shape(tree) => Some(tree.clone()),
        };
        debug!(
            "built tree with {} nodes",
            tree.as_deref().map_or(0, Tree::size)
        );
        Ok(tree)
    }
}
