//! Command-line description of a tree.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;
use crate::domain::tree::{parse_tree, Tree};

/// Where a tree comes from.
///
/// Accepted forms:
/// - `empty` or `()`: the empty tree
/// - `k=N`: a generated tour tree holding `N, 2N, ...`
/// - `(...)`: an explicit shape in the parenthesised format
/// - `5,3,8`: a BST built by inserting the values in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    Empty,
    Generated { k: i64 },
    Shape(Box<Tree>),
    Values(Vec<i64>),
}

impl FromStr for TreeSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = |reason: String| DomainError::InvalidTreeSource {
            input: s.to_string(),
            reason,
        };

        if input.is_empty() {
            return Err(invalid("empty input, use 'empty' for the empty tree".into()));
        }
        if input.eq_ignore_ascii_case("empty") {
            return Ok(Self::Empty);
        }
        if input.starts_with('(') {
            return Ok(match parse_tree(input)? {
                Some(tree) => Self::Shape(tree),
                None => Self::Empty,
            });
        }
        if let Some(k) = input.strip_prefix("k=") {
            let k = k
                .trim()
                .parse::<i64>()
                .map_err(|e| invalid(format!("invalid k '{}': {}", k, e)))?;
            return Ok(Self::Generated { k });
        }

        input
            .split(',')
            .map(|v| {
                let v = v.trim();
                v.parse::<i64>()
                    .map_err(|e| invalid(format!("invalid value '{}': {}", v, e)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::Values)
    }
}

impl fmt::Display for TreeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty"),
            Self::Generated { k } => write!(f, "k={}", k),
            Self::Shape(tree) => write!(f, "{}", tree),
            Self::Values(values) => {
                let joined: Vec<String> = values.iter().map(i64::to_string).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}
