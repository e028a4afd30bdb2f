//! Binary tree of integer values.
//!
//! Text format (same as the tour's `Tree.String`):
//! - empty tree: `()`
//! - node: `(` [left ` `] value [` ` right] `)`
//!
//! e.g. `((1) 2 (3))` is a root 2 with leaves 1 and 3.

use std::fmt;
use std::str::FromStr;

use termtree::Tree as Diagram;

use crate::domain::error::{DomainError, DomainResult};

/// Owned link to a subtree, `None` for the empty tree.
pub type Link = Option<Box<Tree>>;

/// Binary tree node.
///
/// Every traversal below keeps its pending nodes in a heap-allocated stack,
/// so a degenerate tree (a sorted insertion, a deeply nested shape) costs
/// heap memory proportional to its depth and never the thread's call stack.
pub struct Tree {
    pub left: Link,
    pub value: i64,
    pub right: Link,
}

impl Tree {
    pub fn leaf(value: i64) -> Self {
        Self {
            left: None,
            value,
            right: None,
        }
    }

    pub fn node(left: Link, value: i64, right: Link) -> Self {
        Self { left, value, right }
    }

    /// BST insertion; equal values go to the right subtree.
    pub fn insert(link: &mut Link, value: i64) {
        let mut cursor = link;
        while let Some(node) = cursor {
            cursor = if value < node.value {
                &mut node.left
            } else {
                &mut node.right
            };
        }
        *cursor = Some(Box::new(Tree::leaf(value)));
    }

    /// Builds a BST by inserting `values` in iteration order.
    pub fn from_values<I>(values: I) -> Link
    where
        I: IntoIterator<Item = i64>,
    {
        let mut root = None;
        for value in values {
            Self::insert(&mut root, value);
        }
        root
    }

    /// In-order values without spawning anything.
    pub fn iter(&self) -> InOrder<'_> {
        in_order(Some(self))
    }

    pub fn size(&self) -> usize {
        self.iter().count()
    }

    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(node.left.as_deref().map(|l| (l, level + 1)));
            pending.extend(node.right.as_deref().map(|r| (r, level + 1)));
        }
        deepest
    }

    /// In-order values collected on the calling thread.
    pub fn values(&self) -> Vec<i64> {
        self.iter().collect()
    }

    /// Diagram for terminal display. Missing children are shown as `()`
    /// when the sibling exists so left and right stay distinguishable.
    ///
    /// termtree renders recursively, so this is meant for trees small
    /// enough to read on a terminal.
    pub fn to_diagram(&self) -> Diagram<String> {
        let root = Diagram::new(self.value.to_string());
        if self.left.is_none() && self.right.is_none() {
            return root;
        }
        let side = |link: &Link| match link {
            Some(child) => child.to_diagram(),
            None => Diagram::new("()".to_string()),
        };
        root.with_leaves([side(&self.left), side(&self.right)])
    }
}

/// In-order iterator over a possibly empty tree.
pub fn in_order(tree: Option<&Tree>) -> InOrder<'_> {
    let mut iter = InOrder { stack: Vec::new() };
    iter.descend(tree);
    iter
}

/// Yields values left to right. Holds the path of nodes whose value is
/// still due, at most `depth` entries.
pub struct InOrder<'a> {
    stack: Vec<&'a Tree>,
}

impl<'a> InOrder<'a> {
    fn descend(&mut self, mut link: Option<&'a Tree>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = node.left.as_deref();
        }
    }
}

impl Iterator for InOrder<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let node = self.stack.pop()?;
        self.descend(node.right.as_deref());
        Some(node.value)
    }
}

impl Drop for Tree {
    // Children are detached into a work list and freed one at a time.
    fn drop(&mut self) {
        let mut pending: Vec<Box<Tree>> = Vec::new();
        pending.extend(self.left.take());
        pending.extend(self.right.take());
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

impl Clone for Tree {
    fn clone(&self) -> Self {
        Tree::node(clone_link(&self.left), self.value, clone_link(&self.right))
    }
}

/// Post-order copy: both children of a node are built before the node.
fn clone_link(link: &Link) -> Link {
    enum Step<'a> {
        Visit(&'a Tree),
        Build(&'a Tree),
    }

    let mut steps: Vec<Step<'_>> = link.as_deref().map(Step::Visit).into_iter().collect();
    let mut built: Vec<Tree> = Vec::new();
    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(node) => {
                steps.push(Step::Build(node));
                steps.extend(node.right.as_deref().map(Step::Visit));
                steps.extend(node.left.as_deref().map(Step::Visit));
            }
            Step::Build(node) => {
                // left was finished first, so the right copy is on top
                let right = node.right.as_ref().and_then(|_| built.pop()).map(Box::new);
                let left = node.left.as_ref().and_then(|_| built.pop()).map(Box::new);
                built.push(Tree::node(left, node.value, right));
            }
        }
    }
    built.pop().map(Box::new)
}

impl PartialEq for Tree {
    /// Same shape and same values.
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.value != b.value {
                return false;
            }
            for (x, y) in [(&a.left, &b.left), (&a.right, &b.right)] {
                match (x.as_deref(), y.as_deref()) {
                    (Some(x), Some(y)) => pending.push((x, y)),
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for Tree {}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Token<'a> {
            Node(&'a Tree),
            Value(i64),
            Text(&'static str),
        }

        let mut tokens = vec![Token::Node(self)];
        while let Some(token) = tokens.pop() {
            match token {
                Token::Text(text) => f.write_str(text)?,
                Token::Value(value) => write!(f, "{}", value)?,
                Token::Node(node) => {
                    f.write_str("(")?;
                    // pushed in reverse of output order
                    tokens.push(Token::Text(")"));
                    if let Some(right) = node.right.as_deref() {
                        tokens.push(Token::Node(right));
                        tokens.push(Token::Text(" "));
                    }
                    tokens.push(Token::Value(node.value));
                    if let Some(left) = node.left.as_deref() {
                        tokens.push(Token::Text(" "));
                        tokens.push(Token::Node(left));
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tree{}", self)
    }
}

/// Renders a possibly empty tree in the parenthesised format.
pub fn render(tree: Option<&Tree>) -> String {
    tree.map_or_else(|| "()".to_string(), |t| t.to_string())
}

/// Total number of nodes of a possibly empty tree.
pub fn size_of(tree: Option<&Tree>) -> usize {
    in_order(tree).count()
}

/// Parses the parenthesised format. `()` yields the empty tree.
pub fn parse_tree(input: &str) -> DomainResult<Link> {
    let mut parser = Parser::new(input);
    parser.expect(b'(')?;
    if parser.peek() == Some(b')') {
        parser.pos += 1;
        parser.finish()?;
        return Ok(None);
    }
    parser.pos = 0;
    let root = parser.node()?;
    parser.finish()?;
    Ok(Some(root))
}

impl FromStr for Tree {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_tree(s)?.map(|t| *t).ok_or_else(|| DomainError::InvalidTree {
            input: s.to_string(),
            reason: "empty tree".to_string(),
        })
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

/// A node whose `(` has been read but not its `)`.
#[derive(Default)]
struct Open {
    left: Link,
    value: Option<i64>,
    right: Link,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: String) -> DomainError {
        DomainError::InvalidTree {
            input: self.input.to_string(),
            reason,
        }
    }

    fn skip_ws(&mut self) {
        while self.bytes.get(self.pos).is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, wanted: u8) -> DomainResult<()> {
        match self.peek() {
            Some(b) if b == wanted => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected '{}' at offset {}, found '{}'",
                wanted as char, self.pos, b as char
            ))),
            None => Err(self.error(format!(
                "expected '{}' at offset {}, found end of input",
                wanted as char, self.pos
            ))),
        }
    }

    /// `(` [node] value [node] `)`, nesting tracked on `open`.
    fn node(&mut self) -> DomainResult<Box<Tree>> {
        self.expect(b'(')?;
        let mut open = vec![Open::default()];
        while let Some(top) = open.last_mut() {
            let slot_free = match top.value {
                None => top.left.is_none(),
                Some(_) => top.right.is_none(),
            };
            if slot_free && self.peek() == Some(b'(') {
                self.pos += 1;
                open.push(Open::default());
                continue;
            }
            let Some(value) = top.value else {
                top.value = Some(self.value()?);
                continue;
            };
            self.expect(b')')?;

            let Some(done) = open.pop() else { break };
            let node = Box::new(Tree::node(done.left, value, done.right));
            match open.last_mut() {
                None => return Ok(node),
                Some(parent) if parent.value.is_none() => parent.left = Some(node),
                Some(parent) => parent.right = Some(node),
            }
        }
        Err(self.error("unbalanced parentheses".to_string()))
    }

    fn value(&mut self) -> DomainResult<i64> {
        self.skip_ws();
        let start = self.pos;
        if matches!(self.bytes.get(self.pos), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        while self.bytes.get(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let text = &self.input[start..self.pos];
        text.parse::<i64>().map_err(|e| {
            self.error(format!("invalid value '{}' at offset {}: {}", text, start, e))
        })
    }

    fn finish(&mut self) -> DomainResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error(format!("trailing input at offset {}", self.pos))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //     2
    //    / \
    //   1   3
    fn balanced() -> Tree {
        Tree::node(
            Some(Box::new(Tree::leaf(1))),
            2,
            Some(Box::new(Tree::leaf(3))),
        )
    }

    #[test]
    fn given_values_when_inserting_then_in_order_is_sorted() {
        let tree = Tree::from_values([5, 3, 8, 1, 4, 9]).unwrap();
        assert_eq!(tree.values(), vec![1, 3, 4, 5, 8, 9]);
        assert_eq!(tree.size(), 6);
    }

    #[test]
    fn given_duplicate_values_when_inserting_then_duplicates_are_kept() {
        let tree = Tree::from_values([2, 2, 1]).unwrap();
        assert_eq!(tree.values(), vec![1, 2, 2]);
        assert!(tree.right.is_some());
    }

    #[test]
    fn given_sorted_insertion_when_measuring_depth_then_tree_is_degenerate() {
        let tree = Tree::from_values(1..=5).unwrap();
        assert_eq!(tree.depth(), 5);
        assert_eq!(balanced().depth(), 2);
    }

    #[test]
    fn given_tree_when_displayed_then_uses_parenthesised_format() {
        assert_eq!(balanced().to_string(), "((1) 2 (3))");
        assert_eq!(render(None), "()");
        let right_only = Tree::node(None, 1, Some(Box::new(Tree::leaf(2))));
        assert_eq!(right_only.to_string(), "(1 (2))");
    }

    #[test]
    fn given_rendered_tree_when_parsed_then_shape_is_preserved() {
        let tree = Tree::from_values([4, 2, 6, 1, 3, 5, 7, -1]).unwrap();
        let parsed: Tree = tree.to_string().parse().unwrap();
        assert_eq!(parsed, *tree);
    }

    #[test]
    fn given_whitespace_when_parsing_then_it_is_ignored() {
        let parsed = parse_tree("  ( (1)  2 (3) ) ").unwrap().unwrap();
        assert_eq!(*parsed, balanced());
    }

    #[test]
    fn given_empty_parens_when_parsing_then_returns_empty_tree() {
        assert_eq!(parse_tree("()").unwrap(), None);
        assert_eq!(parse_tree("( )").unwrap(), None);
        assert!("()".parse::<Tree>().is_err());
    }

    #[test]
    fn given_malformed_input_when_parsing_then_returns_invalid_tree() {
        for input in ["", "(1", "1)", "((1) 2 (3)", "(x)", "(1) (2)", "(() 1 ())"] {
            let err = parse_tree(input).unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidTree { .. }),
                "{input:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn given_deep_chain_when_traversing_then_no_stack_overflow() {
        let n = 200_000;
        let tree = crate::util::testing::left_chain(n);
        assert_eq!(tree.size(), n as usize);
        assert_eq!(tree.depth(), n as usize);
        assert_eq!(tree.values(), (0..n).collect::<Vec<_>>());

        let copy = tree.clone();
        assert_eq!(copy, tree);

        let parsed: Tree = tree.to_string().parse().unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn given_sorted_values_when_inserting_then_builds_degenerate_chain() {
        let tree = Tree::from_values(0..20_000).unwrap();
        assert_eq!(tree.depth(), 20_000);
        assert_eq!(tree.iter().take(3).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(tree.left.is_none());
    }

    #[test]
    fn given_different_shapes_when_comparing_trees_then_not_equal() {
        assert_ne!(balanced(), Tree::from_values([1, 2, 3]).map(|t| *t).unwrap());
        assert_eq!(format!("{:?}", balanced()), "Tree((1) 2 (3))");
    }

    #[test]
    fn given_tree_when_building_diagram_then_missing_child_is_marked() {
        let tree = Tree::node(None, 1, Some(Box::new(Tree::leaf(2))));
        let diagram = tree.to_diagram().to_string();
        assert!(diagram.starts_with("1\n"));
        assert!(diagram.contains("()"));
        assert!(diagram.contains('2'));
    }
}
