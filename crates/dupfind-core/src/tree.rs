//! Immutable ordered labeled syntax tree.

use crate::kind::SyntaxKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide node ID allocator. The only contract is uniqueness within a
/// run; IDs are used as memoization keys by the edit distance engine.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A node in the normalized syntax tree.
///
/// Nodes are immutable after construction. `value` is empty unless the node
/// is an identifier name, a literal, or a predefined type token. The subtree
/// size is computed once at construction and cached.
#[derive(Debug)]
pub struct SyntaxNode {
    kind: SyntaxKind,
    value: String,
    id: u64,
    size: usize,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Build a node over already-built children. Size is cached here:
    /// 1 + the sum of the children's cached sizes.
    pub fn new(kind: SyntaxKind, value: impl Into<String>, children: Vec<SyntaxNode>) -> Self {
        let size = 1 + children.iter().map(SyntaxNode::size).sum::<usize>();
        Self {
            kind,
            value: value.into(),
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            size,
            children,
        }
    }

    /// A leaf node carrying a value (identifier, literal, predefined type).
    pub fn leaf(kind: SyntaxKind, value: impl Into<String>) -> Self {
        Self::new(kind, value, Vec::new())
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Globally unique node ID, cheap to compare.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cached subtree size: 1 + sizes of all descendants.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SyntaxKind;

    #[test]
    fn subtree_size_is_cached_bottom_up() {
        let leaf_a = SyntaxNode::leaf(SyntaxKind::Identifier, "a");
        let leaf_b = SyntaxNode::leaf(SyntaxKind::Identifier, "b");
        let add = SyntaxNode::new(SyntaxKind::AddExpression, "", vec![leaf_a, leaf_b]);
        let root = SyntaxNode::new(SyntaxKind::ReturnStatement, "", vec![add]);

        assert_eq!(root.size(), 4);
        assert_eq!(root.children()[0].size(), 3);
        assert!(!root.is_leaf());
        assert!(root.children()[0].children()[0].is_leaf());
    }

    #[test]
    fn node_ids_are_unique() {
        let a = SyntaxNode::leaf(SyntaxKind::Identifier, "x");
        let b = SyntaxNode::leaf(SyntaxKind::Identifier, "x");
        let c = SyntaxNode::new(SyntaxKind::Block, "", vec![]);
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
    }

    #[test]
    fn value_defaults_to_empty_for_structure() {
        let block = SyntaxNode::new(SyntaxKind::Block, "", vec![]);
        assert!(block.value().is_empty());
        assert_eq!(block.size(), 1);
    }
}
