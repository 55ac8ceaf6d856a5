//! Per-method fingerprint: 128-bit Bloom filter plus node-kind histogram.
//!
//! The fingerprint is a cheap "might-be-similar" admission filter computed
//! once at ingestion. It is deliberately permissive: the only pairs it
//! rejects are those whose Bloom filters are disjoint.

use crate::kind::{Category, SyntaxKind};
use crate::tree::SyntaxNode;
use std::collections::HashMap;

const BLOOM_BITS: u64 = 128;
const VALUE_MULTIPLIERS: [u64; 3] = [31, 37, 41];
const KIND_HASH_OFFSET: u64 = 0x9e37_79b9;

/// Fixed-size summary of a method tree.
#[derive(Debug, Clone, Default)]
pub struct Fingerprint {
    bits: u128,
    kind_counts: HashMap<SyntaxKind, u32>,
}

impl Fingerprint {
    /// Compute the fingerprint of a tree in a single walk.
    ///
    /// Valued nodes (identifiers, literals, predefined types) insert their
    /// value with three independent multiplicative hashes; unvalued nodes
    /// insert their kind code with a single hash.
    pub fn of(root: &SyntaxNode) -> Self {
        let mut fp = Self::default();
        fp.insert_subtree(root);
        fp
    }

    fn insert_subtree(&mut self, node: &SyntaxNode) {
        *self.kind_counts.entry(node.kind()).or_insert(0) += 1;
        if node.value().is_empty() {
            self.insert_kind(node.kind());
        } else {
            self.insert_value(node.value());
        }
        for child in node.children() {
            self.insert_subtree(child);
        }
    }

    fn insert_value(&mut self, value: &str) {
        for multiplier in VALUE_MULTIPLIERS {
            let h = value
                .bytes()
                .fold(0u64, |h, b| h.wrapping_mul(multiplier).wrapping_add(u64::from(b)));
            self.bits |= 1u128 << (h % BLOOM_BITS);
        }
    }

    fn insert_kind(&mut self, kind: SyntaxKind) {
        let h = u64::from(kind.code())
            .wrapping_mul(31)
            .wrapping_add(KIND_HASH_OFFSET);
        self.bits |= 1u128 << (h % BLOOM_BITS);
    }

    /// Number of occurrences of a kind in the fingerprinted tree.
    pub fn kind_count(&self, kind: SyntaxKind) -> u32 {
        self.kind_counts.get(&kind).copied().unwrap_or(0)
    }

    fn popcount(&self) -> u32 {
        self.bits.count_ones()
    }
}

/// Cheap admission predicate over two fingerprints.
///
/// Accepts when either filter is empty, when the overlap ratio
/// `popcount(a ∧ b) / max(popcount(a), popcount(b))` exceeds `tau`, or when
/// the filters intersect at all. The final fall-through makes this
/// nearly-always-accept except for disjoint fingerprints; that conservative
/// behavior is intentional and calibrated against the scorer downstream.
pub fn might_be_similar(a: &Fingerprint, b: &Fingerprint, tau: f64) -> bool {
    if a.bits == 0 || b.bits == 0 {
        return true;
    }
    let intersection = (a.bits & b.bits).count_ones();
    let max_bits = a.popcount().max(b.popcount());
    if f64::from(intersection) / f64::from(max_bits) > tau {
        return true;
    }
    intersection > 0
}

/// Weighted, normalized L1 similarity of two kind histograms in `[0, 1]`.
///
/// Diagnostic only; not part of the scoring pipeline. Kinds that shape
/// control flow weigh far more than identifier or literal noise.
pub fn histogram_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    let mut kinds: Vec<SyntaxKind> = a.kind_counts.keys().copied().collect();
    for kind in b.kind_counts.keys() {
        if !a.kind_counts.contains_key(kind) {
            kinds.push(*kind);
        }
    }
    if kinds.is_empty() {
        return 1.0;
    }

    let mut weighted_diff = 0.0;
    let mut total_weight = 0.0;
    for kind in kinds {
        let c1 = a.kind_count(kind);
        let c2 = b.kind_count(kind);
        let max = c1.max(c2);
        let diff = f64::from(c1.abs_diff(c2)) / f64::from(max);
        let w = importance_weight(kind);
        weighted_diff += diff * w;
        total_weight += w;
    }
    1.0 - weighted_diff / total_weight
}

/// Importance factor of a kind for histogram comparison.
fn importance_weight(kind: SyntaxKind) -> f64 {
    match kind {
        SyntaxKind::ConditionalExpression => 1.8,
        SyntaxKind::MethodDeclaration
        | SyntaxKind::ConstructorDeclaration
        | SyntaxKind::LocalFunctionStatement => 1.5,
        _ => match kind.category() {
            Category::LoopStatement
            | Category::ConditionalStatement
            | Category::ElseClause
            | Category::LoopControl
            | Category::ReturnStatement
            | Category::GotoStatement => 2.0,
            Category::SwitchStatement => 1.8,
            Category::ExceptionStatement => 1.5,
            Category::MethodInvocation | Category::ObjectCreation => 1.3,
            Category::AdditiveOp | Category::MultiplicativeOp => 1.2,
            Category::EqualityOp | Category::RelationalOp => 1.1,
            Category::SimpleAssignment
            | Category::CompoundAssignment
            | Category::BinaryLogicalOp
            | Category::UnaryLogicalOp => 1.0,
            Category::ElementAccess | Category::ArrayCreation => 0.9,
            Category::Declaration => 0.8,
            Category::SimpleIdentifier
            | Category::QualifiedIdentifier
            | Category::GenericIdentifier
            | Category::ThisBaseIdentifier
            | Category::NumericLiteral
            | Category::StringLiteral
            | Category::CharLiteral
            | Category::BoolLiteral
            | Category::NullLiteral => 0.5,
            _ => 0.3,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SyntaxKind;
    use crate::tree::SyntaxNode;

    fn sample_tree(var: &str) -> SyntaxNode {
        SyntaxNode::new(
            SyntaxKind::ReturnStatement,
            "",
            vec![SyntaxNode::new(
                SyntaxKind::AddExpression,
                "",
                vec![
                    SyntaxNode::leaf(SyntaxKind::Identifier, var),
                    SyntaxNode::leaf(SyntaxKind::IntegerLiteral, "1"),
                ],
            )],
        )
    }

    #[test]
    fn identical_trees_share_all_bits() {
        let a = Fingerprint::of(&sample_tree("x"));
        let b = Fingerprint::of(&sample_tree("x"));
        assert_eq!(a.bits, b.bits);
        assert!(might_be_similar(&a, &b, 0.99));
    }

    #[test]
    fn empty_fingerprint_always_admits() {
        let empty = Fingerprint::default();
        let full = Fingerprint::of(&sample_tree("x"));
        assert!(might_be_similar(&empty, &full, 0.9));
        assert!(might_be_similar(&full, &empty, 0.9));
    }

    #[test]
    fn any_overlap_falls_through_to_accept() {
        // Shared ReturnStatement/AddExpression structure guarantees common
        // bits even though the identifier differs, so the predicate admits
        // regardless of the ratio threshold.
        let a = Fingerprint::of(&sample_tree("alpha"));
        let b = Fingerprint::of(&sample_tree("omega"));
        assert!(might_be_similar(&a, &b, 1.0));
    }

    #[test]
    fn disjoint_fingerprints_are_rejected() {
        let mut a = Fingerprint::default();
        let mut b = Fingerprint::default();
        a.bits = 0b0011;
        b.bits = 0b1100;
        assert!(!might_be_similar(&a, &b, 0.1));
    }

    #[test]
    fn kind_counts_accumulate() {
        let fp = Fingerprint::of(&sample_tree("x"));
        assert_eq!(fp.kind_count(SyntaxKind::Identifier), 1);
        assert_eq!(fp.kind_count(SyntaxKind::AddExpression), 1);
        assert_eq!(fp.kind_count(SyntaxKind::WhileStatement), 0);
    }

    #[test]
    fn histogram_similarity_is_one_for_identical_trees() {
        let a = Fingerprint::of(&sample_tree("x"));
        let b = Fingerprint::of(&sample_tree("x"));
        assert!((histogram_similarity(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_similarity_drops_with_control_flow_divergence() {
        let plain = Fingerprint::of(&sample_tree("x"));
        let looped = Fingerprint::of(&SyntaxNode::new(
            SyntaxKind::WhileStatement,
            "",
            vec![
                SyntaxNode::leaf(SyntaxKind::TrueLiteral, "true"),
                sample_tree("x"),
            ],
        ));
        let sim = histogram_similarity(&plain, &looped);
        assert!(sim < 1.0);
        assert!(sim >= 0.0);
    }
}
