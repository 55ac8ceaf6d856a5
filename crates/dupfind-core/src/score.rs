//! Similarity scoring: normalized tree edit distance with size, structure,
//! and value penalties.

use crate::apted::TreeDistance;
use crate::detect::DetectorOptions;
use crate::method::MethodRecord;
use std::collections::HashSet;

/// Similarity of two methods in `[0, 1]` under the given options.
///
/// Convenience wrapper building a fresh engine; the detector reuses pooled
/// engines via [`score_pair`].
pub fn similarity(a: &MethodRecord, b: &MethodRecord, options: &DetectorOptions) -> f64 {
    let mut engine = TreeDistance::new(options.apted);
    score_pair(a, b, &mut engine, options)
}

/// Score one pair with a caller-provided engine.
pub(crate) fn score_pair(
    a: &MethodRecord,
    b: &MethodRecord,
    engine: &mut TreeDistance,
    options: &DetectorOptions,
) -> f64 {
    let distance = engine.distance(&a.tree, &b.tree);
    let (s1, s2) = (a.token_count, b.token_count);
    let max_size = s1.max(s2);

    let tsed = if max_size > 0 {
        (1.0 - distance / max_size as f64).max(0.0)
    } else {
        1.0
    };

    let mut sim = tsed;
    if options.size_penalty && max_size > 0 {
        // Token-count ratio floor: wildly different sizes cannot score high
        // no matter how cheap the alignment is.
        let ratio = s1.min(s2) as f64 / max_size as f64;
        if ratio < 0.1 {
            sim = tsed * (ratio * 10.0);
        } else if ratio < 0.3 {
            sim = tsed * (0.7 + ratio);
        }

        // Short functions match by accident; scale by average line count.
        let avg_lines = (a.line_count + b.line_count) as f64 / 2.0;
        if avg_lines < 10.0 {
            sim *= avg_lines / 10.0;
        }
    }

    let penalty = structural_penalty(a, b, distance, max_size, options);
    (sim * penalty).clamp(0.0, 1.0)
}

/// Multiplicative penalty from structural and value divergence, clamped to
/// `[0.1, 1]`.
fn structural_penalty(
    a: &MethodRecord,
    b: &MethodRecord,
    distance: f64,
    max_size: usize,
    options: &DetectorOptions,
) -> f64 {
    let f1 = a.features();
    let f2 = b.features();
    let mut penalty = 1.0f64;

    let complexity_diff = f1
        .control_flow_complexity
        .abs_diff(f2.control_flow_complexity);
    if complexity_diff > 3 {
        penalty *= 0.80;
    } else if complexity_diff > 1 {
        penalty *= 0.95;
    }

    if !f1.loop_types.is_empty() && !f2.loop_types.is_empty() && f1.loop_types != f2.loop_types {
        penalty *= 0.90;
    }

    if f1.conditional_count.abs_diff(f2.conditional_count) > 2 {
        penalty *= 0.85;
    }

    let max_calls = f1.method_call_count.max(f2.method_call_count);
    if max_calls > 0
        && f64::from(f1.method_call_count.abs_diff(f2.method_call_count))
            > 0.5 * f64::from(max_calls)
    {
        penalty *= 0.90;
    }

    let max_vars = f1.variable_count.max(f2.variable_count);
    if max_vars > 0
        && f64::from(f1.variable_count.abs_diff(f2.variable_count)) > 0.4 * f64::from(max_vars)
    {
        penalty *= 0.95;
    }

    if f1.max_nesting_level.abs_diff(f2.max_nesting_level) > 2 {
        penalty *= 0.90;
    }

    if max_size > 0 {
        let edit_ratio = distance / max_size as f64;
        if edit_ratio > 0.4 {
            penalty *= 0.8f64.powf(edit_ratio);
        }
    }

    // Identifier/literal overlap, discounted by the rename cost: a high
    // rename cost already charges for differing values inside the distance.
    let mut value_sim = 0.7 * jaccard(&f1.identifiers, &f2.identifiers)
        + 0.3 * jaccard(&f1.literals, &f2.literals);
    value_sim *= 1.0 - options.apted.rename;
    if value_sim < 0.3 {
        penalty *= 0.85;
    } else if value_sim < 0.5 {
        penalty *= 0.95;
    }

    penalty.clamp(0.1, 1.0)
}

/// Jaccard similarity of two string sets; empty-vs-empty is 1.0.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::SyntaxKind;
    use crate::tree::SyntaxNode;
    use std::path::PathBuf;

    fn block_of(statements: Vec<SyntaxNode>) -> SyntaxNode {
        SyntaxNode::new(SyntaxKind::Block, "", statements)
    }

    fn ret_add(lhs: &str, rhs: &str) -> SyntaxNode {
        SyntaxNode::new(
            SyntaxKind::ReturnStatement,
            "",
            vec![SyntaxNode::new(
                SyntaxKind::AddExpression,
                "",
                vec![
                    SyntaxNode::leaf(SyntaxKind::Identifier, lhs),
                    SyntaxNode::leaf(SyntaxKind::Identifier, rhs),
                ],
            )],
        )
    }

    fn method(name: &str, lines: usize, body: Vec<SyntaxNode>) -> MethodRecord {
        let tree = SyntaxNode::new(SyntaxKind::MethodDeclaration, name, vec![block_of(body)]);
        MethodRecord::new(
            name,
            None,
            PathBuf::from("test.cs"),
            1,
            lines,
            tree,
        )
    }

    #[test]
    fn reflexivity_for_non_trivial_methods() {
        let statements: Vec<SyntaxNode> = (0..6).map(|_| ret_add("left", "right")).collect();
        let m = method("Sum", 12, statements);
        let options = DetectorOptions::default();
        assert!((similarity(&m, &m, &options) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn symmetry() {
        let a = method("First", 12, vec![ret_add("a", "b"), ret_add("c", "d")]);
        let b = method("Second", 14, vec![ret_add("x", "y")]);
        let options = DetectorOptions::default();
        let ab = similarity(&a, &b, &options);
        let ba = similarity(&b, &a, &options);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn scores_stay_in_range() {
        let a = method("First", 3, vec![ret_add("a", "b")]);
        let big: Vec<SyntaxNode> = (0..40).map(|_| ret_add("x", "y")).collect();
        let b = method("Second", 120, big);
        let options = DetectorOptions::default();
        let sim = similarity(&a, &b, &options);
        assert!((0.0..=1.0).contains(&sim), "got {sim}");
    }

    #[test]
    fn short_function_penalty_applies_under_ten_lines() {
        let a = method("First", 4, vec![ret_add("a", "b")]);
        let b = method("Second", 4, vec![ret_add("a", "b")]);
        let options = DetectorOptions::default();
        let sim = similarity(&a, &b, &options);
        // Identical trees, 4 lines each: base 1.0 scaled by 4/10.
        assert!(sim < 0.5, "got {sim}");
        assert!(sim > 0.2, "got {sim}");
    }

    #[test]
    fn disabling_size_penalty_restores_identical_score() {
        let a = method("Add", 4, vec![ret_add("a", "b")]);
        let b = method("Add", 4, vec![ret_add("a", "b")]);
        let options = DetectorOptions {
            size_penalty: false,
            ..DetectorOptions::default()
        };
        let sim = similarity(&a, &b, &options);
        assert!((sim - 1.0).abs() < 1e-9, "got {sim}");
    }

    #[test]
    fn size_ratio_floor_caps_tiny_against_huge() {
        let a = method("Tiny", 12, vec![ret_add("a", "b")]);
        let big: Vec<SyntaxNode> = (0..30).map(|_| ret_add("a", "b")).collect();
        let b = method("Huge", 90, big);
        let options = DetectorOptions::default();
        let sim = similarity(&a, &b, &options);
        assert!(sim < 0.5, "tiny methods must not match huge ones, got {sim}");
    }

    #[test]
    fn jaccard_handles_empty_sets() {
        let empty = HashSet::new();
        let mut set = HashSet::new();
        set.insert("x".to_string());
        assert_eq!(jaccard(&empty, &empty), 1.0);
        assert_eq!(jaccard(&empty, &set), 0.0);
    }
}
