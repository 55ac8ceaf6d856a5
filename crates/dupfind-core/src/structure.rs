//! Structural features of a method tree, computed in one depth-first pass.

use crate::kind::SyntaxKind;
use crate::tree::SyntaxNode;
use std::collections::HashSet;

/// Loop construct kinds, in encounter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    For,
    While,
    Do,
    ForEach,
}

/// Aggregated structural signals used by the similarity scorer.
#[derive(Debug, Clone, Default)]
pub struct StructuralFeatures {
    /// +1 per loop, if, or conditional expression; +2 per switch or try.
    pub control_flow_complexity: u32,
    /// Loop kinds in the order they appear.
    pub loop_types: Vec<LoopKind>,
    /// +1 per if, switch, or conditional expression.
    pub conditional_count: u32,
    /// +1 per invocation.
    pub method_call_count: u32,
    /// +1 per variable declarator.
    pub variable_count: u32,
    /// Deepest tree level observed.
    pub max_nesting_level: u32,
    /// Values of identifier-like nodes.
    pub identifiers: HashSet<String>,
    /// Values of string, numeric, and boolean literal nodes.
    pub literals: HashSet<String>,
}

/// Analyze a tree. Callers memoize the result per method.
pub fn analyze(root: &SyntaxNode) -> StructuralFeatures {
    let mut features = StructuralFeatures::default();
    visit(root, 0, &mut features);
    features
}

fn visit(node: &SyntaxNode, depth: u32, features: &mut StructuralFeatures) {
    features.max_nesting_level = features.max_nesting_level.max(depth);

    match node.kind() {
        SyntaxKind::ForStatement => {
            features.control_flow_complexity += 1;
            features.loop_types.push(LoopKind::For);
        }
        SyntaxKind::WhileStatement => {
            features.control_flow_complexity += 1;
            features.loop_types.push(LoopKind::While);
        }
        SyntaxKind::DoStatement => {
            features.control_flow_complexity += 1;
            features.loop_types.push(LoopKind::Do);
        }
        SyntaxKind::ForEachStatement => {
            features.control_flow_complexity += 1;
            features.loop_types.push(LoopKind::ForEach);
        }
        SyntaxKind::IfStatement | SyntaxKind::ConditionalExpression => {
            features.control_flow_complexity += 1;
            features.conditional_count += 1;
        }
        SyntaxKind::SwitchStatement | SyntaxKind::SwitchExpression => {
            features.control_flow_complexity += 2;
            features.conditional_count += 1;
        }
        SyntaxKind::TryStatement => {
            features.control_flow_complexity += 2;
        }
        SyntaxKind::InvocationExpression => {
            features.method_call_count += 1;
        }
        SyntaxKind::VariableDeclarator => {
            features.variable_count += 1;
        }
        SyntaxKind::Identifier
        | SyntaxKind::QualifiedName
        | SyntaxKind::GenericName
        | SyntaxKind::ThisExpression
        | SyntaxKind::BaseExpression
        | SyntaxKind::PredefinedType => {
            if !node.value().is_empty() {
                features.identifiers.insert(node.value().to_string());
            }
        }
        SyntaxKind::StringLiteral
        | SyntaxKind::VerbatimStringLiteral
        | SyntaxKind::IntegerLiteral
        | SyntaxKind::RealLiteral
        | SyntaxKind::TrueLiteral
        | SyntaxKind::FalseLiteral => {
            features.literals.insert(node.value().to_string());
        }
        _ => {}
    }

    for child in node.children() {
        visit(child, depth + 1, features);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> SyntaxNode {
        SyntaxNode::leaf(SyntaxKind::Identifier, name)
    }

    #[test]
    fn counts_control_flow_and_calls() {
        // while (flag) { if (x) Process(x); }
        let call = SyntaxNode::new(
            SyntaxKind::InvocationExpression,
            "",
            vec![
                ident("Process"),
                SyntaxNode::new(SyntaxKind::ArgumentList, "", vec![ident("x")]),
            ],
        );
        let branch = SyntaxNode::new(SyntaxKind::IfStatement, "", vec![ident("x"), call]);
        let root = SyntaxNode::new(SyntaxKind::WhileStatement, "", vec![ident("flag"), branch]);

        let features = analyze(&root);
        assert_eq!(features.control_flow_complexity, 2);
        assert_eq!(features.conditional_count, 1);
        assert_eq!(features.method_call_count, 1);
        assert_eq!(features.loop_types, vec![LoopKind::While]);
        assert!(features.identifiers.contains("flag"));
        assert!(features.identifiers.contains("Process"));
    }

    #[test]
    fn switch_and_try_weigh_double() {
        let sw = SyntaxNode::new(SyntaxKind::SwitchStatement, "", vec![ident("x")]);
        let tr = SyntaxNode::new(SyntaxKind::TryStatement, "", vec![sw]);
        let features = analyze(&tr);
        assert_eq!(features.control_flow_complexity, 4);
        assert_eq!(features.conditional_count, 1);
    }

    #[test]
    fn loop_order_is_preserved() {
        let inner = SyntaxNode::new(SyntaxKind::ForEachStatement, "", vec![ident("item")]);
        let outer = SyntaxNode::new(SyntaxKind::ForStatement, "", vec![inner]);
        let features = analyze(&outer);
        assert_eq!(features.loop_types, vec![LoopKind::For, LoopKind::ForEach]);
    }

    #[test]
    fn nesting_tracks_deepest_level() {
        let deep = SyntaxNode::new(
            SyntaxKind::Block,
            "",
            vec![SyntaxNode::new(
                SyntaxKind::IfStatement,
                "",
                vec![SyntaxNode::new(SyntaxKind::Block, "", vec![ident("x")])],
            )],
        );
        let features = analyze(&deep);
        assert_eq!(features.max_nesting_level, 3);
    }

    #[test]
    fn literal_values_are_collected() {
        let root = SyntaxNode::new(
            SyntaxKind::ReturnStatement,
            "",
            vec![
                SyntaxNode::leaf(SyntaxKind::StringLiteral, "\"done\""),
                SyntaxNode::leaf(SyntaxKind::IntegerLiteral, "42"),
                SyntaxNode::leaf(SyntaxKind::NullLiteral, "null"),
            ],
        );
        let features = analyze(&root);
        assert!(features.literals.contains("\"done\""));
        assert!(features.literals.contains("42"));
        // Null is not a string/number/bool literal.
        assert!(!features.literals.contains("null"));
    }

    #[test]
    fn declarators_drive_variable_count() {
        let decl = SyntaxNode::new(
            SyntaxKind::LocalDeclarationStatement,
            "",
            vec![SyntaxNode::new(
                SyntaxKind::VariableDeclaration,
                "",
                vec![
                    SyntaxNode::new(SyntaxKind::VariableDeclarator, "sum", vec![]),
                    SyntaxNode::new(SyntaxKind::VariableDeclarator, "count", vec![]),
                ],
            )],
        );
        let features = analyze(&decl);
        assert_eq!(features.variable_count, 2);
    }
}
