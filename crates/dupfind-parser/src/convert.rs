//! Conversion from tree-sitter C# syntax to the core's normalized tree.
//!
//! Only named nodes are kept; comments, attribute lists, and modifiers are
//! dropped. Identifiers, literals, and predefined type tokens become valued
//! leaves; everything else is structure. Single-statement blocks directly
//! under if/else/while/for/foreach/do are elided so that braced and unbraced
//! bodies produce identical trees.

use dupfind_core::kind::SyntaxKind;
use dupfind_core::tree::SyntaxNode;

fn text<'s>(node: &tree_sitter::Node, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Convert a named CST node. Returns `None` for trivia the normalized tree
/// does not represent.
pub fn convert_node(node: &tree_sitter::Node, source: &str) -> Option<SyntaxNode> {
    let kind = node.kind();
    match kind {
        // Dropped outright
        "comment" | "attribute_list" | "modifier" | "interpolated_string_text"
        | "string_content" => None,
        k if k.starts_with("preproc") => None,

        // Valued leaves
        "identifier" => Some(SyntaxNode::leaf(SyntaxKind::Identifier, text(node, source))),
        "qualified_name" => Some(SyntaxNode::leaf(
            SyntaxKind::QualifiedName,
            text(node, source),
        )),
        "generic_name" => Some(SyntaxNode::leaf(SyntaxKind::GenericName, text(node, source))),
        "this_expression" => Some(SyntaxNode::leaf(SyntaxKind::ThisExpression, "this")),
        "base_expression" => Some(SyntaxNode::leaf(SyntaxKind::BaseExpression, "base")),
        "predefined_type" => Some(SyntaxNode::leaf(
            SyntaxKind::PredefinedType,
            text(node, source),
        )),
        // `var` reads as an identifier-like type token
        "implicit_type" => Some(SyntaxNode::leaf(SyntaxKind::Identifier, text(node, source))),

        // Literals
        "integer_literal" => Some(SyntaxNode::leaf(
            SyntaxKind::IntegerLiteral,
            text(node, source),
        )),
        "real_literal" => Some(SyntaxNode::leaf(SyntaxKind::RealLiteral, text(node, source))),
        "string_literal" | "raw_string_literal" => Some(SyntaxNode::leaf(
            SyntaxKind::StringLiteral,
            text(node, source),
        )),
        "verbatim_string_literal" => Some(SyntaxNode::leaf(
            SyntaxKind::VerbatimStringLiteral,
            text(node, source),
        )),
        "character_literal" => Some(SyntaxNode::leaf(
            SyntaxKind::CharacterLiteral,
            text(node, source),
        )),
        "boolean_literal" => {
            let value = text(node, source);
            let kind = if value == "true" {
                SyntaxKind::TrueLiteral
            } else {
                SyntaxKind::FalseLiteral
            };
            Some(SyntaxNode::leaf(kind, value))
        }
        "null_literal" => Some(SyntaxNode::leaf(SyntaxKind::NullLiteral, "null")),
        "interpolated_string_expression" => Some(SyntaxNode::new(
            SyntaxKind::InterpolatedStringExpression,
            "",
            convert_children(node, source),
        )),
        "interpolation" => Some(SyntaxNode::new(
            SyntaxKind::Interpolation,
            "",
            convert_children(node, source),
        )),

        // Operators
        "binary_expression" => Some(convert_binary(node, source)),
        "prefix_unary_expression" => Some(convert_prefix_unary(node, source)),
        "postfix_unary_expression" => convert_postfix_unary(node, source),
        "assignment_expression" => Some(convert_assignment(node, source)),
        "conditional_expression" => Some(SyntaxNode::new(
            SyntaxKind::ConditionalExpression,
            "",
            convert_children(node, source),
        )),

        // Type operations and checks
        "cast_expression" => Some(structure(SyntaxKind::CastExpression, node, source)),
        "as_expression" => Some(structure(SyntaxKind::AsExpression, node, source)),
        "is_expression" => Some(structure(SyntaxKind::IsExpression, node, source)),
        "is_pattern_expression" => Some(structure(SyntaxKind::IsPatternExpression, node, source)),
        "typeof_expression" => Some(structure(SyntaxKind::TypeOfExpression, node, source)),
        "sizeof_expression" => Some(structure(SyntaxKind::SizeOfExpression, node, source)),
        "checked_expression" => Some(structure(SyntaxKind::CheckedExpression, node, source)),
        "default_expression" => Some(structure(SyntaxKind::DefaultExpression, node, source)),

        // Access and calls
        "invocation_expression" => Some(structure(SyntaxKind::InvocationExpression, node, source)),
        "member_access_expression" => {
            Some(structure(SyntaxKind::MemberAccessExpression, node, source))
        }
        "conditional_access_expression" => Some(structure(
            SyntaxKind::ConditionalAccessExpression,
            node,
            source,
        )),
        "member_binding_expression" => {
            Some(structure(SyntaxKind::MemberBindingExpression, node, source))
        }
        "element_access_expression" => {
            Some(structure(SyntaxKind::ElementAccessExpression, node, source))
        }
        "element_binding_expression" => {
            Some(structure(SyntaxKind::ElementBindingExpression, node, source))
        }

        // Creation
        "object_creation_expression" => {
            Some(structure(SyntaxKind::ObjectCreationExpression, node, source))
        }
        "implicit_object_creation_expression" => Some(structure(
            SyntaxKind::ImplicitObjectCreationExpression,
            node,
            source,
        )),
        "anonymous_object_creation_expression" => Some(structure(
            SyntaxKind::AnonymousObjectCreationExpression,
            node,
            source,
        )),
        "array_creation_expression" => {
            Some(structure(SyntaxKind::ArrayCreationExpression, node, source))
        }
        "implicit_array_creation_expression" => Some(structure(
            SyntaxKind::ImplicitArrayCreationExpression,
            node,
            source,
        )),
        "stackalloc_expression" | "stack_alloc_array_creation_expression" => Some(structure(
            SyntaxKind::StackAllocArrayCreationExpression,
            node,
            source,
        )),
        "collection_expression" => Some(structure(SyntaxKind::CollectionExpression, node, source)),
        "initializer_expression" => {
            Some(structure(SyntaxKind::InitializerExpression, node, source))
        }

        // Statements
        "block" => Some(structure(SyntaxKind::Block, node, source)),
        "expression_statement" => Some(structure(SyntaxKind::ExpressionStatement, node, source)),
        "local_declaration_statement" => Some(structure(
            SyntaxKind::LocalDeclarationStatement,
            node,
            source,
        )),
        "variable_declaration" => Some(structure(SyntaxKind::VariableDeclaration, node, source)),
        "variable_declarator" => Some(structure(SyntaxKind::VariableDeclarator, node, source)),
        "equals_value_clause" => Some(structure(SyntaxKind::EqualsValueClause, node, source)),
        "if_statement" => Some(convert_if(node, source)),
        "while_statement" => Some(convert_loop(SyntaxKind::WhileStatement, node, source)),
        "do_statement" => Some(convert_loop(SyntaxKind::DoStatement, node, source)),
        "for_statement" => Some(convert_loop(SyntaxKind::ForStatement, node, source)),
        "foreach_statement" | "for_each_statement" => {
            Some(convert_loop(SyntaxKind::ForEachStatement, node, source))
        }
        "switch_statement" => Some(convert_switch(node, source)),
        "switch_body" => Some(structure(SyntaxKind::Unknown, node, source)),
        "switch_section" => Some(structure(SyntaxKind::SwitchSection, node, source)),
        "case_switch_label" | "case_pattern_switch_label" => {
            Some(structure(SyntaxKind::CaseSwitchLabel, node, source))
        }
        "default_switch_label" => Some(structure(SyntaxKind::DefaultSwitchLabel, node, source)),
        "switch_expression" => Some(structure(SyntaxKind::SwitchExpression, node, source)),
        "switch_expression_arm" => Some(structure(SyntaxKind::SwitchExpressionArm, node, source)),
        "break_statement" => Some(structure(SyntaxKind::BreakStatement, node, source)),
        "continue_statement" => Some(structure(SyntaxKind::ContinueStatement, node, source)),
        "return_statement" => Some(structure(SyntaxKind::ReturnStatement, node, source)),
        "yield_statement" => Some(structure(SyntaxKind::YieldStatement, node, source)),
        "goto_statement" => Some(structure(SyntaxKind::GotoStatement, node, source)),
        "throw_statement" => Some(structure(SyntaxKind::ThrowStatement, node, source)),
        "throw_expression" => Some(structure(SyntaxKind::ThrowExpression, node, source)),
        "try_statement" => Some(structure(SyntaxKind::TryStatement, node, source)),
        "catch_clause" => Some(structure(SyntaxKind::CatchClause, node, source)),
        "finally_clause" => Some(structure(SyntaxKind::FinallyClause, node, source)),
        "using_statement" => Some(structure(SyntaxKind::UsingStatement, node, source)),
        "lock_statement" => Some(structure(SyntaxKind::LockStatement, node, source)),
        "empty_statement" => Some(SyntaxNode::new(SyntaxKind::EmptyStatement, "", Vec::new())),

        // Misc expressions
        "await_expression" => Some(structure(SyntaxKind::AwaitExpression, node, source)),
        "parenthesized_expression" => {
            Some(structure(SyntaxKind::ParenthesizedExpression, node, source))
        }
        "range_expression" => Some(structure(SyntaxKind::RangeExpression, node, source)),
        "tuple_expression" => Some(structure(SyntaxKind::TupleExpression, node, source)),
        "array_type" => Some(structure(SyntaxKind::ArrayType, node, source)),
        "nullable_type" => Some(structure(SyntaxKind::NullableType, node, source)),
        "lambda_expression" => Some(structure(SyntaxKind::LambdaExpression, node, source)),
        "anonymous_method_expression" => Some(structure(
            SyntaxKind::AnonymousMethodExpression,
            node,
            source,
        )),

        // Argument and parameter plumbing
        "argument_list" | "bracketed_argument_list" => {
            Some(structure(SyntaxKind::ArgumentList, node, source))
        }
        "argument" => Some(structure(SyntaxKind::Argument, node, source)),
        "parameter_list" => Some(structure(SyntaxKind::ParameterList, node, source)),
        "parameter" => Some(structure(SyntaxKind::Parameter, node, source)),
        "type_argument_list" => Some(structure(SyntaxKind::TypeArgumentList, node, source)),
        "arrow_expression_clause" => {
            Some(structure(SyntaxKind::ArrowExpressionClause, node, source))
        }

        // Declarations that can appear inside bodies
        "method_declaration" => Some(structure(SyntaxKind::MethodDeclaration, node, source)),
        "constructor_declaration" => {
            Some(structure(SyntaxKind::ConstructorDeclaration, node, source))
        }
        "local_function_statement" => {
            Some(structure(SyntaxKind::LocalFunctionStatement, node, source))
        }
        "accessor_declaration" => Some(structure(SyntaxKind::AccessorDeclaration, node, source)),

        // Anything else keeps its shape under an opaque kind
        _ => Some(structure(SyntaxKind::Unknown, node, source)),
    }
}

/// Structural node: converted named children, no value.
fn structure(kind: SyntaxKind, node: &tree_sitter::Node, source: &str) -> SyntaxNode {
    SyntaxNode::new(kind, "", convert_children(node, source))
}

fn convert_children(node: &tree_sitter::Node, source: &str) -> Vec<SyntaxNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter_map(|child| convert_node(&child, source))
        .collect()
}

/// Convert a statement used as a loop or branch body, eliding a block that
/// wraps exactly one statement.
fn convert_body(node: &tree_sitter::Node, source: &str) -> Option<SyntaxNode> {
    if node.kind() == "block" {
        let mut statements = convert_children(node, source);
        if statements.len() == 1 {
            return statements.pop();
        }
        return Some(SyntaxNode::new(SyntaxKind::Block, "", statements));
    }
    convert_node(node, source)
}

fn convert_if(node: &tree_sitter::Node, source: &str) -> SyntaxNode {
    let mut children = Vec::new();
    if let Some(condition) = node.child_by_field_name("condition") {
        children.extend(convert_node(&condition, source));
    }
    if let Some(consequence) = node.child_by_field_name("consequence") {
        children.extend(convert_body(&consequence, source));
    }
    if let Some(alternative) = node.child_by_field_name("alternative") {
        // The grammar has no else node; reify one so else bodies elide the
        // same way braced bodies do elsewhere.
        let body: Vec<SyntaxNode> = convert_body(&alternative, source).into_iter().collect();
        children.push(SyntaxNode::new(SyntaxKind::ElseClause, "", body));
    }
    SyntaxNode::new(SyntaxKind::IfStatement, "", children)
}

fn convert_loop(kind: SyntaxKind, node: &tree_sitter::Node, source: &str) -> SyntaxNode {
    let body_id = node.child_by_field_name("body").map(|b| b.id());
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter_map(|child| {
            if Some(child.id()) == body_id {
                convert_body(&child, source)
            } else {
                convert_node(&child, source)
            }
        })
        .collect();
    SyntaxNode::new(kind, "", children)
}

fn convert_switch(node: &tree_sitter::Node, source: &str) -> SyntaxNode {
    let mut children = Vec::new();
    if let Some(value) = node.child_by_field_name("value") {
        children.extend(convert_node(&value, source));
    }
    if let Some(body) = node.child_by_field_name("body") {
        children.extend(convert_children(&body, source));
    }
    SyntaxNode::new(SyntaxKind::SwitchStatement, "", children)
}

fn convert_binary(node: &tree_sitter::Node, source: &str) -> SyntaxNode {
    let operator = node
        .child_by_field_name("operator")
        .map(|op| text(&op, source))
        .unwrap_or("");
    let kind = match operator {
        "+" => SyntaxKind::AddExpression,
        "-" => SyntaxKind::SubtractExpression,
        "*" => SyntaxKind::MultiplyExpression,
        "/" => SyntaxKind::DivideExpression,
        "%" => SyntaxKind::ModuloExpression,
        "<<" => SyntaxKind::LeftShiftExpression,
        ">>" => SyntaxKind::RightShiftExpression,
        ">>>" => SyntaxKind::UnsignedRightShiftExpression,
        "&" => SyntaxKind::BitwiseAndExpression,
        "|" => SyntaxKind::BitwiseOrExpression,
        "^" => SyntaxKind::ExclusiveOrExpression,
        "&&" => SyntaxKind::LogicalAndExpression,
        "||" => SyntaxKind::LogicalOrExpression,
        "??" => SyntaxKind::CoalesceExpression,
        "==" => SyntaxKind::EqualsExpression,
        "!=" => SyntaxKind::NotEqualsExpression,
        "<" => SyntaxKind::LessThanExpression,
        "<=" => SyntaxKind::LessThanOrEqualExpression,
        ">" => SyntaxKind::GreaterThanExpression,
        ">=" => SyntaxKind::GreaterThanOrEqualExpression,
        "is" => SyntaxKind::IsExpression,
        "as" => SyntaxKind::AsExpression,
        _ => SyntaxKind::Unknown,
    };
    structure(kind, node, source)
}

fn convert_prefix_unary(node: &tree_sitter::Node, source: &str) -> SyntaxNode {
    let operator = node.child(0).map(|op| text(&op, source)).unwrap_or("");
    let kind = match operator {
        "-" => SyntaxKind::UnaryMinusExpression,
        "+" => SyntaxKind::UnaryPlusExpression,
        "!" => SyntaxKind::LogicalNotExpression,
        "~" => SyntaxKind::BitwiseNotExpression,
        "++" => SyntaxKind::PreIncrementExpression,
        "--" => SyntaxKind::PreDecrementExpression,
        _ => SyntaxKind::Unknown,
    };
    structure(kind, node, source)
}

fn convert_postfix_unary(node: &tree_sitter::Node, source: &str) -> Option<SyntaxNode> {
    let operator = node
        .child(u32::try_from(node.child_count().saturating_sub(1)).unwrap())
        .map(|op| text(&op, source))
        .unwrap_or("");
    match operator {
        "++" => Some(structure(SyntaxKind::PostIncrementExpression, node, source)),
        "--" => Some(structure(SyntaxKind::PostDecrementExpression, node, source)),
        // Null-forgiving `!` is transparent for comparison purposes.
        _ => {
            let mut children = convert_children(node, source);
            if children.len() == 1 {
                children.pop()
            } else {
                Some(SyntaxNode::new(SyntaxKind::Unknown, "", children))
            }
        }
    }
}

fn convert_assignment(node: &tree_sitter::Node, source: &str) -> SyntaxNode {
    let operator = node
        .child_by_field_name("operator")
        .map(|op| text(&op, source))
        .unwrap_or("=");
    let kind = match operator {
        "=" => SyntaxKind::SimpleAssignmentExpression,
        "+=" => SyntaxKind::AddAssignmentExpression,
        "-=" => SyntaxKind::SubtractAssignmentExpression,
        "*=" => SyntaxKind::MultiplyAssignmentExpression,
        "/=" => SyntaxKind::DivideAssignmentExpression,
        "%=" => SyntaxKind::ModuloAssignmentExpression,
        "&=" => SyntaxKind::AndAssignmentExpression,
        "|=" => SyntaxKind::OrAssignmentExpression,
        "^=" => SyntaxKind::ExclusiveOrAssignmentExpression,
        "<<=" => SyntaxKind::LeftShiftAssignmentExpression,
        ">>=" => SyntaxKind::RightShiftAssignmentExpression,
        "??=" => SyntaxKind::CoalesceAssignmentExpression,
        _ => SyntaxKind::SimpleAssignmentExpression,
    };
    structure(kind, node, source)
}
