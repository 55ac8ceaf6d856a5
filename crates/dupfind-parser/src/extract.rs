//! Method extraction: find every method-like declaration in a C# file and
//! build a [`MethodRecord`] around its normalized tree.
//!
//! Methods, constructors, local functions, and property accessors with
//! bodies all flow into the same record shape; accessors get a name suffix
//! (`Total.get`) and nested declarations carry their owning type name.

use crate::convert;
use crate::treesitter;
use anyhow::Result;
use dupfind_core::method::{MethodRecord, ParsedFile};
use std::path::Path;
use tracing::debug;

/// Parse one source file into method records.
///
/// tree-sitter recovers from local syntax errors, so a file with minor
/// damage still yields the methods it can; a file the parser cannot process
/// at all is an error for the caller to log and skip.
pub fn parse_file(path: &Path, source: &str) -> Result<ParsedFile> {
    let tree = treesitter::parse_source(path, source.as_bytes())?;
    let root = tree.root_node();
    if root.has_error() {
        debug!(path = %path.display(), "syntax errors present; extracting what parses");
    }

    let mut methods = Vec::new();
    walk(&root, source, path, None, &mut methods);
    Ok(ParsedFile {
        path: path.to_path_buf(),
        methods,
    })
}

fn walk(
    node: &tree_sitter::Node,
    source: &str,
    path: &Path,
    class_context: Option<&str>,
    methods: &mut Vec<MethodRecord>,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "class_declaration"
            | "struct_declaration"
            | "record_declaration"
            | "interface_declaration" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| &source[n.byte_range()]);
                if let Some(body) = child.child_by_field_name("body") {
                    walk(&body, source, path, name.or(class_context), methods);
                }
            }
            "namespace_declaration" | "file_scoped_namespace_declaration" => {
                walk(&child, source, path, class_context, methods);
            }
            "method_declaration" | "constructor_declaration" | "local_function_statement" => {
                // Abstract and interface members have no body to compare.
                if has_body(&child)
                    && let Some(name_node) = child.child_by_field_name("name")
                {
                    let name = source[name_node.byte_range()].to_string();
                    emit(&child, source, path, name, class_context, methods);
                }
                // Local functions nest inside bodies; keep walking.
                walk(&child, source, path, class_context, methods);
            }
            "property_declaration" | "indexer_declaration" => {
                extract_accessors(&child, source, path, class_context, methods);
            }
            _ => {
                walk(&child, source, path, class_context, methods);
            }
        }
    }
}

/// Emit one record for each bodied accessor of a property or indexer.
fn extract_accessors(
    node: &tree_sitter::Node,
    source: &str,
    path: &Path,
    class_context: Option<&str>,
    methods: &mut Vec<MethodRecord>,
) {
    let property_name = node
        .child_by_field_name("name")
        .map_or("this", |n| &source[n.byte_range()]);

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "accessor_list" => {
                let mut accessors = child.walk();
                for accessor in child.named_children(&mut accessors) {
                    if accessor.kind() != "accessor_declaration" || !has_body(&accessor) {
                        continue;
                    }
                    let name = format!("{property_name}.{}", accessor_keyword(&accessor, source));
                    emit(&accessor, source, path, name, class_context, methods);
                }
            }
            // Expression-bodied property: `public int Total => a + b;`
            "arrow_expression_clause" => {
                let name = format!("{property_name}.get");
                emit(&child, source, path, name, class_context, methods);
            }
            _ => {}
        }
    }
}

fn has_body(accessor: &tree_sitter::Node) -> bool {
    let mut cursor = accessor.walk();
    accessor
        .named_children(&mut cursor)
        .any(|c| matches!(c.kind(), "block" | "arrow_expression_clause"))
}

fn accessor_keyword(accessor: &tree_sitter::Node, source: &str) -> &'static str {
    for i in 0..u32::try_from(accessor.child_count()).unwrap() {
        if let Some(child) = accessor.child(i) {
            match &source[child.byte_range()] {
                "get" => return "get",
                "set" => return "set",
                "init" => return "init",
                "add" => return "add",
                "remove" => return "remove",
                _ => {}
            }
        }
    }
    "get"
}

fn emit(
    node: &tree_sitter::Node,
    source: &str,
    path: &Path,
    name: String,
    class_context: Option<&str>,
    methods: &mut Vec<MethodRecord>,
) {
    let Some(tree) = convert::convert_node(node, source) else {
        return;
    };
    let start_line = node.start_position().row + 1;
    let end_line = node.end_position().row + 1;
    let mut record = MethodRecord::new(
        name,
        class_context.map(String::from),
        path.to_path_buf(),
        start_line,
        end_line,
        tree,
    );
    record.parameters = parameter_names(node, source);
    record.is_async = has_async_modifier(node, source);
    record.attributes = attribute_names(node, source);
    methods.push(record);
}

fn parameter_names(node: &tree_sitter::Node, source: &str) -> Vec<String> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "parameter")
        .filter_map(|c| {
            c.child_by_field_name("name")
                .map(|n| source[n.byte_range()].to_string())
        })
        .collect()
}

fn has_async_modifier(node: &tree_sitter::Node, source: &str) -> bool {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .any(|c| c.kind() == "modifier" && &source[c.byte_range()] == "async")
}

fn attribute_names(node: &tree_sitter::Node, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "attribute_list" {
            continue;
        }
        let mut attrs = child.walk();
        for attribute in child.named_children(&mut attrs) {
            if attribute.kind() == "attribute" {
                let name = attribute
                    .child_by_field_name("name")
                    .map_or_else(|| &source[attribute.byte_range()], |n| &source[n.byte_range()]);
                names.push(name.to_string());
            }
        }
    }
    names
}
