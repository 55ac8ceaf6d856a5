//! Tree-sitter integration for C# parsing.

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a C# source file and return the tree-sitter tree.
pub fn parse_source(path: &Path, source: &[u8]) -> Result<tree_sitter::Tree> {
    let language: tree_sitter::Language = tree_sitter_c_sharp::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .context("failed to set tree-sitter language")?;
    parser
        .parse(source, None)
        .ok_or_else(|| anyhow::anyhow!("failed to parse {}", path.display()))
}
