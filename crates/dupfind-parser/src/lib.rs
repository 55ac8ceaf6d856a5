//! C# method extraction for the duplicate detector.
//!
//! Parses source files with tree-sitter, converts method bodies into the
//! core's normalized [`dupfind_core::tree::SyntaxNode`] trees, and emits
//! [`dupfind_core::method::MethodRecord`]s with line bounds and metadata.

pub mod convert;
pub mod extract;
pub mod treesitter;

pub use extract::parse_file;
