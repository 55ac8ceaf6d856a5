//! Method records, parsed files, and duplicate groups.

use crate::fingerprint::Fingerprint;
use crate::structure::{self, StructuralFeatures};
use crate::tree::SyntaxNode;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::OnceLock;

/// A single method (or constructor, local function, or bodied accessor)
/// extracted from a source file. Immutable once stored in a [`ParsedFile`].
#[derive(Debug, Serialize)]
pub struct MethodRecord {
    pub name: String,
    /// Class-qualified name when the method is nested in a type.
    pub full_name: String,
    pub file_path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub line_count: usize,
    /// Subtree size of the method's tree root.
    pub token_count: usize,
    pub parameters: Vec<String>,
    pub is_async: bool,
    pub attributes: Vec<String>,
    pub class_context: Option<String>,
    #[serde(skip)]
    pub tree: SyntaxNode,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
    #[serde(skip)]
    features: OnceLock<StructuralFeatures>,
}

impl MethodRecord {
    /// Build a record around a normalized tree. Token count and fingerprint
    /// are derived here, once.
    pub fn new(
        name: impl Into<String>,
        class_context: Option<String>,
        file_path: PathBuf,
        start_line: usize,
        end_line: usize,
        tree: SyntaxNode,
    ) -> Self {
        let name = name.into();
        let full_name = match &class_context {
            Some(class) => format!("{class}.{name}"),
            None => name.clone(),
        };
        let fingerprint = Fingerprint::of(&tree);
        Self {
            name,
            full_name,
            file_path,
            start_line,
            end_line,
            line_count: end_line.saturating_sub(start_line) + 1,
            token_count: tree.size(),
            parameters: Vec::new(),
            is_async: false,
            attributes: Vec::new(),
            class_context,
            tree,
            fingerprint,
            features: OnceLock::new(),
        }
    }

    /// Structural features, computed on first use.
    pub fn features(&self) -> &StructuralFeatures {
        self.features.get_or_init(|| structure::analyze(&self.tree))
    }

    /// `path:start` location string used by reports.
    pub fn location(&self) -> String {
        format!("{}:{}", self.file_path.display(), self.start_line)
    }
}

/// A source file and the methods extracted from it.
#[derive(Debug, Default, Serialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub methods: Vec<MethodRecord>,
}

/// One method similar to a group's representative.
#[derive(Debug, Serialize)]
pub struct DuplicateEntry<'a> {
    pub method: &'a MethodRecord,
    pub similarity: f64,
    pub impact: f64,
}

/// A representative method and the methods duplicating it, ranked by impact.
#[derive(Debug, Serialize)]
pub struct DuplicateGroup<'a> {
    pub representative: &'a MethodRecord,
    pub entries: Vec<DuplicateEntry<'a>>,
    pub total_impact: f64,
}

impl DuplicateGroup<'_> {
    /// Methods in the group, representative included.
    pub fn method_count(&self) -> usize {
        1 + self.entries.len()
    }

    /// Total source lines covered by the group.
    pub fn total_lines(&self) -> usize {
        self.representative.line_count
            + self
                .entries
                .iter()
                .map(|e| e.method.line_count)
                .sum::<usize>()
    }
}
