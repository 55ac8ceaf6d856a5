//! Report rendering for duplicate groups.

use anyhow::Result;
use dupfind_core::method::{DuplicateGroup, MethodRecord};
use std::fmt::Write as _;

/// How much source code to include in the textual report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSlices {
    None,
    Representative,
    All,
}

/// Render the textual report: per-group header with total impact, the
/// representative, one line per duplicate, and a final summary.
pub fn render_text(groups: &[DuplicateGroup], slices: CodeSlices) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        out.push_str("No duplicate methods found.\n");
        return out;
    }

    let _ = writeln!(out, "Found {} duplicate group(s)", groups.len());
    for (index, group) in groups.iter().enumerate() {
        let rep = group.representative;
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Group #{} | total impact {:.1}",
            index + 1,
            group.total_impact
        );
        let _ = writeln!(
            out,
            "  {} | L{}-{} {}",
            rep.location(),
            rep.start_line,
            rep.end_line,
            rep.full_name
        );
        if slices != CodeSlices::None {
            append_slice(&mut out, rep);
        }
        for entry in &group.entries {
            let method = entry.method;
            let _ = writeln!(
                out,
                "    {:.1}% | impact {:.1} | {} | L{}-{} {}",
                entry.similarity * 100.0,
                entry.impact,
                method.location(),
                method.start_line,
                method.end_line,
                method.full_name
            );
            if slices == CodeSlices::All {
                append_slice(&mut out, method);
            }
        }
    }

    let methods: usize = groups.iter().map(DuplicateGroup::method_count).sum();
    let lines: usize = groups.iter().map(DuplicateGroup::total_lines).sum();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Summary: {} groups, {} methods, {} total lines",
        groups.len(),
        methods,
        lines
    );
    out
}

/// Render groups as pretty-printed JSON.
pub fn render_json(groups: &[DuplicateGroup]) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(groups)?;
    rendered.push('\n');
    Ok(rendered)
}

/// Append the method's source lines, numbered, re-read from disk.
fn append_slice(out: &mut String, method: &MethodRecord) {
    match std::fs::read_to_string(&method.file_path) {
        Ok(source) => {
            let start = method.start_line.saturating_sub(1);
            for (offset, line) in source
                .lines()
                .skip(start)
                .take(method.line_count)
                .enumerate()
            {
                let _ = writeln!(out, "      {:>4} | {}", start + offset + 1, line);
            }
        }
        Err(err) => {
            let _ = writeln!(out, "      (source unavailable: {err})");
        }
    }
}
