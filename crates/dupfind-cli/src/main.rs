//! CLI binary for dupfind: scan source trees and report duplicated methods.

use anyhow::{Context, Result};
use clap::Parser;
use dupfind_core::apted::AptedCosts;
use dupfind_core::detect::{self, DetectorOptions};
use dupfind_core::method::ParsedFile;
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::warn;

mod report;

#[derive(Parser)]
#[command(name = "dupfind", about = "AST-based duplicate method detector")]
struct Cli {
    /// Files or directories to scan
    #[arg(short = 'p', long = "paths", num_args = 1.., default_value = ".")]
    paths: Vec<PathBuf>,

    /// Minimum similarity for two methods to count as duplicates
    #[arg(long, default_value_t = 0.87)]
    threshold: f64,

    /// Ignore methods shorter than this many lines
    #[arg(long, default_value_t = 5)]
    min_lines: usize,

    /// Ignore methods longer than this many lines
    #[arg(long, default_value_t = usize::MAX)]
    max_lines: usize,

    /// Ignore methods whose tree has fewer tokens than this
    #[arg(long, default_value_t = 0)]
    min_tokens: usize,

    /// Print the representative's code for each group
    #[arg(long)]
    print: bool,

    /// Print code for every method in each group
    #[arg(long)]
    print_all: bool,

    /// Disable the size-ratio and short-function penalties
    #[arg(long)]
    no_size_penalty: bool,

    /// File extensions to scan (repeatable)
    #[arg(short = 'e', long = "extensions", num_args = 1.., default_value = "cs")]
    extensions: Vec<String>,

    /// APTED rename cost
    #[arg(long, default_value_t = 0.3)]
    rename_cost: f64,

    /// APTED delete cost
    #[arg(long, default_value_t = 1.0)]
    delete_cost: f64,

    /// APTED insert cost
    #[arg(long, default_value_t = 1.0)]
    insert_cost: f64,

    /// Weight of the kind-category distance in rename costs
    #[arg(long, default_value_t = 0.5)]
    kind_distance_weight: f64,

    /// Only scan files whose path matches this regex
    #[arg(long)]
    include_file_pattern: Option<String>,

    /// Only compare methods whose full name matches this regex
    #[arg(long)]
    include_method_pattern: Option<String>,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file_pattern = cli
        .include_file_pattern
        .as_deref()
        .map(|p| Regex::new(p).context("invalid --include-file-pattern"))
        .transpose()?;
    let method_pattern = cli
        .include_method_pattern
        .as_deref()
        .map(|p| Regex::new(p).context("invalid --include-method-pattern"))
        .transpose()?;

    let options = DetectorOptions {
        min_lines: cli.min_lines,
        max_lines: cli.max_lines,
        min_tokens: cli.min_tokens,
        size_penalty: !cli.no_size_penalty,
        include_method_pattern: method_pattern,
        apted: AptedCosts {
            rename: cli.rename_cost,
            delete: cli.delete_cost,
            insert: cli.insert_cost,
            kind_weight: cli.kind_distance_weight,
        },
    };
    options.validate(cli.threshold)?;

    let sources = discover_files(&cli.paths, &cli.extensions, file_pattern.as_ref());
    eprintln!("Scanning {} file(s)...", sources.len());

    // Per-file parse failures are logged and skipped; the run continues.
    let files: Vec<ParsedFile> = sources
        .par_iter()
        .filter_map(|path| match parse_one(path) {
            Ok(file) => Some(file),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unparsable file");
                None
            }
        })
        .collect();

    let method_count: usize = files.iter().map(|f| f.methods.len()).sum();
    eprintln!(
        "Comparing {} method(s) across {} file(s)...",
        method_count,
        files.len()
    );

    let groups = detect::detect(&files, &options, cli.threshold);

    let slices = if cli.print_all {
        report::CodeSlices::All
    } else if cli.print {
        report::CodeSlices::Representative
    } else {
        report::CodeSlices::None
    };
    let rendered = if cli.json {
        report::render_json(&groups)?
    } else {
        report::render_text(&groups, slices)
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

fn parse_one(path: &Path) -> Result<ParsedFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    dupfind_parser::parse_file(path, &source)
}

/// Expand the given paths into a sorted list of scannable files.
fn discover_files(
    paths: &[PathBuf],
    extensions: &[String],
    file_pattern: Option<&Regex>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for root in paths {
        if root.is_file() {
            if wanted(root, extensions, file_pattern) {
                files.push(root.clone());
            }
        } else if root.is_dir() {
            let walker = ignore::WalkBuilder::new(root)
                .hidden(true)
                .git_ignore(true)
                .build();
            for entry in walker.flatten() {
                let path = entry.path();
                if path.is_file() && wanted(path, extensions, file_pattern) {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            warn!(path = %root.display(), "path is neither a file nor a directory; skipping");
        }
    }
    files.sort();
    files.dedup();
    files
}

fn wanted(path: &Path, extensions: &[String], file_pattern: Option<&Regex>) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    extensions.iter().any(|e| e == ext)
        && file_pattern.is_none_or(|re| re.is_match(&path.to_string_lossy()))
}
