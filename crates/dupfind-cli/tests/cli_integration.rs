//! Integration tests for dupfind-cli functionality.
//! Tests the underlying library pipeline the CLI drives: parse files from
//! disk, detect duplicates, serialize results.

use dupfind_core::detect::{DetectorOptions, detect};
use dupfind_core::method::ParsedFile;
use std::path::Path;

const DUPLICATED_METHOD: &str = r"
    public int Total(int[] values)
    {
        int sum = 0;

        foreach (var value in values)
        {
            sum = sum + value;
        }

        return sum;
    }
";

fn write_class(dir: &Path, file: &str, class: &str) -> std::path::PathBuf {
    let path = dir.join(file);
    let source = format!("public class {class}\n{{\n{DUPLICATED_METHOD}\n}}\n");
    std::fs::write(&path, source).unwrap();
    path
}

fn parse_dir_files(paths: &[std::path::PathBuf]) -> Vec<ParsedFile> {
    paths
        .iter()
        .map(|p| {
            let source = std::fs::read_to_string(p).unwrap();
            dupfind_parser::parse_file(p, &source).unwrap()
        })
        .collect()
}

#[test]
fn end_to_end_detects_duplicates_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_class(dir.path(), "Invoices.cs", "Invoices");
    let b = write_class(dir.path(), "Orders.cs", "Orders");

    let files = parse_dir_files(&[a, b]);
    let groups = detect(&files, &DetectorOptions::default(), 0.87);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].entries.len(), 1);
    assert_eq!(groups[0].representative.full_name, "Invoices.Total");
    assert_eq!(groups[0].entries[0].method.full_name, "Orders.Total");
    assert!(groups[0].total_impact > 0.0);
}

#[test]
fn unreadable_files_are_skippable_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_class(dir.path(), "Good.cs", "Good");
    let missing = dir.path().join("Missing.cs");

    // The CLI skips files it cannot read and continues with the rest.
    let mut files = Vec::new();
    for path in [good, missing] {
        match std::fs::read_to_string(&path) {
            Ok(source) => files.push(dupfind_parser::parse_file(&path, &source).unwrap()),
            Err(_) => continue,
        }
    }
    assert_eq!(files.len(), 1);

    let groups = detect(&files, &DetectorOptions::default(), 0.87);
    assert!(groups.is_empty());
}

#[test]
fn json_serialization_round_trips_group_shape() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_class(dir.path(), "A.cs", "Alpha");
    let b = write_class(dir.path(), "B.cs", "Beta");

    let files = parse_dir_files(&[a, b]);
    let groups = detect(&files, &DetectorOptions::default(), 0.87);
    let json = serde_json::to_string(&groups).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value.as_array().unwrap().len(), 1);
    let group = &value[0];
    assert!(group["total_impact"].as_f64().unwrap() > 0.0);
    assert!(
        group["representative"]["full_name"]
            .as_str()
            .unwrap()
            .ends_with(".Total")
    );
}

#[test]
fn threshold_flag_tightens_results() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_class(dir.path(), "A.cs", "Alpha");

    // A structural variant: same loop, different accumulation.
    let variant = r"public class Gamma
{
    public int Total(int[] values)
    {
        int sum = 0;

        foreach (var value in values)
        {
            sum = sum + value * 2;
        }

        return sum;
    }
}
";
    let b = dir.path().join("B.cs");
    std::fs::write(&b, variant).unwrap();

    let files = parse_dir_files(&[a, b]);
    let options = DetectorOptions::default();
    let loose: usize = detect(&files, &options, 0.5)
        .iter()
        .map(|g| g.entries.len())
        .sum();
    let strict: usize = detect(&files, &options, 0.99)
        .iter()
        .map(|g| g.entries.len())
        .sum();
    assert!(strict <= loose);
}
