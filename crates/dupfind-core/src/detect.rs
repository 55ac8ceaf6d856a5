//! Duplicate detection pipeline: eligibility filtering, fingerprint
//! admission, parallel pair scoring, and deterministic group assembly.

use crate::apted::{AptedCosts, MemoPool, TreeDistance};
use crate::fingerprint::might_be_similar;
use crate::method::{DuplicateEntry, DuplicateGroup, MethodRecord, ParsedFile};
use crate::score;
use rayon::prelude::*;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Detection options. Defaults match the published CLI defaults.
#[derive(Debug, Clone)]
pub struct DetectorOptions {
    pub min_lines: usize,
    pub max_lines: usize,
    pub min_tokens: usize,
    /// Apply the size-ratio floor and short-function penalty.
    pub size_penalty: bool,
    /// When set, only methods whose full name matches participate.
    pub include_method_pattern: Option<Regex>,
    pub apted: AptedCosts,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            min_lines: 5,
            max_lines: usize::MAX,
            min_tokens: 0,
            size_penalty: true,
            include_method_pattern: None,
            apted: AptedCosts::default(),
        }
    }
}

impl DetectorOptions {
    /// Reject option combinations the pipeline cannot interpret.
    pub fn validate(&self, threshold: f64) -> Result<(), OptionsError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(OptionsError::ThresholdOutOfRange(threshold));
        }
        if self.min_lines > self.max_lines {
            return Err(OptionsError::LineBoundsInverted {
                min: self.min_lines,
                max: self.max_lines,
            });
        }
        for cost in [
            self.apted.rename,
            self.apted.delete,
            self.apted.insert,
            self.apted.kind_weight,
        ] {
            if cost < 0.0 || !cost.is_finite() {
                return Err(OptionsError::InvalidCost(cost));
            }
        }
        Ok(())
    }
}

/// Errors surfaced to the host boundary before a run starts.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("similarity threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),
    #[error("min-lines {min} exceeds max-lines {max}")]
    LineBoundsInverted { min: usize, max: usize },
    #[error("edit cost {0} must be finite and non-negative")]
    InvalidCost(f64),
}

/// Refactoring value of a duplicate pair.
pub fn impact(a: &MethodRecord, b: &MethodRecord, similarity: f64) -> f64 {
    (a.line_count + b.line_count) as f64 * similarity
}

/// Detect duplicate method groups across the given files.
///
/// Pair scoring is data-parallel; group assembly is single-threaded and
/// driven by method indices assigned before scoring, so output is identical
/// across runs regardless of worker interleaving.
pub fn detect<'a>(
    files: &'a [ParsedFile],
    options: &DetectorOptions,
    threshold: f64,
) -> Vec<DuplicateGroup<'a>> {
    let methods = eligible_methods(files, options);
    debug!(eligible = methods.len(), "eligibility filter applied");

    // Admission runs at half the reporting threshold: a coarse gate that
    // only exists to skip hopeless pairs cheaply.
    let admission_tau = 0.5 * threshold;
    let mut candidates = Vec::new();
    for i in 0..methods.len() {
        for j in (i + 1)..methods.len() {
            if might_be_similar(
                &methods[i].fingerprint,
                &methods[j].fingerprint,
                admission_tau,
            ) {
                candidates.push((i, j));
            }
        }
    }
    debug!(pairs = candidates.len(), "candidate pairs after admission");

    let pool = MemoPool::default();
    let surviving: Vec<(usize, usize, f64)> = candidates
        .par_iter()
        .filter_map(|&(i, j)| {
            let mut engine = TreeDistance::with_memo(options.apted, pool.acquire());
            let similarity = score::score_pair(methods[i], methods[j], &mut engine, options);
            pool.release(engine.into_memo());
            (similarity >= threshold).then_some((i, j, similarity))
        })
        .collect();
    debug!(pairs = surviving.len(), "pairs above threshold");

    assemble_groups(&methods, surviving)
}

fn eligible_methods<'a>(
    files: &'a [ParsedFile],
    options: &DetectorOptions,
) -> Vec<&'a MethodRecord> {
    files
        .iter()
        .flat_map(|file| file.methods.iter())
        .filter(|m| {
            m.line_count >= options.min_lines
                && m.line_count <= options.max_lines
                && m.token_count >= options.min_tokens
                && options
                    .include_method_pattern
                    .as_ref()
                    .is_none_or(|pattern| pattern.is_match(&m.full_name))
        })
        .collect()
}

/// Assemble disjoint groups keyed by the smallest participating index and
/// rank them by impact.
fn assemble_groups<'a>(
    methods: &[&'a MethodRecord],
    pairs: Vec<(usize, usize, f64)>,
) -> Vec<DuplicateGroup<'a>> {
    let mut by_representative: BTreeMap<usize, Vec<(usize, f64)>> = BTreeMap::new();
    for (i, j, similarity) in pairs {
        by_representative.entry(i).or_default().push((j, similarity));
    }

    let mut processed = vec![false; methods.len()];
    let mut groups = Vec::new();

    for (rep, partners) in by_representative {
        if processed[rep] {
            continue;
        }
        let mut entries = Vec::new();
        for (j, similarity) in partners {
            if processed[j] {
                continue;
            }
            entries.push(DuplicateEntry {
                method: methods[j],
                similarity,
                impact: impact(methods[rep], methods[j], similarity),
            });
            processed[j] = true;
        }
        if entries.is_empty() {
            continue;
        }
        processed[rep] = true;

        // Stable sort keeps index-ascending order for equal impacts.
        entries.sort_by(|a, b| b.impact.partial_cmp(&a.impact).unwrap_or(Ordering::Equal));
        let total_impact = entries.iter().map(|e| e.impact).sum();
        groups.push(DuplicateGroup {
            representative: methods[rep],
            entries,
            total_impact,
        });
    }

    groups.sort_by(|a, b| {
        b.total_impact
            .partial_cmp(&a.total_impact)
            .unwrap_or(Ordering::Equal)
    });
    groups
}
