//! Rendering of scan, comparison and fit results.
//!
//! Every command has a human-readable form printed with colours and a JSON
//! form. When the `--json` flag is passed, the JSON structures are
//! serialized to stdout as a single object, replacing all human-readable
//! output.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::comparator::ComparisonResult;
use crate::error::PlannerError;
use crate::fitter::{FitItem, FitPlan};
use crate::scanner::FolderMetrics;
use crate::utils::{format_human, format_mib, format_tib};

/// JSON document for the `scan` command.
#[derive(Debug, Serialize)]
pub struct JsonScanOutput {
    /// Always `"scan"`.
    pub mode: String,

    /// One entry per folder, in input order.
    pub folders: Vec<JsonFolderEntry>,

    /// Sum over all folders.
    pub total_size: u64,

    /// Human-readable total size.
    pub total_size_formatted: String,
}

/// A scanned folder in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonFolderEntry {
    pub path: String,
    pub size: u64,
    pub size_formatted: String,
    pub file_count: u64,
}

/// JSON document for the `compare` command.
#[derive(Debug, Serialize)]
pub struct JsonCompareOutput {
    /// Always `"compare"`.
    pub mode: String,

    pub size_threshold: u64,
    pub file_count_threshold: u64,

    /// One entry per pair, in input order.
    pub pairs: Vec<JsonPairEntry>,

    /// Number of pairs judged identical.
    pub identical_count: usize,

    /// Number of pairs judged different.
    pub different_count: usize,

    /// Number of pairs that could not be scanned.
    pub error_count: usize,
}

/// Outcome of one pair in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonPairEntry {
    /// 1-based position of the pair in the input.
    pub pair: usize,

    pub path_a: String,
    pub path_b: String,

    /// `"identical"`, `"different"` or `"error"`.
    pub status: String,

    /// Display message for the pair (or the error text).
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_a: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_b: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count_a: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count_b: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_delta: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_count_delta: Option<u64>,
}

/// JSON document for the `fit` command.
#[derive(Debug, Serialize)]
pub struct JsonFitOutput {
    /// Always `"fit"`.
    pub mode: String,

    pub capacity_tb: f64,
    pub safety_margin_percent: f64,
    pub adjusted_capacity: u64,

    /// Selected folders, largest first.
    pub selected: Vec<JsonFitEntry>,

    /// Folders that did not fit.
    pub rejected: Vec<JsonFitEntry>,

    pub selected_size: u64,
    pub selected_size_formatted: String,
    pub remaining_capacity: u64,
    pub remaining_capacity_formatted: String,
}

/// A folder in a fit plan.
#[derive(Debug, Serialize)]
pub struct JsonFitEntry {
    pub path: String,
    pub size: u64,
    pub size_formatted: String,
}

/// A pair outcome before rendering: either a result or the scan failure.
pub type PairOutcome<'a> = Result<&'a ComparisonResult, &'a PlannerError>;

impl JsonScanOutput {
    #[must_use]
    pub fn from_metrics(metrics: &[FolderMetrics]) -> Self {
        let total_size: u64 = metrics.iter().map(|m| m.total_size_bytes).sum();

        Self {
            mode: "scan".to_string(),
            folders: metrics
                .iter()
                .map(|m| JsonFolderEntry {
                    path: m.path.display().to_string(),
                    size: m.total_size_bytes,
                    size_formatted: format_human(m.total_size_bytes),
                    file_count: m.file_count,
                })
                .collect(),
            total_size,
            total_size_formatted: format_human(total_size),
        }
    }
}

impl JsonCompareOutput {
    /// Build the document from per-pair outcomes.
    ///
    /// `outcomes` yields `(path_a, path_b, outcome)` in input order.
    #[must_use]
    pub fn from_outcomes<'a>(
        outcomes: impl IntoIterator<Item = (&'a Path, &'a Path, PairOutcome<'a>)>,
        size_threshold: u64,
        file_count_threshold: u64,
    ) -> Self {
        let pairs: Vec<JsonPairEntry> = outcomes
            .into_iter()
            .enumerate()
            .map(|(i, (path_a, path_b, outcome))| {
                JsonPairEntry::from_outcome(i + 1, path_a, path_b, outcome)
            })
            .collect();

        let count = |status: &str| pairs.iter().filter(|p| p.status == status).count();

        Self {
            mode: "compare".to_string(),
            size_threshold,
            file_count_threshold,
            identical_count: count("identical"),
            different_count: count("different"),
            error_count: count("error"),
            pairs,
        }
    }
}

impl JsonPairEntry {
    fn from_outcome(
        number: usize,
        path_a: &Path,
        path_b: &Path,
        outcome: PairOutcome<'_>,
    ) -> Self {
        let base = Self {
            pair: number,
            path_a: path_a.display().to_string(),
            path_b: path_b.display().to_string(),
            status: "error".to_string(),
            message: String::new(),
            size_a: None,
            size_b: None,
            file_count_a: None,
            file_count_b: None,
            size_delta: None,
            file_count_delta: None,
        };

        match outcome {
            Ok(result) => Self {
                status: if result.identical {
                    "identical"
                } else {
                    "different"
                }
                .to_string(),
                message: result.message(number),
                size_a: Some(result.metrics_a.total_size_bytes),
                size_b: Some(result.metrics_b.total_size_bytes),
                file_count_a: Some(result.metrics_a.file_count),
                file_count_b: Some(result.metrics_b.file_count),
                size_delta: Some(result.size_delta),
                file_count_delta: Some(result.file_count_delta),
                ..base
            },
            Err(err) => Self {
                message: err.to_string(),
                ..base
            },
        }
    }
}

impl JsonFitOutput {
    #[must_use]
    pub fn from_plan(plan: &FitPlan, capacity_tb: f64, safety_margin_percent: f64) -> Self {
        let selected_size = plan.selected_bytes();

        Self {
            mode: "fit".to_string(),
            capacity_tb,
            safety_margin_percent,
            adjusted_capacity: plan.adjusted_capacity_bytes,
            selected: plan.selected.iter().map(JsonFitEntry::from_item).collect(),
            rejected: plan.rejected.iter().map(JsonFitEntry::from_item).collect(),
            selected_size,
            selected_size_formatted: format_human(selected_size),
            remaining_capacity: plan.remaining_capacity_bytes,
            remaining_capacity_formatted: format_human(plan.remaining_capacity_bytes),
        }
    }
}

impl JsonFitEntry {
    #[must_use]
    pub fn from_item(item: &FitItem) -> Self {
        Self {
            path: item.path.display().to_string(),
            size: item.size_bytes,
            size_formatted: format_human(item.size_bytes),
        }
    }
}

/// Print scanned folders as `<path> - <size> MB - <count> files`.
pub fn print_scan(metrics: &[FolderMetrics]) {
    println!("{}", "Folder information:".bold());
    for m in metrics {
        println!(
            "  {} - {} - {} files",
            m.path.display(),
            format_mib(m.total_size_bytes).bright_white(),
            m.file_count.to_string().bright_white()
        );
    }

    let total: u64 = metrics.iter().map(|m| m.total_size_bytes).sum();
    println!("  💾 Total: {}", format_human(total).bright_green().bold());
}

/// Print one coloured line per pair, followed by a separator.
pub fn print_compare<'a>(outcomes: impl IntoIterator<Item = (usize, PairOutcome<'a>)>) {
    for (number, outcome) in outcomes {
        match outcome {
            Ok(result) if result.identical => {
                println!("{} {}", "✅".green(), result.message(number).green());
            }
            Ok(result) => println!("{} {}", "❌".red(), result.message(number).red()),
            Err(err) => println!(
                "{} {}",
                "⚠️".yellow(),
                format!("Pair {number} could not be compared: {err}").yellow()
            ),
        }
        println!("---");
    }
}

/// Print the folders selected for the drive and the space left over.
pub fn print_fit(plan: &FitPlan) {
    if plan.selected.is_empty() {
        println!("{}", "No folder fits on the drive.".yellow());
    } else {
        println!("{}", "Folders to fit in hard disk:".bold());
        for item in &plan.selected {
            println!(
                "  {} - {}",
                item.path.display(),
                format_mib(item.size_bytes).bright_white()
            );
        }
    }

    if !plan.rejected.is_empty() {
        println!("{}", "Left out:".bold());
        for item in &plan.rejected {
            println!(
                "  {} - {}",
                item.path.display().to_string().dimmed(),
                format_mib(item.size_bytes).dimmed()
            );
        }
    }

    println!(
        "Remaining space: {}",
        format_tib(plan.remaining_capacity_bytes).bright_green().bold()
    );
}
