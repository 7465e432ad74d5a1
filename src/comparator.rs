//! Directory pair comparison.
//!
//! Each pair is scanned on both sides and classified as identical when both
//! the byte-size delta and the file-count delta stay within their
//! thresholds. Pairs are independent; results come back in input order.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::error::{PlannerError, Result};
use crate::scanner::{FolderMetrics, ScanObserver, scan_folder};

/// Default byte-size tolerance when none is configured.
pub const DEFAULT_SIZE_THRESHOLD: u64 = 2000;

/// Default file-count tolerance when none is configured.
pub const DEFAULT_FILE_COUNT_THRESHOLD: u64 = 0;

/// Two directories to compare, typically a source and its backup copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectoryPair {
    /// First directory, usually the source.
    pub path_a: PathBuf,

    /// Second directory, usually the backup copy.
    pub path_b: PathBuf,
}

impl DirectoryPair {
    #[must_use]
    pub fn new(path_a: impl Into<PathBuf>, path_b: impl Into<PathBuf>) -> Self {
        Self {
            path_a: path_a.into(),
            path_b: path_b.into(),
        }
    }

    /// Build pairs from a flat `[a1, b1, a2, b2, ...]` list.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidInput`] if the list has an odd length.
    pub fn from_flat<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>> {
        if paths.len() % 2 != 0 {
            return Err(PlannerError::invalid_input(format!(
                "directory pairs need an even number of paths, got {}",
                paths.len()
            )));
        }

        Ok(paths
            .chunks_exact(2)
            .map(|chunk| Self::new(chunk[0].as_ref(), chunk[1].as_ref()))
            .collect())
    }
}

/// Tolerances under which two directories count as identical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    /// Maximum allowed difference in total bytes.
    pub size_bytes: u64,

    /// Maximum allowed difference in file count.
    pub file_count: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            size_bytes: DEFAULT_SIZE_THRESHOLD,
            file_count: DEFAULT_FILE_COUNT_THRESHOLD,
        }
    }
}

impl Thresholds {
    #[must_use]
    pub const fn new(size_bytes: u64, file_count: u64) -> Self {
        Self {
            size_bytes,
            file_count,
        }
    }

    /// Whether the given deltas fall within both tolerances.
    #[must_use]
    pub const fn accepts(&self, size_delta: u64, file_count_delta: u64) -> bool {
        size_delta <= self.size_bytes && file_count_delta <= self.file_count
    }
}

/// Outcome of comparing one [`DirectoryPair`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    /// The pair that was compared.
    pub pair: DirectoryPair,

    /// Scan of `pair.path_a`.
    pub metrics_a: FolderMetrics,

    /// Scan of `pair.path_b`.
    pub metrics_b: FolderMetrics,

    /// Absolute difference in total bytes.
    pub size_delta: u64,

    /// Absolute difference in file count.
    pub file_count_delta: u64,

    /// Whether both deltas are within the thresholds.
    pub identical: bool,
}

impl ComparisonResult {
    /// Classify two already-scanned folders.
    #[must_use]
    pub fn from_metrics(
        pair: DirectoryPair,
        metrics_a: FolderMetrics,
        metrics_b: FolderMetrics,
        thresholds: Thresholds,
    ) -> Self {
        let size_delta = metrics_a.total_size_bytes.abs_diff(metrics_b.total_size_bytes);
        let file_count_delta = metrics_a.file_count.abs_diff(metrics_b.file_count);

        Self {
            pair,
            metrics_a,
            metrics_b,
            size_delta,
            file_count_delta,
            identical: thresholds.accepts(size_delta, file_count_delta),
        }
    }

    /// Human-readable summary; `number` is the 1-based pair index.
    #[must_use]
    pub fn message(&self, number: usize) -> String {
        let a = self.pair.path_a.display();
        let b = self.pair.path_b.display();

        if self.identical {
            format!(
                "Directory pair {a} and {b} (pair {number}) are identical. \
                 The directory size is {} bytes, and it contains {} files.",
                self.metrics_a.total_size_bytes, self.metrics_a.file_count
            )
        } else {
            format!(
                "Directory pair {a} and {b} (pair {number}) are different. \
                 The size delta between directories is {} bytes, and the file number delta is {} files.",
                self.size_delta, self.file_count_delta
            )
        }
    }
}

/// Compare a single pair.
///
/// # Errors
///
/// Returns [`PlannerError::Filesystem`] if either side cannot be scanned.
pub fn compare_pair(
    pair: &DirectoryPair,
    thresholds: Thresholds,
    observer: &mut dyn ScanObserver,
) -> Result<ComparisonResult> {
    let metrics_a = scan_folder(&pair.path_a, observer)?;
    let metrics_b = scan_folder(&pair.path_b, observer)?;

    Ok(classify(pair, metrics_a, metrics_b, thresholds))
}

/// Compare the `index`-th of `count` pairs, reporting each side as one
/// folder of a `2 * count` folder batch.
fn compare_nth(
    pair: &DirectoryPair,
    index: usize,
    count: usize,
    thresholds: Thresholds,
    observer: &mut dyn ScanObserver,
) -> Result<ComparisonResult> {
    observer.on_folder(2 * index + 1, 2 * count);
    let metrics_a = scan_folder(&pair.path_a, observer)?;
    observer.on_folder(2 * index + 2, 2 * count);
    let metrics_b = scan_folder(&pair.path_b, observer)?;

    Ok(classify(pair, metrics_a, metrics_b, thresholds))
}

fn classify(
    pair: &DirectoryPair,
    metrics_a: FolderMetrics,
    metrics_b: FolderMetrics,
    thresholds: Thresholds,
) -> ComparisonResult {
    let result = ComparisonResult::from_metrics(pair.clone(), metrics_a, metrics_b, thresholds);
    debug!(
        "compared {} <-> {}: size delta {}, file delta {}, identical {}",
        pair.path_a.display(),
        pair.path_b.display(),
        result.size_delta,
        result.file_count_delta,
        result.identical
    );

    result
}

/// Compare every pair in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first [`PlannerError`] encountered; later pairs are not
/// scanned.
pub fn compare(
    pairs: &[DirectoryPair],
    thresholds: Thresholds,
    observer: &mut dyn ScanObserver,
) -> Result<Vec<ComparisonResult>> {
    info!("comparing {} directory pair(s)", pairs.len());
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| compare_nth(pair, i, pairs.len(), thresholds, observer))
        .collect()
}

/// Compare every pair in order, reporting a result per pair.
///
/// A failure on one pair does not stop the remaining pairs.
pub fn compare_each(
    pairs: &[DirectoryPair],
    thresholds: Thresholds,
    observer: &mut dyn ScanObserver,
) -> Vec<Result<ComparisonResult>> {
    info!("comparing {} directory pair(s), continuing past failures", pairs.len());
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| compare_nth(pair, i, pairs.len(), thresholds, observer))
        .collect()
}

/// Compare pairs and return only the display message and verdict of each.
///
/// # Errors
///
/// Returns the first [`PlannerError`] encountered while scanning.
pub fn compare_pairs(
    pairs: &[DirectoryPair],
    size_threshold: u64,
    file_count_threshold: u64,
    observer: &mut dyn ScanObserver,
) -> Result<Vec<(String, bool)>> {
    let thresholds = Thresholds::new(size_threshold, file_count_threshold);

    Ok(compare(pairs, thresholds, observer)?
        .iter()
        .enumerate()
        .map(|(i, result)| (result.message(i + 1), result.identical))
        .collect())
}
