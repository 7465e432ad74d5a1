//! Greedy selection of folders that fit on a target drive.
//!
//! The drive capacity is given in TiB and reduced by a safety margin. Items
//! are then taken largest-first: each one is accepted if it still fits in the
//! remaining space and skipped otherwise, and iteration always continues so
//! that smaller items can fill the gap left by a rejected one. This is a
//! heuristic; it does not search for the optimal subset.

use std::cmp::Reverse;
use std::path::PathBuf;

use log::{debug, trace};
use serde::Serialize;

use crate::error::{PlannerError, Result};
use crate::scanner::FolderMetrics;

/// Bytes in one TiB (2^40).
pub const BYTES_PER_TIB: u64 = 1 << 40;

/// Default drive capacity in TiB.
pub const DEFAULT_CAPACITY_TB: f64 = 1.0;

/// Default safety margin in percent.
pub const DEFAULT_SAFETY_MARGIN_PERCENT: f64 = 10.0;

/// A folder and its size, as considered by the fitter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FitItem {
    /// Folder the item stands for.
    pub path: PathBuf,

    /// Space the folder needs on the drive, in bytes.
    pub size_bytes: u64,
}

impl FitItem {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
        }
    }
}

impl From<&FolderMetrics> for FitItem {
    fn from(metrics: &FolderMetrics) -> Self {
        Self::new(metrics.path.clone(), metrics.total_size_bytes)
    }
}

/// The result of a fitting run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FitPlan {
    /// Accepted items, in the order they were selected (largest first).
    pub selected: Vec<FitItem>,

    /// Items that did not fit, in the order they were considered.
    pub rejected: Vec<FitItem>,

    /// Usable capacity after the safety margin was taken off.
    pub adjusted_capacity_bytes: u64,

    /// Capacity left once every selected item is placed.
    pub remaining_capacity_bytes: u64,
}

impl FitPlan {
    /// Total size of the selected items.
    #[must_use]
    pub fn selected_bytes(&self) -> u64 {
        self.selected.iter().map(|item| item.size_bytes).sum()
    }
}

/// Usable bytes on a drive of `capacity_tb` TiB once `safety_margin_percent`
/// is reserved, rounded down to whole bytes.
///
/// # Errors
///
/// Returns [`PlannerError::InvalidInput`] if the capacity is negative or not
/// finite, if the margin is outside `0..=100`, or if the result does not fit
/// in a `u64`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn adjusted_capacity_bytes(capacity_tb: f64, safety_margin_percent: f64) -> Result<u64> {
    if !capacity_tb.is_finite() || capacity_tb < 0.0 {
        return Err(PlannerError::invalid_input(format!(
            "capacity must be a finite, non-negative number of TB, got {capacity_tb}"
        )));
    }

    if !safety_margin_percent.is_finite() || !(0.0..=100.0).contains(&safety_margin_percent) {
        return Err(PlannerError::invalid_input(format!(
            "safety margin must be within 0..=100 percent, got {safety_margin_percent}"
        )));
    }

    let capacity_bytes = capacity_tb * BYTES_PER_TIB as f64;
    let adjusted = capacity_bytes * (1.0 - safety_margin_percent / 100.0);

    if adjusted >= u64::MAX as f64 {
        return Err(PlannerError::invalid_input(format!(
            "capacity of {capacity_tb} TB is too large"
        )));
    }

    Ok(adjusted.max(0.0).floor() as u64)
}

/// Greedily select the items that fit within the adjusted capacity.
///
/// Items are considered by size, largest first. Ties keep their input order.
///
/// # Errors
///
/// Returns [`PlannerError::InvalidInput`] if the capacity or margin is
/// unusable; see [`adjusted_capacity_bytes`].
pub fn fit(items: &[FitItem], capacity_tb: f64, safety_margin_percent: f64) -> Result<FitPlan> {
    let adjusted = adjusted_capacity_bytes(capacity_tb, safety_margin_percent)?;
    debug!(
        "fitting {} item(s) into {adjusted} bytes ({capacity_tb} TB, {safety_margin_percent}% margin)",
        items.len()
    );

    let mut ordered: Vec<&FitItem> = items.iter().collect();
    ordered.sort_by_key(|item| Reverse(item.size_bytes));

    let mut remaining = adjusted;
    let mut selected = Vec::new();
    let mut rejected = Vec::new();

    for item in ordered {
        if item.size_bytes <= remaining {
            remaining -= item.size_bytes;
            trace!(
                "accepted {} ({} bytes), {remaining} left",
                item.path.display(),
                item.size_bytes
            );
            selected.push(item.clone());
        } else {
            trace!(
                "rejected {} ({} bytes), only {remaining} left",
                item.path.display(),
                item.size_bytes
            );
            rejected.push(item.clone());
        }
    }

    Ok(FitPlan {
        selected,
        rejected,
        adjusted_capacity_bytes: adjusted,
        remaining_capacity_bytes: remaining,
    })
}

/// Fit already-scanned folders and return the selection with the space left.
///
/// # Errors
///
/// Same as [`fit`].
pub fn fit_items(
    folder_infos: &[FolderMetrics],
    capacity_tb: f64,
    safety_margin_percent: f64,
) -> Result<(Vec<FitItem>, u64)> {
    let items: Vec<FitItem> = folder_infos.iter().map(FitItem::from).collect();
    let plan = fit(&items, capacity_tb, safety_margin_percent)?;

    Ok((plan.selected, plan.remaining_capacity_bytes))
}
