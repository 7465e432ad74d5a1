//! Resolved options handed to the comparator and fitter.
//!
//! These are built by the CLI after layering command-line arguments over the
//! configuration file, so every field here holds a final value.

use crate::comparator::Thresholds;
use crate::fitter::{DEFAULT_CAPACITY_TB, DEFAULT_SAFETY_MARGIN_PERCENT};

/// Options for the `compare` command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Tolerances for the identical/different verdict
    pub thresholds: Thresholds,

    /// Keep comparing later pairs after a pair fails to scan
    pub keep_going: bool,
}

/// Options for the `fit` command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    /// Drive capacity in TB (TiB)
    pub capacity_tb: f64,

    /// Percentage of the drive kept free
    pub safety_margin_percent: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            capacity_tb: DEFAULT_CAPACITY_TB,
            safety_margin_percent: DEFAULT_SAFETY_MARGIN_PERCENT,
        }
    }
}
