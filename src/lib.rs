//! # backup-planner
//!
//! Helpers for backing up folders to external drives: measure folders,
//! check that a copy matches its source, and decide which folders fit on a
//! drive.
//!
//! - [`scanner`] walks a directory tree and totals its size and file count.
//! - [`comparator`] scans directory pairs and judges them identical or
//!   different within a size and file-count tolerance.
//! - [`fitter`] greedily picks the folders that fit on a drive of a given
//!   capacity once a safety margin is reserved.
//!
//! All three are synchronous and stateless; callers pass complete lists in
//! and get complete results back.

pub mod comparator;
pub mod config;
pub mod error;
pub mod fitter;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod utils;

pub use comparator::{
    ComparisonResult, DirectoryPair, Thresholds, compare, compare_each, compare_pairs,
};
pub use config::{CompareOptions, FitOptions};
pub use error::PlannerError;
pub use fitter::{FitItem, FitPlan, fit, fit_items};
pub use scanner::{FolderMetrics, NoopObserver, ScanObserver, scan_folder, scan_folders};
