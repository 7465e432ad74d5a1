//! Utility functions and helpers.
//!
//! Size parsing for threshold input and size formatting for reports.

pub mod size;

pub use size::{format_human, format_mib, format_tib, parse_size};
