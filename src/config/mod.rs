//! Configuration for comparing and fitting.
//!
//! - [`file`] loads the optional TOML configuration file.
//! - [`options`] holds the resolved values the commands run with.

pub mod file;
pub mod options;

pub use file::FileConfig;
pub use options::{CompareOptions, FitOptions};
