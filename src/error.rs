//! Error types shared by the scanner, comparator and fitter.
//!
//! The core never swallows faults: a folder that cannot be read is reported
//! as [`PlannerError::Filesystem`] instead of being counted as empty, and
//! nonsensical numeric input is rejected up front with
//! [`PlannerError::InvalidInput`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the planning core.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A path could not be read as a directory tree.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A threshold, capacity or margin value that cannot be used.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PlannerError {
    /// Build a [`PlannerError::Filesystem`] for `path`.
    #[must_use]
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Build a [`PlannerError::InvalidInput`] from any message.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Convert a `walkdir` failure, keeping the path it happened at.
    pub(crate) fn from_walk(root: &std::path::Path, err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map_or_else(|| root.to_path_buf(), std::path::Path::to_path_buf);

        let source = err.into_io_error().unwrap_or_else(|| {
            io::Error::other("filesystem loop detected while walking directory tree")
        });

        Self::Filesystem { path, source }
    }
}

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, PlannerError>;
