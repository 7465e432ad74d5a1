//! Folder scanning: total byte size and file count of a directory tree.
//!
//! The walk is depth-first and driven by `walkdir`, which keeps its own
//! explicit stack, so very deep trees do not grow the call stack. Symbolic
//! links below the root are neither followed nor counted, which keeps the
//! walk cycle-safe. A link passed as the root itself is resolved.
//!
//! Any entry that cannot be read aborts the scan with
//! [`PlannerError::Filesystem`]; a folder that failed to scan is never
//! reported as empty.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, trace};
use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::error::{PlannerError, Result};

/// Size and file count of a scanned directory tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FolderMetrics {
    /// The directory that was scanned, as given by the caller.
    pub path: PathBuf,

    /// Sum of the lengths of every regular file under `path`, in bytes.
    pub total_size_bytes: u64,

    /// Number of regular files under `path`.
    pub file_count: u64,
}

impl FolderMetrics {
    /// Metrics for a tree with no files yet.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            total_size_bytes: 0,
            file_count: 0,
        }
    }
}

/// Receives progress notifications while a folder is being scanned.
///
/// Notifications are a side channel only; nothing an observer does can
/// change the scan result.
pub trait ScanObserver {
    /// Called once per visited entry with a human-readable description.
    fn on_entry(&mut self, message: &str);

    /// Called after each regular file with the running byte total of the
    /// current folder.
    fn on_bytes(&mut self, _total_bytes: u64) {}

    /// Called before each folder of a batch starts, with its 1-based
    /// position and the batch size.
    fn on_folder(&mut self, _number: usize, _total: usize) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_entry(&mut self, _message: &str) {}
}

impl<F> ScanObserver for F
where
    F: FnMut(&str),
{
    fn on_entry(&mut self, message: &str) {
        self(message);
    }
}

/// Recursively measure the directory tree rooted at `path`.
///
/// # Errors
///
/// Returns [`PlannerError::Filesystem`] if `path` does not exist, is not a
/// directory, or if any entry beneath it cannot be read.
pub fn scan_folder(path: &Path, observer: &mut dyn ScanObserver) -> Result<FolderMetrics> {
    let root_meta = fs::metadata(path).map_err(|e| PlannerError::filesystem(path, e))?;
    if !root_meta.is_dir() {
        return Err(PlannerError::filesystem(
            path,
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    debug!("scanning {}", path.display());

    let mut metrics = FolderMetrics::empty(path);

    let walker = WalkDir::new(path).follow_links(false).min_depth(1);
    for entry in walker {
        let entry = entry.map_err(|e| PlannerError::from_walk(path, e))?;

        if entry.file_type().is_file() {
            let len = entry
                .metadata()
                .map_err(|e| PlannerError::from_walk(path, e))?
                .len();
            metrics.total_size_bytes += len;
            metrics.file_count += 1;
            observer.on_bytes(metrics.total_size_bytes);
        } else if entry.path_is_symlink() {
            trace!("not following symlink {}", entry.path().display());
        }

        observer.on_entry(&describe_entry(&entry));
    }

    debug!(
        "scanned {}: {} bytes in {} files",
        path.display(),
        metrics.total_size_bytes,
        metrics.file_count
    );

    Ok(metrics)
}

/// Scan several folders in order, aborting at the first failure.
///
/// # Errors
///
/// Returns the first [`PlannerError`] hit while scanning any folder.
pub fn scan_folders<P: AsRef<Path>>(
    paths: &[P],
    observer: &mut dyn ScanObserver,
) -> Result<Vec<FolderMetrics>> {
    paths
        .iter()
        .enumerate()
        .map(|(i, p)| {
            observer.on_folder(i + 1, paths.len());
            scan_folder(p.as_ref(), observer)
        })
        .collect()
}

fn describe_entry(entry: &DirEntry) -> String {
    let parent = entry.path().parent().unwrap_or_else(|| entry.path());
    format!(
        "Scanning {}, in {}",
        entry.file_name().to_string_lossy(),
        parent.display()
    )
}
