//! Permanent deletion of duplicate files.
//!
//! # Overview
//!
//! Deletion is an irreversible batch operation gated by explicit
//! confirmation. The confirmation hook is shown the candidate count and the
//! total reclaimable size before anything is removed. The batch itself is
//! best-effort and strictly sequential: each candidate is deleted in turn,
//! a failure is recorded per file, and the remaining deletions continue.
//! Nothing is rolled back.
//!
//! # Example
//!
//! ```no_run
//! use rhythmdupe::actions::delete::delete_batch;
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/music/copy.mp3")];
//! let result = delete_batch(&paths);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::DuplicateSet;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted out from under us).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Result of one successful deletion.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their error messages.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {}",
                self.success_count(),
                bytesize::ByteSize::b(self.bytes_freed)
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                bytesize::ByteSize::b(self.bytes_freed)
            )
        }
    }
}

/// The flat list of deletion candidates gathered from duplicate sets.
///
/// Each set contributes every member except its kept one. The plan is
/// consumed exactly once by [`delete_batch`]; after the batch the caller
/// re-scans rather than patching any cached state.
#[derive(Debug, Clone, Default)]
pub struct DeletionPlan {
    candidates: Vec<PathBuf>,
}

impl DeletionPlan {
    /// Gather candidates from all sets, excluding each set's kept member.
    #[must_use]
    pub fn from_sets(sets: &[DuplicateSet]) -> Self {
        Self {
            candidates: sets
                .iter()
                .flat_map(|set| set.deletion_candidates().iter().cloned())
                .collect(),
        }
    }

    /// Candidate paths, in set order.
    #[must_use]
    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there is nothing to delete.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Total on-disk size of all still-statable candidates.
    ///
    /// Candidates that can no longer be statted contribute nothing and do
    /// not abort the sum.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.candidates
            .iter()
            .filter_map(|path| fs::metadata(path).ok())
            .map(|meta| meta.len())
            .sum()
    }
}

/// Yes/no decision hook for the irreversible deletion step.
///
/// Shown the candidate count and total reclaimable bytes; returns whether
/// to proceed. The interactive implementation lives in the CLI layer.
pub trait ConfirmDeletion {
    /// Decide whether the batch may run.
    fn confirm(&self, file_count: usize, reclaimable_bytes: u64) -> bool;
}

/// Confirmation that always proceeds, for `--yes` runs and tests.
#[derive(Debug, Default)]
pub struct AssumeYes;

impl ConfirmDeletion for AssumeYes {
    fn confirm(&self, _file_count: usize, _reclaimable_bytes: u64) -> bool {
        true
    }
}

/// Permanently delete a single file.
///
/// # Errors
///
/// Returns a [`DeleteError`] if the file cannot be statted or removed.
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path.to_path_buf(), e))?
        .len();
    fs::remove_file(path).map_err(|e| DeleteError::from_io(path.to_path_buf(), e))?;

    log::debug!("deleted {}", path.display());
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
    })
}

/// Delete each path in turn, recording per-file outcomes.
///
/// A failed deletion (permission, already removed, vanished path) never
/// stops the remaining deletions; the batch reports a final tally instead
/// of raising on first failure.
#[must_use]
pub fn delete_batch(paths: &[PathBuf]) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        match permanent_delete(path) {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(err) => {
                log::warn!("failed to delete {}: {}", path.display(), err);
                result.failures.push((path.clone(), err.to_string()));
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
