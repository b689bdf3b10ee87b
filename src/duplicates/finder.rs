//! Scan session and the two-phase duplicate detection pipeline.
//!
//! # Overview
//!
//! One [`ScanSession`] owns the state machine for a full duplicate-scan
//! session:
//!
//! ```text
//! Idle -> Scanning(by-size) -> Scanning(by-hash) -> Presenting
//!                                                     |-> Idle
//!                                                     |-> Deleting -> Idle
//! ```
//!
//! A scan runs the whole pipeline to completion on the calling thread with
//! no internal parallelism; at most one scan is in flight per session, and a
//! start request while one is running is rejected with
//! [`FinderError::ScanInProgress`] rather than queued. There is no
//! cancellation: a started scan runs until it finishes.
//!
//! The pipeline tolerates a moving filesystem. A file deleted or modified
//! between the size phase and the hash phase simply fails to stat or open
//! and is skipped; no per-file error is ever fatal to the scan.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;

use crate::actions::delete::{delete_batch, BatchDeleteResult, ConfirmDeletion, DeletionPlan};
use crate::progress::{Monotonic, ProgressReporter, ScanPhase};
use crate::scanner::{hash_file, Digest, FileEntry, Walker};

use super::groups::{build_duplicate_sets, DuplicateSet, ScanStats, SizeIndex};

/// States of one scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No scan has run, or the last one was dismissed.
    Idle,
    /// Phase 1: walking the tree and bucketing by size.
    ScanningBySize,
    /// Phase 2: hashing candidates and grouping by digest.
    Hashing,
    /// Results delivered; awaiting review, deletion, or dismissal.
    Presenting,
    /// Deletion executor is running.
    Deleting,
}

impl SessionState {
    /// Whether the pipeline is currently running.
    #[must_use]
    pub fn is_scanning(self) -> bool {
        matches!(self, Self::ScanningBySize | Self::Hashing)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Errors surfaced by the scan session.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The root path does not exist or cannot be read.
    #[error("root path not found: {0}")]
    RootNotFound(PathBuf),

    /// The root path exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A scan or deletion is already running on this session.
    #[error("a scan is already in progress")]
    ScanInProgress,

    /// Deletion was requested without a completed scan awaiting review.
    #[error("no scan results are awaiting review")]
    NotPresenting,
}

/// Everything a completed scan delivers, atomically, at end of scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Duplicate sets, ordered by kept path.
    pub sets: Vec<DuplicateSet>,
    /// Counters accumulated over the scan.
    pub stats: ScanStats,
}

impl ScanOutcome {
    /// Whether the scan found nothing to act on.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Result of a deletion request against a presenting session.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The confirmation hook declined; nothing was deleted.
    Cancelled,
    /// The batch ran; per-file outcomes are in the result.
    Completed(BatchDeleteResult),
}

/// A duplicate-scan session.
///
/// Owns all mutable scan state; the presentation layer only sees progress
/// ticks during a scan and the [`ScanOutcome`] at completion. Whether a scan
/// is running is a state check on this object, so concurrent callers race on
/// the state transition, not on a shared flag.
#[derive(Debug, Default)]
pub struct ScanSession {
    state: Mutex<SessionState>,
}

impl ScanSession {
    /// Create a new idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.lock_state()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: SessionState) {
        *self.lock_state() = next;
    }

    /// Run the full pipeline: size index, hash confirmation, set building.
    ///
    /// Valid from `Idle` or `Presenting` (starting a new scan discards
    /// presented results, matching a user re-scan). Progress is reported
    /// through `reporter` with the size phase scaled to 0-50 and the hash
    /// phase to 50-100; delivered values are monotonically non-decreasing.
    ///
    /// Ends in `Presenting` when duplicates were found, `Idle` when the
    /// scan came back clean.
    ///
    /// # Errors
    ///
    /// - [`FinderError::RootNotFound`] / [`FinderError::NotADirectory`] if
    ///   the root is unusable; surfaced before any work happens.
    /// - [`FinderError::ScanInProgress`] if the session is mid-scan or
    ///   mid-deletion.
    pub fn scan(
        &self,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<ScanOutcome, FinderError> {
        validate_root(root)?;

        {
            let mut state = self.lock_state();
            match *state {
                SessionState::Idle | SessionState::Presenting => {
                    *state = SessionState::ScanningBySize;
                }
                _ => return Err(FinderError::ScanInProgress),
            }
        }

        let reporter = Monotonic::new(reporter);
        let mut stats = ScanStats::default();

        let index = self.build_size_index(root, &reporter, &mut stats);

        self.set_state(SessionState::Hashing);
        let groups = confirm_by_hash(&index, &reporter, &mut stats);

        let sets = build_duplicate_sets(groups);
        stats.duplicate_sets = sets.len();
        stats.redundant_files = sets.iter().map(|s| s.len() - 1).sum();
        stats.reclaimable_bytes = sets.iter().map(DuplicateSet::reclaimable_bytes).sum();

        reporter.on_progress(100.0);
        reporter.on_phase(ScanPhase::Done);

        self.set_state(if sets.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Presenting
        });

        log::info!(
            "scan complete: {} duplicate files in {} sets",
            stats.redundant_files,
            stats.duplicate_sets
        );
        Ok(ScanOutcome { sets, stats })
    }

    /// Phase 1: walk the tree and bucket every statable file by size.
    fn build_size_index(
        &self,
        root: &Path,
        reporter: &Monotonic<'_>,
        stats: &mut ScanStats,
    ) -> SizeIndex {
        reporter.on_phase(ScanPhase::SizeScan);

        let walk = Walker::new(root).collect();
        stats.files_discovered = walk.files.len();
        stats.files_skipped = walk.skipped;

        let total = walk.files.len();
        let mut index = SizeIndex::new();

        for (i, path) in walk.files.into_iter().enumerate() {
            match fs::metadata(&path) {
                Ok(meta) => index.insert(FileEntry::new(path, meta.len())),
                Err(err) => {
                    log::debug!("skipping unstatable file {}: {}", path.display(), err);
                    stats.files_skipped += 1;
                }
            }
            // total > 0 here since the loop body ran at least once
            reporter.on_progress((i + 1) as f64 / total as f64 * 50.0);
        }

        index
    }

    /// Delete all candidates from the presented sets, gated on confirmation.
    ///
    /// Valid only from `Presenting`. The confirmation hook is shown the
    /// candidate count and the total reclaimable size (summed from live
    /// stat calls, skipping paths that are no longer statable). A declined
    /// confirmation leaves the session presenting; a completed batch ends
    /// in `Idle`, after which the caller should re-scan from scratch to
    /// reflect the new filesystem state.
    ///
    /// The confirmation hook runs without the state lock held (it may block
    /// on user input), so the `Presenting -> Deleting` transition is
    /// re-checked under the lock after confirmation. Of several racing
    /// delete requests, exactly one wins the transition and runs the batch;
    /// each candidate is consumed at most once.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::NotPresenting`] when no results are under
    /// review, including when another caller took the session out of
    /// `Presenting` during confirmation, and [`FinderError::ScanInProgress`]
    /// when a re-scan started in that window.
    pub fn delete_duplicates(
        &self,
        sets: &[DuplicateSet],
        confirm: &dyn ConfirmDeletion,
    ) -> Result<DeleteOutcome, FinderError> {
        {
            let state = self.lock_state();
            if *state != SessionState::Presenting {
                return Err(FinderError::NotPresenting);
            }
        }

        let plan = DeletionPlan::from_sets(sets);
        if !confirm.confirm(plan.len(), plan.reclaimable_bytes()) {
            log::info!("deletion cancelled at confirmation");
            return Ok(DeleteOutcome::Cancelled);
        }

        // The state may have moved while the hook was blocked; only a
        // Presenting session may enter Deleting.
        {
            let mut state = self.lock_state();
            match *state {
                SessionState::Presenting => *state = SessionState::Deleting,
                s if s.is_scanning() => return Err(FinderError::ScanInProgress),
                _ => return Err(FinderError::NotPresenting),
            }
        }

        let result = delete_batch(plan.candidates());
        self.set_state(SessionState::Idle);

        Ok(DeleteOutcome::Completed(result))
    }

    /// Leave the presenting state without deleting anything.
    ///
    /// A no-op in any other state.
    pub fn dismiss(&self) {
        let mut state = self.lock_state();
        if *state == SessionState::Presenting {
            *state = SessionState::Idle;
        }
    }
}

/// Check the root before any worker state changes.
fn validate_root(root: &Path) -> Result<(), FinderError> {
    let meta = fs::metadata(root).map_err(|_| FinderError::RootNotFound(root.to_path_buf()))?;
    if !meta.is_dir() {
        return Err(FinderError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Phase 2: hash every file in a multi-member size bucket and group the
/// results by digest.
///
/// Buckets with a single member never reach this function's inner loop,
/// which is the point of the two-phase design: the majority of unique-sized
/// files are never read at all. With zero candidates, progress jumps
/// straight to 100 and no file is opened.
fn confirm_by_hash(
    index: &SizeIndex,
    reporter: &Monotonic<'_>,
    stats: &mut ScanStats,
) -> HashMap<Digest, (u64, Vec<PathBuf>)> {
    reporter.on_phase(ScanPhase::Hashing);

    let total = index.candidate_count();
    stats.hash_candidates = total;

    let mut groups: HashMap<Digest, (u64, Vec<PathBuf>)> = HashMap::new();
    if total == 0 {
        reporter.on_progress(100.0);
        return groups;
    }

    let mut processed = 0usize;
    for (size, paths) in index.candidate_buckets() {
        for path in paths {
            match hash_file(path) {
                Ok(digest) => {
                    stats.files_hashed += 1;
                    groups
                        .entry(digest)
                        .or_insert_with(|| (size, Vec::new()))
                        .1
                        .push(path.clone());
                }
                Err(err) => {
                    log::warn!("skipping unreadable file during hashing: {}", err);
                    stats.hash_failures += 1;
                }
            }
            processed += 1;
            reporter.on_progress(50.0 + processed as f64 / total as f64 * 50.0);
        }
    }

    groups
}
