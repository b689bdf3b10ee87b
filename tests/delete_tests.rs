//! Deletion executor scenarios: confirmation gating, best-effort batches,
//! and the rescan-after-delete contract.

use rhythmdupe::actions::delete::{ConfirmDeletion, DeletionPlan};
use rhythmdupe::duplicates::{DeleteOutcome, FinderError, ScanSession, SessionState};
use rhythmdupe::progress::NullReporter;
use std::fs;
use std::sync::{Barrier, Mutex};
use std::thread;
use tempfile::tempdir;

/// Confirmation stub recording what it was shown.
struct RecordingConfirm {
    proceed: bool,
    shown: Mutex<Option<(usize, u64)>>,
}

impl RecordingConfirm {
    fn new(proceed: bool) -> Self {
        Self {
            proceed,
            shown: Mutex::new(None),
        }
    }
}

impl ConfirmDeletion for RecordingConfirm {
    fn confirm(&self, file_count: usize, reclaimable_bytes: u64) -> bool {
        *self.shown.lock().unwrap() = Some((file_count, reclaimable_bytes));
        self.proceed
    }
}

/// Build a tree with one duplicate trio and one singleton, scan it, and
/// return the presenting session plus outcome.
fn scanned_fixture(dir: &std::path::Path) -> (ScanSession, rhythmdupe::duplicates::ScanOutcome) {
    fs::write(dir.join("a.mp3"), b"dup content").unwrap();
    fs::write(dir.join("b.mp3"), b"dup content").unwrap();
    fs::write(dir.join("c.mp3"), b"dup content").unwrap();
    fs::write(dir.join("unique.mp3"), b"different").unwrap();

    let session = ScanSession::new();
    let outcome = session.scan(dir, &NullReporter).unwrap();
    assert_eq!(session.state(), SessionState::Presenting);
    (session, outcome)
}

#[test]
fn confirmed_deletion_removes_all_but_kept_member() {
    let dir = tempdir().unwrap();
    let (session, outcome) = scanned_fixture(dir.path());

    let confirm = RecordingConfirm::new(true);
    let result = session.delete_duplicates(&outcome.sets, &confirm).unwrap();

    // Confirmation saw 2 candidates and their live total size.
    assert_eq!(*confirm.shown.lock().unwrap(), Some((2, 22)));

    match result {
        DeleteOutcome::Completed(batch) => {
            assert_eq!(batch.success_count(), 2);
            assert_eq!(batch.failure_count(), 0);
            assert_eq!(batch.bytes_freed, 22);
        }
        DeleteOutcome::Cancelled => panic!("deletion should have run"),
    }

    // Exactly the kept member survives; the singleton is untouched.
    assert!(dir.path().join("a.mp3").exists());
    assert!(!dir.path().join("b.mp3").exists());
    assert!(!dir.path().join("c.mp3").exists());
    assert!(dir.path().join("unique.mp3").exists());

    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn declined_confirmation_deletes_nothing() {
    let dir = tempdir().unwrap();
    let (session, outcome) = scanned_fixture(dir.path());

    let confirm = RecordingConfirm::new(false);
    let result = session.delete_duplicates(&outcome.sets, &confirm).unwrap();

    assert!(matches!(result, DeleteOutcome::Cancelled));
    assert!(dir.path().join("a.mp3").exists());
    assert!(dir.path().join("b.mp3").exists());
    assert!(dir.path().join("c.mp3").exists());

    // Session is still presenting; the user can change their mind.
    assert_eq!(session.state(), SessionState::Presenting);
}

#[test]
fn batch_reports_failures_without_rolling_back() {
    let dir = tempdir().unwrap();
    let (session, outcome) = scanned_fixture(dir.path());

    // One candidate vanishes between scan and deletion.
    fs::remove_file(dir.path().join("b.mp3")).unwrap();

    let result = session
        .delete_duplicates(&outcome.sets, &RecordingConfirm::new(true))
        .unwrap();

    match result {
        DeleteOutcome::Completed(batch) => {
            assert_eq!(batch.success_count(), 1);
            assert_eq!(batch.failure_count(), 1);
            assert!(batch.failures[0].0.ends_with("b.mp3"));
        }
        DeleteOutcome::Cancelled => panic!("deletion should have run"),
    }

    // The successful deletion stands despite the failure.
    assert!(!dir.path().join("c.mp3").exists());
    assert!(dir.path().join("a.mp3").exists());
}

#[test]
fn rescan_after_deletion_finds_a_clean_tree() {
    let dir = tempdir().unwrap();
    let (session, outcome) = scanned_fixture(dir.path());

    session
        .delete_duplicates(&outcome.sets, &RecordingConfirm::new(true))
        .unwrap();

    let after = session.scan(dir.path(), &NullReporter).unwrap();
    assert!(after.is_clean());
    assert_eq!(after.stats.files_discovered, 2);
}

/// Confirmation hook that holds every caller inside `confirm()` until all
/// of them have passed the session's initial state check, then lets them
/// proceed together.
struct RendezvousConfirm {
    barrier: Barrier,
}

impl ConfirmDeletion for RendezvousConfirm {
    fn confirm(&self, _file_count: usize, _reclaimable_bytes: u64) -> bool {
        self.barrier.wait();
        true
    }
}

#[test]
fn racing_delete_requests_run_at_most_one_batch() {
    let dir = tempdir().unwrap();
    let (session, outcome) = scanned_fixture(dir.path());

    let confirm = RendezvousConfirm {
        barrier: Barrier::new(2),
    };

    let results: Vec<Result<DeleteOutcome, FinderError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| scope.spawn(|| session.delete_duplicates(&outcome.sets, &confirm)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Exactly one caller wins the Presenting -> Deleting transition and
    // runs a clean batch; the other is turned away after confirmation.
    let mut completed = 0;
    let mut rejected = 0;
    for result in results {
        match result {
            Ok(DeleteOutcome::Completed(batch)) => {
                completed += 1;
                assert_eq!(batch.success_count(), 2);
                assert_eq!(batch.failure_count(), 0);
            }
            Ok(DeleteOutcome::Cancelled) => panic!("hook always confirms"),
            Err(FinderError::NotPresenting) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(completed, 1);
    assert_eq!(rejected, 1);

    // The candidates were consumed exactly once and the keep survived.
    assert!(dir.path().join("a.mp3").exists());
    assert!(!dir.path().join("b.mp3").exists());
    assert!(!dir.path().join("c.mp3").exists());
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn plan_gathers_candidates_from_every_set() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("s1a.mp3"), b"first dup").unwrap();
    fs::write(dir.path().join("s1b.mp3"), b"first dup").unwrap();
    fs::write(dir.path().join("s2a.mp3"), b"second dup!").unwrap();
    fs::write(dir.path().join("s2b.mp3"), b"second dup!").unwrap();
    fs::write(dir.path().join("s2c.mp3"), b"second dup!").unwrap();

    let session = ScanSession::new();
    let outcome = session.scan(dir.path(), &NullReporter).unwrap();
    assert_eq!(outcome.sets.len(), 2);

    let plan = DeletionPlan::from_sets(&outcome.sets);
    // One candidate from the pair, two from the trio.
    assert_eq!(plan.len(), 3);
    for set in &outcome.sets {
        assert!(!plan.candidates().contains(&set.keep().to_path_buf()));
    }
}
