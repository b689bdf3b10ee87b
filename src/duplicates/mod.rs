//! Duplicate detection module.
//!
//! This module provides:
//! - Size-based file bucketing (phase 1)
//! - Content-hash confirmation (phase 2)
//! - Duplicate set building with a deterministic keep/delete policy
//! - The scan session state machine

pub mod finder;
pub mod groups;

pub use finder::{DeleteOutcome, FinderError, ScanOutcome, ScanSession, SessionState};
pub use groups::{build_duplicate_sets, DuplicateSet, ScanStats, SizeIndex};
