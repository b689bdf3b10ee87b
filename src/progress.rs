//! Progress reporting for the scan pipeline.
//!
//! The worker reports a single overall percentage in `[0, 100]` plus a phase
//! label. The size-scan phase covers 0-50 and the hashing phase covers
//! 50-100, so a caller rendering one bar sees size-scanning as the first
//! half of total work.
//!
//! Values delivered to a reporter are monotonically non-decreasing within
//! one scan; the [`Monotonic`] wrapper enforces this regardless of how the
//! underlying phases compute their fractions.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Phases of one duplicate-scan session, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Walking the tree and bucketing files by size.
    SizeScan,
    /// Hashing candidate files and grouping by digest.
    Hashing,
    /// Scan finished; results are ready.
    Done,
}

impl ScanPhase {
    /// Human-readable phase label for status displays.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SizeScan => "scanning by size",
            Self::Hashing => "hashing",
            Self::Done => "done",
        }
    }
}

/// Progress callback for the duplicate-scan pipeline.
///
/// Implement this to receive phase transitions and fractional progress
/// updates from a running scan. Implementations must be cheap; they are
/// invoked once per file processed.
pub trait ProgressReporter: Send + Sync {
    /// Called when the pipeline enters a new phase.
    fn on_phase(&self, phase: ScanPhase);

    /// Called with the overall progress percentage, in `[0, 100]`.
    fn on_progress(&self, percent: f64);
}

/// Reporter that discards all updates.
///
/// Used for `--quiet` runs and by tests that only care about results.
#[derive(Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn on_phase(&self, _phase: ScanPhase) {}
    fn on_progress(&self, _percent: f64) {}
}

/// Wrapper that clamps progress updates to be non-decreasing.
///
/// The pipeline's per-phase arithmetic already produces increasing values,
/// but the ordering guarantee is part of the reporter contract, so the scan
/// routes every update through this wrapper rather than relying on callers
/// to compute carefully.
pub struct Monotonic<'a> {
    inner: &'a dyn ProgressReporter,
    last: Mutex<f64>,
}

impl<'a> Monotonic<'a> {
    /// Wrap a reporter, starting from 0%.
    #[must_use]
    pub fn new(inner: &'a dyn ProgressReporter) -> Self {
        Self {
            inner,
            last: Mutex::new(0.0),
        }
    }
}

impl ProgressReporter for Monotonic<'_> {
    fn on_phase(&self, phase: ScanPhase) {
        self.inner.on_phase(phase);
    }

    fn on_progress(&self, percent: f64) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let clamped = percent.clamp(*last, 100.0);
        *last = clamped;
        self.inner.on_progress(clamped);
    }
}

/// Console progress bar backed by indicatif.
///
/// Renders the overall 0-100 percentage with the current phase label as the
/// bar message.
pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    /// Create a new console reporter with a 0-100 bar.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_phase(&self, phase: ScanPhase) {
        self.bar.set_message(phase.label());
        if phase == ScanPhase::Done {
            self.bar.finish();
        }
    }

    fn on_progress(&self, percent: f64) {
        self.bar.set_position(percent.round() as u64);
    }
}
