//! Thread-safe run progress.
//!
//! One tracker is shared across the worker pool; every recorded outcome
//! bumps exactly one of the succeeded/skipped/errored counters, so the
//! three always sum to the completed count.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use harvest_models::{Outcome, OutcomeStatus};

const BAR_WIDTH: usize = 30;

/// Point-in-time counter snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ProgressState {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub errored: usize,
    started_at: Instant,
}

impl ProgressState {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            succeeded: 0,
            skipped: 0,
            errored: 0,
            started_at: Instant::now(),
        }
    }
}

/// Aggregates outcomes from concurrent workers.
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            state: Mutex::new(ProgressState::new(total)),
        }
    }

    /// Record one outcome and return the updated snapshot.
    pub fn record(&self, outcome: &Outcome) -> ProgressState {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.completed += 1;
        match outcome.status {
            OutcomeStatus::Success(_) => state.succeeded += 1,
            OutcomeStatus::Skipped(_) => state.skipped += 1,
            OutcomeStatus::Error(_) => state.errored += 1,
        }
        *state
    }

    pub fn snapshot(&self) -> ProgressState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// One-line progress report for the log.
    pub fn summary_string(&self) -> String {
        let state = self.snapshot();
        let (filled, percent) = if state.total == 0 {
            (BAR_WIDTH, 100.0)
        } else {
            (
                (state.completed * BAR_WIDTH) / state.total,
                state.completed as f64 * 100.0 / state.total as f64,
            )
        };
        let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(BAR_WIDTH - filled);
        format!(
            "[{}] {}/{} ({:.1}%) ok={} skip={} err={} remaining={} elapsed={}",
            bar,
            state.completed,
            state.total,
            percent,
            state.succeeded,
            state.skipped,
            state.errored,
            state.total.saturating_sub(state.completed),
            format_elapsed(state.started_at.elapsed())
        )
    }

    /// Final counts for the completed run.
    pub fn finish(&self) -> RunSummary {
        let state = self.snapshot();
        RunSummary {
            total: state.total,
            succeeded: state.succeeded,
            skipped: state.skipped,
            errored: state.errored,
            elapsed: state.started_at.elapsed(),
        }
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Totals for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub errored: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Share of items that produced new uploads. Skips do not count.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f64 * 100.0 / self.total as f64
        }
    }

    /// Completion message sent back to the item source.
    pub fn message(&self) -> String {
        format!(
            "Processed: {} new, {} skipped/existing, {} errors",
            self.succeeded, self.skipped, self.errored
        )
    }
}
