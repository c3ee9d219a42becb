//! Outcome of one sync run.

use std::fmt;

/// An event that could not be propagated. The run carries on without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFailure {
    pub title: String,
    pub reason: String,
}

/// Tally for one propagation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: usize,
    /// Events intentionally left alone (already present, or our own echo).
    pub skipped: usize,
    pub failures: Vec<EventFailure>,
}

impl BatchOutcome {
    pub fn record_failure(&mut self, title: &str, reason: impl fmt::Display) {
        self.failures.push(EventFailure {
            title: title.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn is_noop(&self) -> bool {
        self.succeeded == 0 && self.skipped == 0 && self.failures.is_empty()
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} done", self.succeeded)?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if !self.failures.is_empty() {
            write!(f, ", {} failed", self.failures.len())?;
        }
        Ok(())
    }
}

/// Per-step outcomes, in the order the steps run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Local additions inserted remotely.
    pub pushed: BatchOutcome,
    /// Remote additions written to the appointment file.
    pub pulled: BatchOutcome,
    /// Local deletions removed remotely.
    pub push_deleted: BatchOutcome,
    /// Remote deletions removed from the appointment file.
    pub pull_deleted: BatchOutcome,
}

impl SyncReport {
    pub fn steps(&self) -> [(&'static str, &BatchOutcome); 4] {
        [
            ("Local additions → remote", &self.pushed),
            ("Remote additions → local", &self.pulled),
            ("Local deletions → remote", &self.push_deleted),
            ("Remote deletions → local", &self.pull_deleted),
        ]
    }

    pub fn failures(&self) -> impl Iterator<Item = &EventFailure> {
        self.steps().into_iter().flat_map(|(_, outcome)| outcome.failures.iter())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Number of mutations actually applied on either side.
    pub fn changes(&self) -> usize {
        self.steps().iter().map(|(_, outcome)| outcome.succeeded).sum()
    }
}
