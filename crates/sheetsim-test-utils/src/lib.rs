//! Test utilities and mock collaborators for sheetsim development.
//!
//! Observers that record, fail, or panic on demand, an in-memory
//! [`DiagnosticsSink`], and hand-built particle fixtures.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use sheetsim_core::{DiagnosticsSink, Level, Observer, ObserverError, RunSummary, Snapshot};

/// Shared, cloneable log of everything a [`RecordingObserver`] received.
#[derive(Clone, Default)]
pub struct SnapshotLog {
    snapshots: Arc<Mutex<Vec<Arc<Snapshot>>>>,
    summary: Arc<Mutex<Option<RunSummary>>>,
}

impl SnapshotLog {
    /// Copy of every snapshot received so far, in delivery order.
    pub fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The summary passed to `on_finish`, if the run completed.
    pub fn summary(&self) -> Option<RunSummary> {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Records every snapshot and the final summary.
pub struct RecordingObserver {
    name: String,
    log: SnapshotLog,
}

impl RecordingObserver {
    /// Create an observer and the log it writes to.
    pub fn new(name: impl Into<String>) -> (Self, SnapshotLog) {
        let log = SnapshotLog::default();
        (
            Self {
                name: name.into(),
                log: log.clone(),
            },
            log,
        )
    }
}

impl Observer for RecordingObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_snapshot(&mut self, snapshot: Arc<Snapshot>) -> Result<(), ObserverError> {
        self.log
            .snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot);
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        *self
            .log
            .summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
    }
}

/// Rejects every snapshot after the first `accept` deliveries.
pub struct FailingObserver {
    accept: usize,
    calls: usize,
}

impl FailingObserver {
    pub fn new(accept: usize) -> Self {
        Self { accept, calls: 0 }
    }
}

impl Observer for FailingObserver {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_snapshot(&mut self, _snapshot: Arc<Snapshot>) -> Result<(), ObserverError> {
        self.calls += 1;
        if self.calls > self.accept {
            return Err(ObserverError::Rejected {
                reason: format!("rejecting delivery {}", self.calls),
            });
        }
        Ok(())
    }
}

/// Panics on every snapshot.
pub struct PanickingObserver;

impl Observer for PanickingObserver {
    fn name(&self) -> &str {
        "panicking"
    }

    fn on_snapshot(&mut self, _snapshot: Arc<Snapshot>) -> Result<(), ObserverError> {
        panic!("observer panicked on purpose");
    }
}

/// Keeps every diagnostic message in memory.
#[derive(Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages so far.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages recorded at `level`.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, level: Level, message: fmt::Arguments<'_>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}
