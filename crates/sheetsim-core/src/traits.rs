//! Collaborator seams: snapshot observers and the diagnostics sink.

use std::fmt;
use std::sync::Arc;

use crate::error::ObserverError;
use crate::snapshot::{RunSummary, Snapshot};

/// Receives a snapshot at every reporting boundary.
///
/// Delivery is synchronous: the engine does not continue until every
/// registered observer has returned. Each observer gets its own handle to
/// a snapshot built for that boundary and may retain it.
pub trait Observer: Send {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Accept one snapshot.
    ///
    /// An `Err` is logged and counted by the engine; it does not stop
    /// the run or affect delivery to other observers.
    fn on_snapshot(&mut self, snapshot: Arc<Snapshot>) -> Result<(), ObserverError>;

    /// Called once after the run terminates normally.
    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Severity of a diagnostic message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Per-boundary progress.
    Debug,
    /// Run lifecycle.
    Info,
    /// Recoverable faults such as observer failures.
    Warn,
    /// Fail-stop conditions.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Destination for engine diagnostics.
///
/// Passed into the engine explicitly; the engine never writes to
/// process-wide output streams.
pub trait DiagnosticsSink: Send + Sync {
    /// Record one message.
    fn record(&self, level: Level, message: fmt::Arguments<'_>);
}
