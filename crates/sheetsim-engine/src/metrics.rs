//! Whole-run counters for the evolution loop.

/// Counters accumulated over a run.
///
/// Read from [`SheetEngine::metrics`](crate::SheetEngine::metrics) at any
/// point; `wall_time_us` is filled in when the run finishes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// Pair crossings processed.
    pub collisions: u64,
    /// Reporting boundaries crossed (excluding the initial snapshot).
    pub resyncs: u64,
    /// Pair evaluations with equal accelerations on both sides.
    pub degenerate_pairs: u64,
    /// Observer deliveries that failed or panicked.
    pub observer_failures: u64,
    /// Largest `|E - E_initial|` seen at a reporting boundary.
    pub max_energy_drift: f64,
    /// Wall-clock time from the first step to completion, in microseconds.
    pub wall_time_us: u64,
}

impl RunMetrics {
    /// Fold one boundary's energy drift into the running maximum.
    pub fn record_drift(&mut self, drift: f64) {
        if drift > self.max_energy_drift {
            self.max_energy_drift = drift;
        }
    }
}
