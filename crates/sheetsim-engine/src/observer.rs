//! Observer registry and synchronous snapshot dispatch.
//!
//! Observers are called in registration order. A failing or panicking
//! observer is logged and counted; the others still receive the snapshot
//! and the run continues.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;
use sheetsim_core::{DiagnosticsSink, Level, Observer, ObserverError, RunSummary, Snapshot};

/// Handle returned when an observer is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why an observer did not accept a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum ObserverFault {
    /// The observer returned an error.
    Error(ObserverError),
    /// The observer panicked; carries the panic message when available.
    Panic(String),
}

impl fmt::Display for ObserverFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(e) => write!(f, "{e}"),
            Self::Panic(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// One failed delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverFailure {
    /// Registration handle.
    pub id: ObserverId,
    /// Observer name at the time of failure.
    pub name: String,
    /// What went wrong.
    pub fault: ObserverFault,
}

/// Outcome of delivering one snapshot to every observer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    /// Observers that accepted the snapshot.
    pub delivered: usize,
    /// Observers that did not.
    pub failures: Vec<ObserverFailure>,
}

impl DispatchReport {
    /// Whether every observer accepted the snapshot.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Insertion-ordered set of observers.
#[derive(Default)]
pub struct ObserverSet {
    next_id: u32,
    entries: IndexMap<ObserverId, Box<dyn Observer>>,
}

impl ObserverSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer at the end of the delivery order.
    pub fn insert(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, observer);
        id
    }

    /// Unregister an observer, keeping the order of the rest.
    pub fn remove(&mut self, id: ObserverId) -> Option<Box<dyn Observer>> {
        self.entries.shift_remove(&id)
    }

    /// Number of registered observers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no observers are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observer names in delivery order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().map(|o| o.name())
    }

    /// Deliver `snapshot` to every observer, in order, before returning.
    pub fn dispatch(
        &mut self,
        snapshot: &Arc<Snapshot>,
        sink: &dyn DiagnosticsSink,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (&id, observer) in self.entries.iter_mut() {
            let shared = Arc::clone(snapshot);
            let outcome = catch_unwind(AssertUnwindSafe(|| observer.on_snapshot(shared)));
            let fault = match outcome {
                Ok(Ok(())) => {
                    report.delivered += 1;
                    continue;
                }
                Ok(Err(e)) => ObserverFault::Error(e),
                Err(payload) => ObserverFault::Panic(panic_message(payload.as_ref())),
            };
            let name = observer.name().to_string();
            sink.record(
                Level::Warn,
                format_args!(
                    "observer {id} ({name}) failed at interval {}: {fault}",
                    snapshot.interval
                ),
            );
            report.failures.push(ObserverFailure { id, name, fault });
        }
        report
    }

    /// Deliver the end-of-run summary. Returns the number of observers
    /// that panicked.
    pub fn finish(&mut self, summary: &RunSummary, sink: &dyn DiagnosticsSink) -> usize {
        let mut panics = 0;
        for (&id, observer) in self.entries.iter_mut() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.on_finish(summary))) {
                panics += 1;
                sink.record(
                    Level::Warn,
                    format_args!(
                        "observer {id} ({}) panicked in on_finish: {}",
                        observer.name(),
                        panic_message(payload.as_ref())
                    ),
                );
            }
        }
        panics
    }
}

impl fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(id, o)| (id, o.name())))
            .finish()
    }
}

// ── ChannelObserver ────────────────────────────────────────────────

/// Forwards snapshots through a bounded channel.
///
/// `send` blocks while the channel is full, so the engine does not move
/// on until the consumer has made room. The consumer must run on another
/// thread once the buffer can fill up.
pub struct ChannelObserver {
    name: String,
    sender: Sender<Arc<Snapshot>>,
}

impl ChannelObserver {
    /// Wrap an existing sender.
    pub fn new(name: impl Into<String>, sender: Sender<Arc<Snapshot>>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }

    /// Create an observer and the receiving end of a channel holding at
    /// most `capacity` snapshots.
    pub fn bounded(name: impl Into<String>, capacity: usize) -> (Self, Receiver<Arc<Snapshot>>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self::new(name, tx), rx)
    }
}

impl Observer for ChannelObserver {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_snapshot(&mut self, snapshot: Arc<Snapshot>) -> Result<(), ObserverError> {
        self.sender
            .send(snapshot)
            .map_err(|_| ObserverError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsim_core::{compute_energy, IntervalId, Particle, ParticleId};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<(Level, String)>>);

    impl DiagnosticsSink for Collect {
        fn record(&self, level: Level, message: fmt::Arguments<'_>) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    struct Tally {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Observer for Tally {
        fn name(&self) -> &str {
            self.name
        }

        fn on_snapshot(&mut self, _snapshot: Arc<Snapshot>) -> Result<(), ObserverError> {
            self.seen.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Boom;

    impl Observer for Boom {
        fn name(&self) -> &str {
            "boom"
        }

        fn on_snapshot(&mut self, _snapshot: Arc<Snapshot>) -> Result<(), ObserverError> {
            panic!("boom observer");
        }
    }

    fn snapshot() -> Arc<Snapshot> {
        let mut slots = vec![
            Particle::new(ParticleId(0), -0.5, 0.1),
            Particle::new(ParticleId(1), 0.5, -0.1),
        ];
        let energy = compute_energy(&mut slots);
        Arc::new(Snapshot::capture(IntervalId(0), 0.0, &slots, energy))
    }

    #[test]
    fn dispatch_follows_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut set = ObserverSet::new();
        for name in ["a", "b", "c"] {
            set.insert(Box::new(Tally {
                name,
                seen: Arc::clone(&seen),
            }));
        }
        let sink = Collect::default();
        let report = set.dispatch(&snapshot(), &sink);
        assert!(report.is_clean());
        assert_eq!(report.delivered, 3);
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut set = ObserverSet::new();
        let ids: Vec<_> = ["a", "b", "c"]
            .into_iter()
            .map(|name| {
                set.insert(Box::new(Tally {
                    name,
                    seen: Arc::clone(&seen),
                }))
            })
            .collect();
        assert!(set.remove(ids[0]).is_some());
        assert!(set.remove(ids[0]).is_none());
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn panicking_observer_is_isolated() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut set = ObserverSet::new();
        set.insert(Box::new(Boom));
        set.insert(Box::new(Tally {
            name: "after",
            seen: Arc::clone(&seen),
        }));
        let sink = Collect::default();
        let report = set.dispatch(&snapshot(), &sink);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].fault,
            ObserverFault::Panic("boom observer".to_string())
        );
        assert_eq!(*seen.lock().unwrap(), vec!["after"]);
        let logged = sink.0.lock().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, Level::Warn);
        assert!(logged[0].1.contains("boom"));
    }

    #[test]
    fn channel_observer_forwards_and_detects_disconnect() {
        let (mut obs, rx) = ChannelObserver::bounded("chan", 1);
        let snap = snapshot();
        assert!(obs.on_snapshot(Arc::clone(&snap)).is_ok());
        assert_eq!(rx.recv().unwrap().content_hash(), snap.content_hash());
        drop(rx);
        assert_eq!(obs.on_snapshot(snap), Err(ObserverError::Disconnected));
    }
}
