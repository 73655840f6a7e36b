//! Event-driven evolution loop for the one-dimensional gravitational
//! sheet model.
//!
//! Sheets cross rather than collide; every crossing is solved exactly and
//! processed in causal order, with a periodic resynchronization that
//! brings all sheets to a common time for reporting.
//!
//! - [`SheetEngine`]: the engine, built from a [`SimConfig`].
//! - [`solver`]: analytic crossing times.
//! - [`schedule`]: per-pair event bookkeeping.
//! - [`observer`]: registry and synchronous dispatch of snapshots.
//! - [`LogSink`]: diagnostics through the `log` facade.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod field;
pub mod metrics;
pub mod observer;
pub mod schedule;
pub mod solver;

pub use config::{SimConfig, DEFAULT_INTERVAL};
pub use diagnostics::{LogSink, LOG_TARGET};
pub use engine::{CollisionEvent, EngineBuilder, RunError, SheetEngine, StepOutcome};
pub use field::AccelerationField;
pub use metrics::RunMetrics;
pub use observer::{
    ChannelObserver, DispatchReport, ObserverFailure, ObserverFault, ObserverId, ObserverSet,
};
pub use schedule::{invalidated_pairs, EventSchedule};
pub use solver::{is_degenerate, solve, Crossing};
