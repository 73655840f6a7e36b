//! Core types and traits for the sheetsim gravitational sheet simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the sheetsim workspace:
//! particle identity and kinematics, the ordering policy the engine sorts
//! by, energy bookkeeping, snapshots handed to observers, error types,
//! and the observer and diagnostics traits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod energy;
pub mod error;
pub mod id;
pub mod order;
pub mod particle;
pub mod snapshot;
pub mod traits;

pub use energy::{compute_energy, EnsembleEnergy};
pub use error::{ConfigError, ObserverError, PairSide, SolverError};
pub use id::{IntervalId, ParticleId};
pub use order::{is_sorted_by, sort_by_order, ParticleOrder, PhaseSpaceOrder};
pub use particle::Particle;
pub use snapshot::{ParticleRecord, RunSummary, Snapshot};
pub use traits::{DiagnosticsSink, Level, Observer};

/// Characteristic time of the canonical unit system (2π system time units).
///
/// Simulation time is reported in multiples of this constant; the engine
/// integrates internally in system time units.
pub const CHARACTERISTIC_TIME: f64 = std::f64::consts::TAU;

/// Total energy every canonicalized ensemble is scaled to.
pub const CANONICAL_ENERGY: f64 = 0.75;
