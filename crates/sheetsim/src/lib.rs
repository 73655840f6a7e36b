//! sheetsim: an event-driven simulator for N identical mass sheets in one
//! dimension.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all sheetsim sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use sheetsim::prelude::*;
//!
//! struct CountSnapshots(usize);
//! impl Observer for CountSnapshots {
//!     fn name(&self) -> &str { "count" }
//!     fn on_snapshot(&mut self, _s: std::sync::Arc<Snapshot>) -> Result<(), ObserverError> {
//!         self.0 += 1;
//!         Ok(())
//!     }
//! }
//!
//! let mut config = SimConfig::new(32, 0.5, 1.0, Distribution::waterbag());
//! config.interval = 0.1;
//! let mut engine = SheetEngine::builder(config)
//!     .observer(Box::new(CountSnapshots(0)))
//!     .build()
//!     .unwrap();
//! let summary = engine.run().unwrap();
//! assert_eq!(summary.particle_count, 32);
//! assert!((summary.final_energy - 0.75).abs() < 1e-9);
//! assert_eq!(engine.metrics().resyncs, 5);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `sheetsim-core` | Ids, particles, ordering, energy, snapshots, errors, traits |
//! | [`ensemble`] | `sheetsim-gen` | Distributions, sampling, canonicalization |
//! | [`engine`] | `sheetsim-engine` | Solver, schedule, observers, evolution loop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and ids (`sheetsim-core`).
pub use sheetsim_core as types;

/// Initial ensemble generation (`sheetsim-gen`).
///
/// [`ensemble::Generator`] samples a [`ensemble::Distribution`] and canonicalizes
/// the result.
pub use sheetsim_gen as ensemble;

/// The evolution loop (`sheetsim-engine`).
///
/// [`engine::SheetEngine`] runs a [`engine::SimConfig`] and delivers
/// snapshots to registered observers.
pub use sheetsim_engine as engine;

/// Common imports for typical sheetsim usage.
///
/// ```rust
/// use sheetsim::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use sheetsim_core::{
        DiagnosticsSink, IntervalId, Level, Observer, Particle, ParticleId, ParticleOrder,
        ParticleRecord, PhaseSpaceOrder, RunSummary, Snapshot,
    };

    // Errors
    pub use sheetsim_core::{ConfigError, ObserverError, SolverError};

    // Generation
    pub use sheetsim_gen::{Distribution, Ensemble, Generator};

    // Engine
    pub use sheetsim_engine::{
        ChannelObserver, CollisionEvent, LogSink, RunError, RunMetrics, SheetEngine, SimConfig,
        StepOutcome,
    };
}
