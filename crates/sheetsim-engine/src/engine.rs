//! The event-driven evolution loop.
//!
//! [`SheetEngine`] owns the slot array, the acceleration table, and the
//! per-pair schedule. Each [`step()`](SheetEngine::step) does one of:
//!
//! - start the run: solve every pair, emit the initial snapshot;
//! - process the earliest crossing: advance its two sheets, swap their
//!   slots, re-solve the (at most three) pairs the swap invalidated;
//! - resynchronize: when the earliest crossing lies past the reporting
//!   boundary, advance every sheet to the boundary, rebase the schedule,
//!   recompute energy and deliver a snapshot to every observer.
//!
//! A solver invariant violation is fail-stop: the local state of both
//! sheets is written to the diagnostics sink and every later step returns
//! [`RunError::Halted`].
//!
//! # Time
//!
//! The loop integrates in system units. Reported times are in
//! characteristic units ([`CHARACTERISTIC_TIME`] system units each);
//! boundary times are `interval_index × interval` exactly.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use sheetsim_core::{
    compute_energy, is_sorted_by, sort_by_order, ConfigError, DiagnosticsSink, EnsembleEnergy,
    IntervalId, Level, Observer, PairSide, Particle, ParticleId, ParticleOrder, PhaseSpaceOrder,
    RunSummary, Snapshot, SolverError, CHARACTERISTIC_TIME,
};

use crate::config::SimConfig;
use crate::diagnostics::LogSink;
use crate::field::AccelerationField;
use crate::metrics::RunMetrics;
use crate::observer::{DispatchReport, ObserverId, ObserverSet};
use crate::schedule::{invalidated_pairs, EventSchedule};
use crate::solver::{is_degenerate, solve};

// Compile-time assertion: SheetEngine can be moved to a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<SheetEngine>();
    }
};

// ── RunError ───────────────────────────────────────────────────────

/// Errors that end a run.
#[derive(Clone, Debug, PartialEq)]
pub enum RunError {
    /// The collision solver reported an invariant violation.
    Solver {
        /// Pair index (left slot) being re-solved.
        pair: usize,
        /// Start of the reporting interval in progress, characteristic units.
        simulation_time: f64,
        /// The violation.
        source: SolverError,
    },
    /// The engine already failed; no further steps are possible.
    Halted,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solver {
                pair,
                simulation_time,
                source,
            } => write!(
                f,
                "solver failed on pair {pair} in the interval starting at t={simulation_time}: {source}"
            ),
            Self::Halted => write!(f, "engine halted after an earlier failure"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Solver { source, .. } => Some(source),
            Self::Halted => None,
        }
    }
}

// ── StepOutcome ────────────────────────────────────────────────────

/// One processed crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    /// Left slot of the pair.
    pub pair: usize,
    /// Sheet that occupied the left slot before the crossing.
    pub left_id: ParticleId,
    /// Sheet that occupied the right slot before the crossing.
    pub right_id: ParticleId,
    /// Absolute crossing time in characteristic units.
    pub time: f64,
}

/// What a single [`SheetEngine::step`] did.
#[derive(Debug)]
pub enum StepOutcome {
    /// The run started; carries the initial snapshot.
    Started {
        /// State at time 0.
        snapshot: Arc<Snapshot>,
        /// Delivery outcome.
        report: DispatchReport,
    },
    /// A pair crossed.
    Collision(CollisionEvent),
    /// A reporting boundary was reached.
    Resynchronized {
        /// State at the boundary.
        snapshot: Arc<Snapshot>,
        /// Delivery outcome.
        report: DispatchReport,
    },
    /// The configured duration has been covered.
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Done,
    Failed,
}

// ── EngineBuilder ──────────────────────────────────────────────────

/// Builder for [`SheetEngine`].
pub struct EngineBuilder {
    config: SimConfig,
    diagnostics: Arc<dyn DiagnosticsSink>,
    order: Arc<dyn ParticleOrder>,
    observers: Vec<Box<dyn Observer>>,
    particles: Option<Vec<Particle>>,
}

impl EngineBuilder {
    /// Diagnostics destination (default: [`LogSink`]).
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Slot ordering policy (default: [`PhaseSpaceOrder`]).
    pub fn order(mut self, order: Arc<dyn ParticleOrder>) -> Self {
        self.order = order;
        self
    }

    /// Register an observer; delivery follows registration order.
    pub fn observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Use these sheets verbatim instead of generating an ensemble.
    ///
    /// They are sorted but not canonicalized. Ids must be exactly
    /// `0..particle_count`.
    pub fn particles(mut self, particles: Vec<Particle>) -> Self {
        self.particles = Some(particles);
        self
    }

    /// Validate the configuration, produce the initial ensemble, and
    /// build the engine.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validation or generation. Nothing is
    /// generated when validation fails.
    pub fn build(self) -> Result<SheetEngine, ConfigError> {
        self.config.validate()?;

        let mut slots = match self.particles {
            Some(mut particles) => {
                check_supplied(&self.config, &particles)?;
                sort_by_order(&mut particles, self.order.as_ref());
                particles
            }
            None => {
                self.config
                    .generator(Arc::clone(&self.order))?
                    .generate()?
                    .particles
            }
        };
        let energy = compute_energy(&mut slots);

        let mut observers = ObserverSet::new();
        for observer in self.observers {
            observers.insert(observer);
        }

        let n = slots.len();
        Ok(SheetEngine {
            field: AccelerationField::new(n),
            schedule: EventSchedule::new(n),
            system_interval: self.config.system_interval(),
            interval_count: self.config.interval_count(),
            config: self.config,
            slots,
            order: self.order,
            observers,
            diagnostics: self.diagnostics,
            phase: Phase::Pending,
            interval: IntervalId(0),
            initial_energy: energy,
            energy,
            metrics: RunMetrics::default(),
            started_at: None,
        })
    }
}

fn check_supplied(config: &SimConfig, particles: &[Particle]) -> Result<(), ConfigError> {
    if particles.len() != config.particle_count {
        return Err(ConfigError::ParticleCountMismatch {
            configured: config.particle_count,
            supplied: particles.len(),
        });
    }
    let mut seen = vec![false; particles.len()];
    for p in particles {
        let index = p.id().index();
        if index >= seen.len() {
            return Err(ConfigError::InvalidParticleIds {
                reason: format!("id {} is out of range 0..{}", p.id(), seen.len()),
            });
        }
        if std::mem::replace(&mut seen[index], true) {
            return Err(ConfigError::InvalidParticleIds {
                reason: format!("id {} appears more than once", p.id()),
            });
        }
        if !p.is_finite() {
            return Err(ConfigError::NonFiniteState { id: p.id() });
        }
    }
    Ok(())
}

// ── SheetEngine ────────────────────────────────────────────────────

/// Single-threaded event-driven simulator for N gravitating sheets.
///
/// # Example
///
/// ```
/// use sheetsim_engine::{SheetEngine, SimConfig};
/// use sheetsim_gen::Distribution;
///
/// let config = SimConfig::new(16, 0.25, 1.0, Distribution::waterbag());
/// let mut engine = SheetEngine::builder(config).build().unwrap();
/// let summary = engine.run().unwrap();
/// assert!((summary.final_energy - 0.75).abs() < 1e-6);
/// ```
pub struct SheetEngine {
    config: SimConfig,
    slots: Vec<Particle>,
    field: AccelerationField,
    schedule: EventSchedule,
    order: Arc<dyn ParticleOrder>,
    observers: ObserverSet,
    diagnostics: Arc<dyn DiagnosticsSink>,
    phase: Phase,
    interval: IntervalId,
    interval_count: u64,
    system_interval: f64,
    initial_energy: EnsembleEnergy,
    energy: EnsembleEnergy,
    metrics: RunMetrics,
    started_at: Option<Instant>,
}

impl SheetEngine {
    /// Start configuring an engine.
    pub fn builder(config: SimConfig) -> EngineBuilder {
        EngineBuilder {
            config,
            diagnostics: Arc::new(LogSink),
            order: Arc::new(PhaseSpaceOrder),
            observers: Vec::new(),
            particles: None,
        }
    }

    /// Run until the configured duration is covered.
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        while !matches!(self.step()?, StepOutcome::Done) {}
        Ok(self.summary())
    }

    /// Advance by one event.
    ///
    /// # Errors
    ///
    /// [`RunError::Solver`] on an invariant violation, then
    /// [`RunError::Halted`] on every later call.
    pub fn step(&mut self) -> Result<StepOutcome, RunError> {
        match self.phase {
            Phase::Failed => Err(RunError::Halted),
            Phase::Done => Ok(StepOutcome::Done),
            Phase::Pending => self.start(),
            Phase::Running => match self.schedule.next_event() {
                Some((pair, t)) if t <= self.system_interval => self.collide(pair, t),
                _ => Ok(self.resync()),
            },
        }
    }

    fn start(&mut self) -> Result<StepOutcome, RunError> {
        self.started_at = Some(Instant::now());
        self.phase = Phase::Running;
        self.diagnostics.record(
            Level::Info,
            format_args!(
                "starting run: {} sheets, duration {}, interval {}, energy {:.12}, virial {:.6}",
                self.slots.len(),
                self.config.duration,
                self.config.interval,
                self.energy.total(),
                self.energy.virial_ratio()
            ),
        );
        for pair in 0..self.schedule.pair_count() {
            self.refresh_pair(pair)?;
        }
        let (snapshot, report) = self.publish();
        Ok(StepOutcome::Started { snapshot, report })
    }

    fn collide(&mut self, pair: usize, t: f64) -> Result<StepOutcome, RunError> {
        let (left, right) = (pair, pair + 1);
        for slot in [left, right] {
            let dt = t - self.schedule.particle_time(slot);
            self.slots[slot].advance(dt, self.field.at(slot));
            self.schedule.set_particle_time(slot, t);
        }

        let event = CollisionEvent {
            pair,
            left_id: self.slots[left].id(),
            right_id: self.slots[right].id(),
            time: self.simulation_time() + t / CHARACTERISTIC_TIME,
        };

        // The sheet entering the left slot must not sit right of its
        // neighbour, whatever rounding said about the crossing point.
        if self.slots[left].x < self.slots[right].x {
            let x = self.slots[left].x;
            self.slots[left].x = self.slots[right].x;
            self.slots[right].x = x;
        }
        self.slots.swap(left, right);
        self.metrics.collisions += 1;

        for p in invalidated_pairs(pair, self.schedule.pair_count()) {
            self.refresh_pair(p)?;
        }
        Ok(StepOutcome::Collision(event))
    }

    fn resync(&mut self) -> StepOutcome {
        for slot in 0..self.slots.len() {
            let dt = self.system_interval - self.schedule.particle_time(slot);
            self.slots[slot].advance(dt, self.field.at(slot));
        }
        self.schedule.rebase(self.system_interval);
        self.interval = self.interval.next();
        self.metrics.resyncs += 1;

        self.energy = compute_energy(&mut self.slots);
        let drift = (self.energy.total() - self.initial_energy.total()).abs();
        self.metrics.record_drift(drift);
        self.diagnostics.record(
            Level::Debug,
            format_args!(
                "interval {} at t={:.6}: energy {:.12} (drift {:.3e}), virial {:.6}",
                self.interval,
                self.simulation_time(),
                self.energy.total(),
                drift,
                self.energy.virial_ratio()
            ),
        );

        let (snapshot, report) = self.publish();
        if self.interval.0 >= self.interval_count {
            self.finish();
        }
        StepOutcome::Resynchronized { snapshot, report }
    }

    fn publish(&mut self) -> (Arc<Snapshot>, DispatchReport) {
        let snapshot = Arc::new(Snapshot::capture(
            self.interval,
            self.simulation_time(),
            &self.slots,
            self.energy,
        ));
        let report = self
            .observers
            .dispatch(&snapshot, self.diagnostics.as_ref());
        self.metrics.observer_failures += report.failures.len() as u64;
        (snapshot, report)
    }

    fn finish(&mut self) {
        self.phase = Phase::Done;
        if let Some(start) = self.started_at {
            self.metrics.wall_time_us = start.elapsed().as_micros() as u64;
        }
        let summary = self.summary();
        let panics = self
            .observers
            .finish(&summary, self.diagnostics.as_ref());
        self.metrics.observer_failures += panics as u64;
        self.diagnostics.record(
            Level::Info,
            format_args!(
                "run complete: t={}, {} collisions, {} resyncs, final energy {:.12}, virial {:.6} -> {:.6}, max drift {:.3e}",
                summary.duration,
                self.metrics.collisions,
                self.metrics.resyncs,
                summary.final_energy,
                summary.initial_virial_ratio,
                summary.final_virial_ratio,
                self.metrics.max_energy_drift
            ),
        );
    }

    fn refresh_pair(&mut self, pair: usize) -> Result<(), RunError> {
        let (base, left_offset, right_offset) = self.schedule.pair_frame(pair);
        let left = self.side(pair, left_offset);
        let right = self.side(pair + 1, right_offset);
        if is_degenerate(&left, &right) {
            self.metrics.degenerate_pairs += 1;
        }
        match solve(left, right) {
            Ok(crossing) => {
                self.schedule.set_pair(pair, base, crossing.time());
                Ok(())
            }
            Err(source) => Err(self.fail(pair, source)),
        }
    }

    fn side(&self, slot: usize, offset: f64) -> PairSide {
        let p = &self.slots[slot];
        PairSide {
            x: p.x,
            v: p.v,
            accel: self.field.at(slot),
            offset,
        }
    }

    fn fail(&mut self, pair: usize, source: SolverError) -> RunError {
        self.phase = Phase::Failed;
        let sink = self.diagnostics.as_ref();
        let (left, right) = source.sides();
        sink.record(
            Level::Error,
            format_args!("solver invariant violated on pair {pair}: {source}"),
        );
        sink.record(
            Level::Error,
            format_args!("  left  slot {pair} (sheet {}): {left}", self.slots[pair].id()),
        );
        sink.record(
            Level::Error,
            format_args!(
                "  right slot {} (sheet {}): {right}",
                pair + 1,
                self.slots[pair + 1].id()
            ),
        );
        sink.record(
            Level::Error,
            format_args!(
                "terminating run in interval {} (t={})",
                self.interval,
                self.simulation_time()
            ),
        );
        RunError::Solver {
            pair,
            simulation_time: self.simulation_time(),
            source,
        }
    }

    // ── Observers ──────────────────────────────────────────────────

    /// Register an observer for all later boundaries.
    pub fn add_observer(&mut self, observer: Box<dyn Observer>) -> ObserverId {
        self.observers.insert(observer)
    }

    /// Unregister an observer.
    pub fn remove_observer(&mut self, id: ObserverId) -> Option<Box<dyn Observer>> {
        self.observers.remove(id)
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Final figures; meaningful once [`is_done`](Self::is_done).
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            particle_count: self.slots.len(),
            duration: self.simulation_time(),
            final_energy: self.energy.total(),
            initial_virial_ratio: self.initial_energy.virial_ratio(),
            final_virial_ratio: self.energy.virial_ratio(),
            interval: self.config.interval,
        }
    }

    /// Time of the most recent boundary in characteristic units.
    pub fn simulation_time(&self) -> f64 {
        self.interval.0 as f64 * self.config.interval
    }

    /// Index of the most recent boundary.
    pub fn interval(&self) -> IntervalId {
        self.interval
    }

    /// Sheets in slot order. Between boundaries each is at its own
    /// local time.
    pub fn particles(&self) -> &[Particle] {
        &self.slots
    }

    /// Whether the slot array satisfies the ordering policy.
    pub fn is_sorted(&self) -> bool {
        is_sorted_by(&self.slots, self.order.as_ref())
    }

    /// The acceleration table.
    pub fn field(&self) -> &AccelerationField {
        &self.field
    }

    /// The pair schedule.
    pub fn schedule(&self) -> &EventSchedule {
        &self.schedule
    }

    /// Energy at the most recent boundary.
    pub fn energy(&self) -> EnsembleEnergy {
        self.energy
    }

    /// Energy of the initial ensemble.
    pub fn initial_energy(&self) -> EnsembleEnergy {
        self.initial_energy
    }

    /// Counters so far.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// The validated configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Whether the configured duration has been covered.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Whether a solver failure stopped the run.
    pub fn is_failed(&self) -> bool {
        self.phase == Phase::Failed
    }
}

impl fmt::Debug for SheetEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetEngine")
            .field("particle_count", &self.slots.len())
            .field("phase", &self.phase)
            .field("interval", &self.interval)
            .field("interval_count", &self.interval_count)
            .field("observers", &self.observers)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsim_gen::Distribution;

    fn pair_config() -> SimConfig {
        SimConfig::new(2, 1.0, 1.0, Distribution::waterbag())
    }

    #[test]
    fn first_step_starts_at_time_zero() {
        let mut engine = SheetEngine::builder(pair_config()).build().unwrap();
        match engine.step().unwrap() {
            StepOutcome::Started { snapshot, report } => {
                assert_eq!(snapshot.interval, IntervalId(0));
                assert_eq!(snapshot.simulation_time, 0.0);
                assert!(report.is_clean());
            }
            other => panic!("expected Started, got {other:?}"),
        }
    }

    #[test]
    fn two_sheets_at_rest_cross_at_the_origin() {
        let particles = vec![
            Particle::new(ParticleId(0), -1.0, 0.0),
            Particle::new(ParticleId(1), 1.0, 0.0),
        ];
        let mut config = pair_config();
        config.interval = 1.0;
        let mut engine = SheetEngine::builder(config)
            .particles(particles)
            .build()
            .unwrap();
        engine.step().unwrap();
        // Relative acceleration 1 closes a gap of 2 in t = 2.
        match engine.step().unwrap() {
            StepOutcome::Collision(event) => {
                assert_eq!(event.pair, 0);
                assert_eq!(event.left_id, ParticleId(0));
                assert_eq!(event.right_id, ParticleId(1));
                assert!((event.time - 2.0 / CHARACTERISTIC_TIME).abs() < 1e-15);
            }
            other => panic!("expected Collision, got {other:?}"),
        }
        assert_eq!(engine.particles()[0].id(), ParticleId(1));
        assert!(engine.particles()[0].x <= engine.particles()[1].x);
        assert_eq!(engine.metrics().collisions, 1);
        // Adjacent slots always differ in acceleration.
        assert_eq!(engine.metrics().degenerate_pairs, 0);
    }

    #[test]
    fn single_sheet_only_resyncs() {
        let mut config = pair_config();
        config.particle_count = 1;
        config.interval = 0.5;
        let mut engine = SheetEngine::builder(config)
            .particles(vec![Particle::new(ParticleId(0), 0.0, 0.0)])
            .build()
            .unwrap();
        let summary = engine.run().unwrap();
        assert_eq!(engine.metrics().collisions, 0);
        assert_eq!(engine.metrics().resyncs, 2);
        assert_eq!(summary.duration, 1.0);
    }

    #[test]
    fn supplied_particles_are_checked() {
        let dup = vec![
            Particle::new(ParticleId(0), -1.0, 0.0),
            Particle::new(ParticleId(0), 1.0, 0.0),
        ];
        assert!(matches!(
            SheetEngine::builder(pair_config()).particles(dup).build(),
            Err(ConfigError::InvalidParticleIds { .. })
        ));

        let short = vec![Particle::new(ParticleId(0), 0.0, 0.0)];
        assert!(matches!(
            SheetEngine::builder(pair_config()).particles(short).build(),
            Err(ConfigError::ParticleCountMismatch {
                configured: 2,
                supplied: 1
            })
        ));

        let nan = vec![
            Particle::new(ParticleId(0), f64::NAN, 0.0),
            Particle::new(ParticleId(1), 1.0, 0.0),
        ];
        assert!(matches!(
            SheetEngine::builder(pair_config()).particles(nan).build(),
            Err(ConfigError::NonFiniteState { id: ParticleId(0) })
        ));
    }

    #[test]
    fn supplied_particles_are_sorted() {
        let particles = vec![
            Particle::new(ParticleId(0), 1.0, 0.0),
            Particle::new(ParticleId(1), -1.0, 0.0),
        ];
        let engine = SheetEngine::builder(pair_config())
            .particles(particles)
            .build()
            .unwrap();
        assert!(engine.is_sorted());
        assert_eq!(engine.particles()[0].id(), ParticleId(1));
    }

    #[test]
    fn run_error_chains_solver_source() {
        let side = PairSide {
            x: 0.0,
            v: 0.0,
            accel: 0.0,
            offset: 0.0,
        };
        let err = RunError::Solver {
            pair: 3,
            simulation_time: 0.5,
            source: SolverError::NonFiniteCrossingTime {
                left: side,
                right: side,
            },
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("pair 3"));
        assert!(RunError::Halted.source().is_none());
    }
}
