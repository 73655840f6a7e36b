//! End-to-end dynamics: energy conservation, ordering, causality,
//! determinism, and the two-sheet oscillation.

use std::sync::Arc;

use sheetsim_core::{Snapshot, CANONICAL_ENERGY, CHARACTERISTIC_TIME};
use sheetsim_engine::{CollisionEvent, SheetEngine, SimConfig, StepOutcome};
use sheetsim_gen::Distribution;

struct Trace {
    collisions: Vec<CollisionEvent>,
    snapshots: Vec<Arc<Snapshot>>,
    /// Every reported time, in the order events were produced.
    times: Vec<f64>,
}

fn trace(config: SimConfig) -> Trace {
    let mut engine = SheetEngine::builder(config).build().unwrap();
    let mut t = Trace {
        collisions: Vec::new(),
        snapshots: Vec::new(),
        times: Vec::new(),
    };
    loop {
        match engine.step().unwrap() {
            StepOutcome::Started { snapshot, .. } | StepOutcome::Resynchronized { snapshot, .. } => {
                t.times.push(snapshot.simulation_time);
                t.snapshots.push(snapshot);
            }
            StepOutcome::Collision(event) => {
                t.times.push(event.time);
                t.collisions.push(event);
            }
            StepOutcome::Done => break,
        }
    }
    t
}

fn waterbag(n: usize, duration: f64, seed: u64) -> SimConfig {
    let mut config = SimConfig::new(n, duration, 1.0, Distribution::waterbag());
    config.seed = seed;
    config
}

#[test]
fn energy_is_conserved_at_every_boundary() {
    let t = trace(waterbag(64, 2.0, 1));
    assert_eq!(t.snapshots.len(), 41);
    assert!(!t.collisions.is_empty());
    for snap in &t.snapshots {
        assert!(
            (snap.total_energy() - CANONICAL_ENERGY).abs() < 1e-9,
            "interval {}: energy {}",
            snap.interval,
            snap.total_energy()
        );
    }
}

#[test]
fn slots_stay_sorted_at_every_boundary() {
    let t = trace(waterbag(48, 1.5, 2));
    for snap in &t.snapshots {
        let xs: Vec<f64> = snap.positions_in_slot_order().collect();
        for w in xs.windows(2) {
            assert!(w[0] <= w[1] + 1e-12, "interval {}: {w:?}", snap.interval);
        }
    }
}

#[test]
fn events_are_causally_ordered() {
    let t = trace(waterbag(32, 2.0, 3));
    for w in t.times.windows(2) {
        assert!(w[1] >= w[0] - 1e-12, "time went backwards: {w:?}");
    }
}

#[test]
fn boundary_times_are_exact_multiples() {
    let t = trace(waterbag(8, 1.0, 4));
    for (k, snap) in t.snapshots.iter().enumerate() {
        assert_eq!(snap.interval.0, k as u64);
        assert_eq!(snap.simulation_time, k as f64 * 0.05);
    }
}

#[test]
fn identical_inputs_give_identical_runs() {
    let a = trace(waterbag(40, 1.0, 77));
    let b = trace(waterbag(40, 1.0, 77));
    assert_eq!(a.collisions, b.collisions);
    let hashes = |t: &Trace| t.snapshots.iter().map(|s| s.content_hash()).collect::<Vec<_>>();
    assert_eq!(hashes(&a), hashes(&b));

    let c = trace(waterbag(40, 1.0, 78));
    assert_ne!(hashes(&a).last(), hashes(&c).last());
}

#[test]
fn two_sheets_oscillate_with_fixed_period() {
    // Relative acceleration 1 and canonical energy 0.75 give a maximum
    // separation of 3, so each quarter period lasts sqrt(6).
    let period = 4.0 * 6.0_f64.sqrt() / CHARACTERISTIC_TIME;
    for virial in [0.5, 1.0, 2.0] {
        let mut config = SimConfig::new(2, 5.0, virial, Distribution::waterbag());
        config.seed = 9;
        let t = trace(config);
        assert!(t.collisions.len() >= 4, "only {} crossings", t.collisions.len());
        for w in t.collisions.windows(3) {
            assert!(
                (w[2].time - w[0].time - period).abs() < 1e-9,
                "virial {virial}: {} vs {period}",
                w[2].time - w[0].time
            );
        }
        // The pair swaps back and forth.
        for w in t.collisions.windows(2) {
            assert_eq!(w[0].left_id, w[1].right_id);
        }
    }
}

#[test]
fn homogeneous_run_keeps_its_energy() {
    let config = SimConfig::new(30, 1.0, 0.5, Distribution::homogeneous());
    let t = trace(config);
    let first = &t.snapshots[0];
    assert!((first.virial_ratio - 0.5).abs() < 1e-9);
    for snap in &t.snapshots {
        assert!((snap.total_energy() - CANONICAL_ENERGY).abs() < 1e-9);
    }
}

#[test]
fn summary_reports_the_run() {
    let mut engine = SheetEngine::builder(waterbag(16, 0.5, 5)).build().unwrap();
    let summary = engine.run().unwrap();
    assert!(engine.is_done());
    assert_eq!(summary.particle_count, 16);
    assert!((summary.duration - 0.5).abs() < 1e-12);
    assert_eq!(summary.interval, 0.05);
    assert!((summary.final_energy - CANONICAL_ENERGY).abs() < 1e-9);
    assert_eq!(summary.initial_virial_ratio, engine.initial_energy().virial_ratio());

    let metrics = engine.metrics();
    assert_eq!(metrics.resyncs, 10);
    assert!(metrics.max_energy_drift < 1e-9);
    assert_eq!(metrics.observer_failures, 0);

    // Further steps are no-ops.
    assert!(matches!(engine.step().unwrap(), StepOutcome::Done));
}
