//! Immutable reporting snapshots and the end-of-run summary.
//!
//! A [`Snapshot`] is built fresh at every reporting boundary from the
//! engine's slot array. It owns all of its data, so observers may keep it
//! after the engine has moved on.

use crate::energy::EnsembleEnergy;
use crate::id::{IntervalId, ParticleId};
use crate::particle::Particle;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The reported state of one sheet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleRecord {
    /// Sheet identity.
    pub id: ParticleId,
    /// Position.
    pub x: f64,
    /// Velocity.
    pub v: f64,
    /// Potential energy.
    pub potential_energy: f64,
    /// Kinetic energy.
    pub kinetic_energy: f64,
}

impl ParticleRecord {
    /// Potential plus kinetic energy.
    pub fn total_energy(&self) -> f64 {
        self.potential_energy + self.kinetic_energy
    }
}

/// Whole-system state at a reporting boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Reporting interval this snapshot closes (0 for the initial state).
    pub interval: IntervalId,
    /// Simulation time in characteristic units.
    pub simulation_time: f64,
    /// Ensemble kinetic energy.
    pub kinetic_energy: f64,
    /// Ensemble potential energy.
    pub potential_energy: f64,
    /// `2·KE / PE`.
    pub virial_ratio: f64,
    /// Per-sheet records ordered by id.
    pub particles: Vec<ParticleRecord>,
    /// Sheet ids in slot (position rank) order.
    pub slot_order: Vec<ParticleId>,
}

impl Snapshot {
    /// Copy the state of a slot-ordered ensemble.
    ///
    /// Records are sorted by id. Ids need not be dense; the engine always
    /// supplies `0..N`.
    pub fn capture(
        interval: IntervalId,
        simulation_time: f64,
        slots: &[Particle],
        energy: EnsembleEnergy,
    ) -> Self {
        let mut particles: Vec<ParticleRecord> = slots
            .iter()
            .map(|p| ParticleRecord {
                id: p.id(),
                x: p.x,
                v: p.v,
                potential_energy: p.potential_energy(),
                kinetic_energy: p.kinetic_energy(),
            })
            .collect();
        particles.sort_by_key(|r| r.id);
        let slot_order = slots.iter().map(Particle::id).collect();
        Self {
            interval,
            simulation_time,
            kinetic_energy: energy.kinetic,
            potential_energy: energy.potential,
            virial_ratio: energy.virial_ratio(),
            particles,
            slot_order,
        }
    }

    /// Number of sheets.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the snapshot holds no sheets.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Ensemble kinetic plus potential energy.
    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy + self.potential_energy
    }

    /// Record for a given sheet.
    pub fn record(&self, id: ParticleId) -> Option<&ParticleRecord> {
        self.particles
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|i| &self.particles[i])
    }

    /// Positions in slot order; non-decreasing while the sort invariant holds.
    pub fn positions_in_slot_order(&self) -> impl Iterator<Item = f64> + '_ {
        self.slot_order
            .iter()
            .filter_map(|&id| self.record(id).map(|r| r.x))
    }

    /// Center of mass (mean position).
    pub fn center_of_mass(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(|p| p.x).sum::<f64>() / self.particles.len() as f64
    }

    /// Center of momentum (mean velocity).
    pub fn center_of_momentum(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(|p| p.v).sum::<f64>() / self.particles.len() as f64
    }

    /// Deterministic FNV-1a hash over every reported value's bit pattern.
    ///
    /// Equal hashes across two runs mean bit-identical snapshots, up to
    /// hash collisions. Not cryptographically secure.
    pub fn content_hash(&self) -> u64 {
        let mut hash = FNV_OFFSET;
        hash = fnv1a_u64(hash, self.interval.0);
        hash = fnv1a_u64(hash, self.simulation_time.to_bits());
        hash = fnv1a_u64(hash, self.kinetic_energy.to_bits());
        hash = fnv1a_u64(hash, self.potential_energy.to_bits());
        for r in &self.particles {
            hash = fnv1a_u64(hash, u64::from(r.id.0));
            hash = fnv1a_u64(hash, r.x.to_bits());
            hash = fnv1a_u64(hash, r.v.to_bits());
            hash = fnv1a_u64(hash, r.potential_energy.to_bits());
            hash = fnv1a_u64(hash, r.kinetic_energy.to_bits());
        }
        for id in &self.slot_order {
            hash = fnv1a_u64(hash, u64::from(id.0));
        }
        hash
    }
}

/// Final figures available once a run terminates.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Number of sheets.
    pub particle_count: usize,
    /// Simulated duration in characteristic units.
    pub duration: f64,
    /// Total energy at the last reporting boundary.
    pub final_energy: f64,
    /// Virial ratio after canonicalization.
    pub initial_virial_ratio: f64,
    /// Virial ratio at the last reporting boundary.
    pub final_virial_ratio: f64,
    /// Reporting interval length in characteristic units.
    pub interval: f64,
}
