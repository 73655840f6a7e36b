//! Sort order policy for the engine's slot array.
//!
//! The engine keeps sheets sorted by an externally supplied comparator
//! rather than by an `Ord` impl on [`Particle`], so identity and ordering
//! stay independent.

use std::cmp::Ordering;

use crate::particle::Particle;

/// A total order over sheets.
///
/// Implementations must be total for any two distinct sheets: returning
/// `Ordering::Equal` is only allowed when both arguments have the same id.
pub trait ParticleOrder: Send + Sync {
    /// Compare two sheets.
    fn compare(&self, a: &Particle, b: &Particle) -> Ordering;
}

/// Ascending position, ties broken by ascending velocity, then by id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseSpaceOrder;

impl ParticleOrder for PhaseSpaceOrder {
    fn compare(&self, a: &Particle, b: &Particle) -> Ordering {
        a.x.total_cmp(&b.x)
            .then_with(|| a.v.total_cmp(&b.v))
            .then_with(|| a.id().cmp(&b.id()))
    }
}

/// Sort `particles` in place by `order`.
pub fn sort_by_order(particles: &mut [Particle], order: &dyn ParticleOrder) {
    particles.sort_by(|a, b| order.compare(a, b));
}

/// Whether every adjacent pair is in non-descending `order`.
pub fn is_sorted_by(particles: &[Particle], order: &dyn ParticleOrder) -> bool {
    particles
        .windows(2)
        .all(|w| order.compare(&w[0], &w[1]) != Ordering::Greater)
}
