//! The sheet: identity, phase-space state, and cached energies.

use std::hash::{Hash, Hasher};

use crate::id::ParticleId;

/// One infinite mass sheet.
///
/// Equality and hashing use identity only; two `Particle` values with the
/// same id are the same sheet at different moments. Sort order is not a
/// property of the type; see [`ParticleOrder`](crate::ParticleOrder).
#[derive(Clone, Debug)]
pub struct Particle {
    id: ParticleId,
    /// Position.
    pub x: f64,
    /// Velocity.
    pub v: f64,
    potential_energy: f64,
    kinetic_energy: f64,
    elapsed: f64,
}

impl Particle {
    /// Create a sheet at rest in time with zeroed energy caches.
    pub fn new(id: ParticleId, x: f64, v: f64) -> Self {
        Self {
            id,
            x,
            v,
            potential_energy: 0.0,
            kinetic_energy: 0.0,
            elapsed: 0.0,
        }
    }

    /// Stable identity.
    #[inline]
    pub fn id(&self) -> ParticleId {
        self.id
    }

    /// Cached potential energy from the last energy computation.
    #[inline]
    pub fn potential_energy(&self) -> f64 {
        self.potential_energy
    }

    /// Cached kinetic energy from the last energy computation.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        self.kinetic_energy
    }

    /// Sum of the cached energies.
    #[inline]
    pub fn total_energy(&self) -> f64 {
        self.potential_energy + self.kinetic_energy
    }

    /// Total system time this sheet has been advanced through.
    ///
    /// Never decreases and is not reset at reporting boundaries.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Whether position and velocity are both finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.v.is_finite()
    }

    /// Store energies computed for the current configuration.
    pub fn set_energy(&mut self, potential: f64, kinetic: f64) {
        self.potential_energy = potential;
        self.kinetic_energy = kinetic;
    }

    /// Advance by `dt` under constant acceleration `accel`.
    pub fn advance(&mut self, dt: f64, accel: f64) {
        self.x += self.v * dt + 0.5 * accel * dt * dt;
        self.v += accel * dt;
        self.elapsed += dt;
    }

    /// Subtract a center of mass and a center of momentum.
    pub fn shift(&mut self, position: f64, velocity: f64) {
        self.x -= position;
        self.v -= velocity;
    }

    /// Apply Rybicki scaling for an ensemble of total energy `energy`.
    ///
    /// `v' = (v / 2) sqrt(3 / E)`, `x' = 3x / (4E)`.
    pub fn rybicki_scale(&mut self, energy: f64) {
        self.v = (self.v / 2.0) * (3.0 / energy).sqrt();
        self.x = 3.0 * self.x / (4.0 * energy);
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Particle {}

impl Hash for Particle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_identity() {
        let a = Particle::new(ParticleId(1), 0.0, 0.0);
        let b = Particle::new(ParticleId(1), 5.0, -2.0);
        let c = Particle::new(ParticleId(2), 0.0, 0.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn advance_follows_constant_acceleration() {
        let mut p = Particle::new(ParticleId(0), 1.0, 2.0);
        p.advance(3.0, -0.5);
        // x = 1 + 2*3 - 0.25*9, v = 2 - 1.5
        assert!((p.x - 4.75).abs() < 1e-12);
        assert!((p.v - 0.5).abs() < 1e-12);
        assert!((p.elapsed() - 3.0).abs() < 1e-12);
        p.advance(1.0, 0.0);
        assert!((p.elapsed() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn rybicki_scale_matches_formula() {
        let mut p = Particle::new(ParticleId(0), 2.0, 4.0);
        p.rybicki_scale(3.0);
        assert!((p.v - 2.0).abs() < 1e-12);
        assert!((p.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn shift_subtracts_centers() {
        let mut p = Particle::new(ParticleId(0), 2.0, 4.0);
        p.shift(0.5, -1.0);
        assert_eq!(p.x, 1.5);
        assert_eq!(p.v, 5.0);
    }

    #[test]
    fn energies_are_cached() {
        let mut p = Particle::new(ParticleId(0), 0.0, 0.0);
        p.set_energy(0.25, 0.5);
        assert_eq!(p.potential_energy(), 0.25);
        assert_eq!(p.kinetic_energy(), 0.5);
        assert_eq!(p.total_energy(), 0.75);
    }
}
