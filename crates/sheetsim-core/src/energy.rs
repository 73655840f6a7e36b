//! Ensemble energy and virial ratio.
//!
//! With total mass 1 split evenly over N sheets and `2πG = 1`, the
//! potential of sheet `i` is `Σ_j |x_i - x_j| / N²` and its kinetic energy
//! is `v_i² / (2N)`. The ensemble potential counts each pair once, hence
//! the extra factor of one half. The computation is O(N²) and is only run
//! at initialization and at reporting boundaries.

use crate::particle::Particle;

/// Kinetic and potential energy of an ensemble.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnsembleEnergy {
    /// Total kinetic energy.
    pub kinetic: f64,
    /// Total potential energy.
    pub potential: f64,
}

impl EnsembleEnergy {
    /// Kinetic plus potential energy.
    #[inline]
    pub fn total(&self) -> f64 {
        self.kinetic + self.potential
    }

    /// `2·KE / PE`; equals 1.0 at virial equilibrium.
    ///
    /// Not finite when the potential energy is zero.
    #[inline]
    pub fn virial_ratio(&self) -> f64 {
        2.0 * self.kinetic / self.potential
    }
}

/// Compute ensemble energies and refresh every sheet's cached energies.
pub fn compute_energy(particles: &mut [Particle]) -> EnsembleEnergy {
    let n = particles.len() as f64;
    let n_squared = n * n;
    let n_doubled = 2.0 * n;

    let mut potential = 0.0;
    let mut kinetic = 0.0;
    for i in 0..particles.len() {
        let xi = particles[i].x;
        let sum: f64 = particles.iter().map(|other| (xi - other.x).abs()).sum();
        let vi = particles[i].v;
        particles[i].set_energy(sum / n_squared, vi * vi / n_doubled);
        potential += sum;
        kinetic += vi * vi;
    }

    if particles.is_empty() {
        return EnsembleEnergy::default();
    }
    EnsembleEnergy {
        kinetic: kinetic / n_doubled,
        potential: potential / (2.0 * n_squared),
    }
}
