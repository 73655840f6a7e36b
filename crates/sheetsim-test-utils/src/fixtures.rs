//! Hand-built ensembles with known dynamics.
//!
//! - [`rest_pair`]: two sheets at rest, symmetric about the origin.
//! - [`degenerate_pair`]: equal velocities and accelerations, so the
//!   pair never meets.
//! - [`rest_lattice`]: `n` evenly spaced sheets at rest.

use sheetsim_core::{PairSide, Particle, ParticleId};

/// Two sheets at `±half_gap`, both at rest.
pub fn rest_pair(half_gap: f64) -> Vec<Particle> {
    vec![
        Particle::new(ParticleId(0), -half_gap, 0.0),
        Particle::new(ParticleId(1), half_gap, 0.0),
    ]
}

/// Solver inputs for two sheets with equal velocity and acceleration at
/// distinct positions.
pub fn degenerate_pair() -> (PairSide, PairSide) {
    let side = |x| PairSide {
        x,
        v: 0.25,
        accel: 0.5,
        offset: 0.0,
    };
    (side(-1.0), side(1.0))
}

/// `n` sheets at rest on a symmetric unit-spaced lattice.
pub fn rest_lattice(n: usize) -> Vec<Particle> {
    let center = (n as f64 - 1.0) / 2.0;
    (0..n)
        .map(|i| Particle::new(ParticleId(i as u32), i as f64 - center, 0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_is_centered() {
        let sheets = rest_lattice(4);
        let sum: f64 = sheets.iter().map(|p| p.x).sum();
        assert_eq!(sum, 0.0);
        assert_eq!(sheets[0].x, -1.5);
    }
}
