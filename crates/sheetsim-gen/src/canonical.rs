//! Centering and Rybicki scaling.
//!
//! Every sheet has mass `1/N`, so the centers of mass and momentum are
//! plain means of position and velocity.

use sheetsim_core::{compute_energy, ConfigError, EnsembleEnergy, Particle};

/// Shift the ensemble to zero center of mass and momentum.
///
/// Returns the `(center_of_mass, center_of_momentum)` that was removed.
pub fn center(particles: &mut [Particle]) -> (f64, f64) {
    if particles.is_empty() {
        return (0.0, 0.0);
    }
    let n = particles.len() as f64;
    let com = particles.iter().map(|p| p.x).sum::<f64>() / n;
    let cov = particles.iter().map(|p| p.v).sum::<f64>() / n;
    for p in particles.iter_mut() {
        p.shift(com, cov);
    }
    (com, cov)
}

/// Rybicki-scale the ensemble to the canonical total energy.
///
/// Fails with [`ConfigError::DegenerateEnsemble`] when the current energy
/// is not finite and positive.
pub fn rybicki_normalize(particles: &mut [Particle]) -> Result<EnsembleEnergy, ConfigError> {
    let initial = compute_energy(particles).total();
    if !initial.is_finite() || initial <= 0.0 {
        return Err(ConfigError::DegenerateEnsemble { energy: initial });
    }
    for p in particles.iter_mut() {
        p.rybicki_scale(initial);
    }
    Ok(compute_energy(particles))
}

/// Center, then Rybicki-scale.
pub fn canonicalize(particles: &mut [Particle]) -> Result<EnsembleEnergy, ConfigError> {
    center(particles);
    rybicki_normalize(particles)
}
