//! Seeded ensemble generator.
//!
//! Constructed via the builder pattern: [`Generator::builder`].

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sheetsim_core::{
    compute_energy, sort_by_order, ConfigError, EnsembleEnergy, Particle, ParticleId,
    ParticleOrder, PhaseSpaceOrder,
};

use crate::canonical::{canonicalize, center, rybicki_normalize};
use crate::distribution::Distribution;

/// Default cap on waterbag resampling when a virial tolerance is set.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// A canonicalized, sorted initial ensemble.
#[derive(Clone, Debug, PartialEq)]
pub struct Ensemble {
    /// Sheets in slot order, ids dense `0..N`.
    pub particles: Vec<Particle>,
    /// Ensemble energy after canonicalization.
    pub energy: EnsembleEnergy,
    /// Sampling attempts used (1 unless resampling was requested).
    pub attempts: u32,
}

impl Ensemble {
    /// Number of sheets.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the ensemble has no sheets.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Achieved virial ratio.
    pub fn virial_ratio(&self) -> f64 {
        self.energy.virial_ratio()
    }
}

/// Produces initial ensembles for a fixed set of parameters.
///
/// The RNG is seeded from `seed` on every call to
/// [`generate`](Generator::generate), so repeated calls return identical
/// ensembles.
pub struct Generator {
    particle_count: usize,
    virial_ratio: f64,
    distribution: Distribution,
    seed: u64,
    virial_tolerance: Option<f64>,
    max_attempts: u32,
    order: Arc<dyn ParticleOrder>,
}

/// Builder for [`Generator`].
///
/// Required field: `particle_count`.
pub struct GeneratorBuilder {
    particle_count: Option<usize>,
    virial_ratio: f64,
    distribution: Distribution,
    seed: u64,
    virial_tolerance: Option<f64>,
    max_attempts: u32,
    order: Arc<dyn ParticleOrder>,
}

impl Generator {
    /// Create a new builder.
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder {
            particle_count: None,
            virial_ratio: 1.0,
            distribution: Distribution::default(),
            seed: 0,
            virial_tolerance: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            order: Arc::new(PhaseSpaceOrder),
        }
    }

    /// Number of sheets generated.
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    /// Requested virial ratio.
    pub fn virial_ratio(&self) -> f64 {
        self.virial_ratio
    }

    /// Configured distribution.
    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Generate, sort, and canonicalize an ensemble.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DegenerateEnsemble`] when there is no energy to
    ///   normalize (a single sheet, or every sheet coincident and at rest).
    /// - [`ConfigError::InvalidDistribution`] when the homogeneous velocity
    ///   profile is identically zero.
    /// - [`ConfigError::VirialToleranceNotMet`] when resampling is exhausted.
    pub fn generate(&self) -> Result<Ensemble, ConfigError> {
        match self.distribution {
            Distribution::RectangularWaterbag { velocity_range } => self.waterbag(velocity_range),
            Distribution::HomogeneousDensity { period } => self.homogeneous(period),
            Distribution::HeterogeneousDensity => Err(ConfigError::UnsupportedDistribution {
                name: self.distribution.name(),
            }),
        }
    }

    fn waterbag(&self, velocity_range: f64) -> Result<Ensemble, ConfigError> {
        let position_range = velocity_range * velocity_range / (2.0 * self.virial_ratio);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut best: Option<Ensemble> = None;

        for attempt in 1..=self.max_attempts {
            let mut particles: Vec<Particle> = (0..self.particle_count)
                .map(|i| {
                    let x = rng.random::<f64>() * position_range;
                    let v = rng.random::<f64>() * velocity_range;
                    Particle::new(ParticleId(i as u32), x, v)
                })
                .collect();
            sort_by_order(&mut particles, self.order.as_ref());
            let energy = canonicalize(&mut particles)?;
            let ensemble = Ensemble {
                particles,
                energy,
                attempts: attempt,
            };

            let Some(tolerance) = self.virial_tolerance else {
                return Ok(ensemble);
            };
            let error = self.relative_virial_error(&ensemble);
            if error <= tolerance {
                return Ok(ensemble);
            }
            let improves = best
                .as_ref()
                .is_none_or(|b| error < self.relative_virial_error(b));
            if improves {
                best = Some(ensemble);
            }
        }

        Err(ConfigError::VirialToleranceNotMet {
            target: self.virial_ratio,
            best: best.map_or(f64::NAN, |b| b.virial_ratio()),
            attempts: self.max_attempts,
        })
    }

    fn homogeneous(&self, period: f64) -> Result<Ensemble, ConfigError> {
        let n = self.particle_count;
        let step = 2.0 * FRAC_PI_2 / n as f64;
        let start = -FRAC_PI_2 + step / 2.0;

        let mut particles: Vec<Particle> = (0..n)
            .map(|i| {
                let x = start + i as f64 * step;
                Particle::new(ParticleId(i as u32), x, -(period * x).sin())
            })
            .collect();
        sort_by_order(&mut particles, self.order.as_ref());
        center(&mut particles);

        let raw = compute_energy(&mut particles);
        if raw.potential <= 0.0 {
            return Err(ConfigError::DegenerateEnsemble {
                energy: raw.total(),
            });
        }
        if raw.kinetic <= 0.0 {
            return Err(ConfigError::InvalidDistribution {
                reason: format!("velocity profile with period {period} is identically zero"),
            });
        }
        let factor = (self.virial_ratio / raw.virial_ratio()).sqrt();
        for p in particles.iter_mut() {
            p.v *= factor;
        }

        let energy = rybicki_normalize(&mut particles)?;
        Ok(Ensemble {
            particles,
            energy,
            attempts: 1,
        })
    }

    fn relative_virial_error(&self, ensemble: &Ensemble) -> f64 {
        ((ensemble.virial_ratio() - self.virial_ratio) / self.virial_ratio).abs()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("particle_count", &self.particle_count)
            .field("virial_ratio", &self.virial_ratio)
            .field("distribution", &self.distribution)
            .field("seed", &self.seed)
            .field("virial_tolerance", &self.virial_tolerance)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl GeneratorBuilder {
    /// Set the number of sheets (required, at least 1).
    pub fn particle_count(mut self, n: usize) -> Self {
        self.particle_count = Some(n);
        self
    }

    /// Set the desired virial ratio (default: 1.0).
    pub fn virial_ratio(mut self, ratio: f64) -> Self {
        self.virial_ratio = ratio;
        self
    }

    /// Set the distribution (default: unit waterbag).
    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Set the RNG seed (default: 0).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Resample the waterbag until the achieved virial ratio is within
    /// this relative tolerance of the target (default: off).
    pub fn virial_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.virial_tolerance = tolerance;
        self
    }

    /// Cap on resampling attempts (default: [`DEFAULT_MAX_ATTEMPTS`]).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Ordering used to sort the generated sheets (default:
    /// [`PhaseSpaceOrder`]).
    pub fn order(mut self, order: Arc<dyn ParticleOrder>) -> Self {
        self.order = order;
        self
    }

    /// Build the generator, validating all parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `particle_count` is unset, zero, or does not fit a [`ParticleId`]
    /// - `virial_ratio` is not finite and positive
    /// - the distribution is unsupported or has bad parameters
    /// - `virial_tolerance` is not finite and positive, or `max_attempts`
    ///   is zero
    pub fn build(self) -> Result<Generator, ConfigError> {
        let particle_count = match self.particle_count {
            Some(n) if n > 0 && u32::try_from(n).is_ok() => n,
            _ => return Err(ConfigError::InvalidParticleCount),
        };
        if !self.virial_ratio.is_finite() || self.virial_ratio <= 0.0 {
            return Err(ConfigError::InvalidVirialRatio {
                value: self.virial_ratio,
            });
        }
        self.distribution.validate()?;
        if let Some(tol) = self.virial_tolerance {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(ConfigError::InvalidDistribution {
                    reason: format!("virial tolerance must be finite and positive, got {tol}"),
                });
            }
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidDistribution {
                reason: "max_attempts must be at least 1".to_string(),
            });
        }

        Ok(Generator {
            particle_count,
            virial_ratio: self.virial_ratio,
            distribution: self.distribution,
            seed: self.seed,
            virial_tolerance: self.virial_tolerance,
            max_attempts: self.max_attempts,
            order: self.order,
        })
    }
}
