//! Run configuration and validation.
//!
//! [`SimConfig`] is the input for constructing a
//! [`SheetEngine`](crate::SheetEngine). [`validate()`](SimConfig::validate)
//! checks every structural invariant before any particle is generated.

use std::sync::Arc;

use sheetsim_core::{ConfigError, ParticleOrder, CHARACTERISTIC_TIME};
use sheetsim_gen::generator::DEFAULT_MAX_ATTEMPTS;
use sheetsim_gen::{Distribution, Generator};

/// Default reporting interval, in characteristic time units.
pub const DEFAULT_INTERVAL: f64 = 0.05;

/// Relative slack when deciding how many intervals cover the duration.
const INTERVAL_COUNT_SLACK: f64 = 1e-9;

/// Complete configuration for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Number of sheets. Must be at least 1.
    pub particle_count: usize,
    /// Simulated duration in characteristic time units.
    pub duration: f64,
    /// Reporting interval in characteristic time units. Default: 0.05.
    pub interval: f64,
    /// Desired virial ratio `2·KE/PE`.
    pub virial_ratio: f64,
    /// Initial phase-space distribution.
    pub distribution: Distribution,
    /// Seed for the sampling RNG. Default: 0.
    pub seed: u64,
    /// Resample the waterbag until the virial ratio is within this
    /// relative tolerance. Default: off.
    pub virial_tolerance: Option<f64>,
    /// Cap on resampling attempts. Default: 1000.
    pub max_attempts: u32,
}

impl SimConfig {
    /// Configuration with default interval, seed, and resampling settings.
    pub fn new(
        particle_count: usize,
        duration: f64,
        virial_ratio: f64,
        distribution: Distribution,
    ) -> Self {
        Self {
            particle_count,
            duration,
            interval: DEFAULT_INTERVAL,
            virial_ratio,
            distribution,
            seed: 0,
            virial_tolerance: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. At least one sheet, and ids must fit in u32.
        if self.particle_count == 0 || u32::try_from(self.particle_count).is_err() {
            return Err(ConfigError::InvalidParticleCount);
        }
        // 2. Duration and interval finite and positive.
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ConfigError::InvalidDuration {
                value: self.duration,
            });
        }
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(ConfigError::InvalidInterval {
                value: self.interval,
            });
        }
        // 3. Virial ratio finite and positive.
        if !self.virial_ratio.is_finite() || self.virial_ratio <= 0.0 {
            return Err(ConfigError::InvalidVirialRatio {
                value: self.virial_ratio,
            });
        }
        // 4. Distribution implemented and well-formed.
        self.distribution.validate()?;
        // 5. Resampling settings.
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
        Ok(())
    }

    /// Reporting interval in system time units.
    pub fn system_interval(&self) -> f64 {
        self.interval * CHARACTERISTIC_TIME
    }

    /// Number of reporting intervals needed to cover the duration.
    pub fn interval_count(&self) -> u64 {
        let ratio = self.duration / self.interval;
        ((ratio * (1.0 - INTERVAL_COUNT_SLACK)).ceil() as u64).max(1)
    }

    /// A generator for this configuration's initial ensemble.
    pub fn generator(&self, order: Arc<dyn ParticleOrder>) -> Result<Generator, ConfigError> {
        Generator::builder()
            .particle_count(self.particle_count)
            .virial_ratio(self.virial_ratio)
            .distribution(self.distribution)
            .seed(self.seed)
            .virial_tolerance(self.virial_tolerance)
            .max_attempts(self.max_attempts)
            .order(order)
            .build()
    }
}
