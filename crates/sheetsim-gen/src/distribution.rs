//! The closed set of initial phase-space distributions.

use sheetsim_core::ConfigError;

/// Initial distribution of sheets in phase space.
///
/// Every variant is either generated or rejected by
/// [`validate`](Distribution::validate); none can reach the sampling code
/// unhandled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Distribution {
    /// Positions and velocities independently uniform over a rectangle.
    ///
    /// Velocities span `[0, velocity_range)`. Positions span
    /// `[0, velocity_range² / (2·virial))`, the large-N relation between a
    /// waterbag's extent and its virial ratio.
    RectangularWaterbag {
        /// Width of the velocity interval before canonicalization.
        velocity_range: f64,
    },
    /// Evenly spaced positions over `[-π/2, π/2]` with velocities
    /// `-sin(period · x)`, rescaled to hit the desired virial ratio exactly.
    HomogeneousDensity {
        /// Spatial frequency of the velocity profile.
        period: f64,
    },
    /// Declared but not implemented; always rejected.
    HeterogeneousDensity,
}

impl Distribution {
    /// Rectangular waterbag with unit velocity range.
    pub fn waterbag() -> Self {
        Self::RectangularWaterbag {
            velocity_range: 1.0,
        }
    }

    /// Homogeneous density with the single-period velocity profile.
    pub fn homogeneous() -> Self {
        Self::HomogeneousDensity { period: 1.0 }
    }

    /// Stable name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RectangularWaterbag { .. } => "rectangular-waterbag",
            Self::HomogeneousDensity { .. } => "homogeneous-density",
            Self::HeterogeneousDensity => "heterogeneous-density",
        }
    }

    /// Reject unimplemented variants and out-of-range parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::RectangularWaterbag { velocity_range } => {
                if !velocity_range.is_finite() || velocity_range <= 0.0 {
                    return Err(ConfigError::InvalidDistribution {
                        reason: format!(
                            "velocity_range must be finite and positive, got {velocity_range}"
                        ),
                    });
                }
                Ok(())
            }
            Self::HomogeneousDensity { period } => {
                if !period.is_finite() || period == 0.0 {
                    return Err(ConfigError::InvalidDistribution {
                        reason: format!("period must be finite and non-zero, got {period}"),
                    });
                }
                Ok(())
            }
            Self::HeterogeneousDensity => Err(ConfigError::UnsupportedDistribution {
                name: self.name(),
            }),
        }
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self::waterbag()
    }
}
