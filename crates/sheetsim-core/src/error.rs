//! Error types for the sheetsim workspace.
//!
//! Organized by subsystem: configuration (raised before any simulation
//! work), the collision solver (fail-stop during a run), and observers
//! (isolated from the engine).

use std::error::Error;
use std::fmt;

use crate::id::ParticleId;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a configuration or generating the
/// initial ensemble.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Particle count is zero or does not fit a `u32` id.
    InvalidParticleCount,
    /// Simulated duration is NaN, infinite, zero, or negative.
    InvalidDuration {
        /// The invalid value.
        value: f64,
    },
    /// Reporting interval is NaN, infinite, zero, or negative.
    InvalidInterval {
        /// The invalid value.
        value: f64,
    },
    /// Desired virial ratio is NaN, infinite, zero, or negative.
    InvalidVirialRatio {
        /// The invalid value.
        value: f64,
    },
    /// The distribution variant is declared but not implemented.
    UnsupportedDistribution {
        /// Name of the rejected variant.
        name: &'static str,
    },
    /// A distribution parameter is out of range.
    InvalidDistribution {
        /// Description of the problem.
        reason: String,
    },
    /// The ensemble has no energy to normalize (e.g. a single sheet).
    DegenerateEnsemble {
        /// Total energy before scaling.
        energy: f64,
    },
    /// Resampling never landed within the requested virial tolerance.
    VirialToleranceNotMet {
        /// Requested virial ratio.
        target: f64,
        /// Closest virial ratio sampled.
        best: f64,
        /// Number of sampling attempts made.
        attempts: u32,
    },
    /// Supplied particles disagree with the configured count.
    ParticleCountMismatch {
        /// Configured particle count.
        configured: usize,
        /// Number of particles supplied.
        supplied: usize,
    },
    /// Supplied particle ids are not exactly `0..N`.
    InvalidParticleIds {
        /// Description of the problem.
        reason: String,
    },
    /// A sheet has a NaN or infinite position or velocity.
    NonFiniteState {
        /// The offending sheet.
        id: ParticleId,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParticleCount => {
                write!(f, "particle count must be between 1 and {}", u32::MAX)
            }
            Self::InvalidDuration { value } => {
                write!(f, "duration must be finite and positive, got {value}")
            }
            Self::InvalidInterval { value } => {
                write!(f, "reporting interval must be finite and positive, got {value}")
            }
            Self::InvalidVirialRatio { value } => {
                write!(f, "virial ratio must be finite and positive, got {value}")
            }
            Self::UnsupportedDistribution { name } => {
                write!(f, "distribution '{name}' is not implemented")
            }
            Self::InvalidDistribution { reason } => write!(f, "invalid distribution: {reason}"),
            Self::DegenerateEnsemble { energy } => {
                write!(f, "ensemble energy {energy} cannot be normalized")
            }
            Self::VirialToleranceNotMet {
                target,
                best,
                attempts,
            } => write!(
                f,
                "no sample within tolerance of virial ratio {target} after {attempts} attempts (best {best})"
            ),
            Self::ParticleCountMismatch {
                configured,
                supplied,
            } => write!(
                f,
                "configured {configured} particles but {supplied} were supplied"
            ),
            Self::InvalidParticleIds { reason } => write!(f, "invalid particle ids: {reason}"),
            Self::NonFiniteState { id } => {
                write!(f, "particle {id} has a non-finite position or velocity")
            }
        }
    }
}

impl Error for ConfigError {}

// ── SolverError ────────────────────────────────────────────────────

/// Local kinematic state of one side of an adjacent pair.
///
/// `offset` is how far the sheet is projected forward before the pair is
/// compared in a common time frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairSide {
    /// Position at the sheet's own local time.
    pub x: f64,
    /// Velocity at the sheet's own local time.
    pub v: f64,
    /// Acceleration of the slot the sheet occupies.
    pub accel: f64,
    /// Forward projection applied before solving.
    pub offset: f64,
}

impl fmt::Display for PairSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={:e} v={:e} a={:e} offset={:e}",
            self.x, self.v, self.accel, self.offset
        )
    }
}

/// Collision solver invariant violations.
///
/// Never retried: once raised, subsequent events would be causally
/// meaningless.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverError {
    /// The forward root of a non-degenerate pair is negative.
    NegativeCrossingTime {
        /// The computed crossing time.
        time: f64,
        /// Left sheet state.
        left: PairSide,
        /// Right sheet state.
        right: PairSide,
    },
    /// The crossing time evaluated to NaN.
    NonFiniteCrossingTime {
        /// Left sheet state.
        left: PairSide,
        /// Right sheet state.
        right: PairSide,
    },
    /// A non-degenerate pair has no real crossing time. Only possible
    /// when the left sheet already lies right of the right sheet.
    NoForwardRoot {
        /// Left sheet state.
        left: PairSide,
        /// Right sheet state.
        right: PairSide,
    },
}

impl SolverError {
    /// The two sides involved, left first.
    pub fn sides(&self) -> (PairSide, PairSide) {
        match self {
            Self::NegativeCrossingTime { left, right, .. }
            | Self::NonFiniteCrossingTime { left, right }
            | Self::NoForwardRoot { left, right } => (*left, *right),
        }
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeCrossingTime { time, left, right } => write!(
                f,
                "negative crossing time {time:e} (left: {left}; right: {right})"
            ),
            Self::NonFiniteCrossingTime { left, right } => write!(
                f,
                "crossing time is not a number (left: {left}; right: {right})"
            ),
            Self::NoForwardRoot { left, right } => write!(
                f,
                "pair out of order with no real crossing (left: {left}; right: {right})"
            ),
        }
    }
}

impl Error for SolverError {}

// ── ObserverError ──────────────────────────────────────────────────

/// Failures reported by an observer.
///
/// The engine logs and counts these; they never abort a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObserverError {
    /// The observer could not accept the snapshot.
    Rejected {
        /// Description of the failure.
        reason: String,
    },
    /// The downstream consumer has gone away.
    Disconnected,
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { reason } => write!(f, "snapshot rejected: {reason}"),
            Self::Disconnected => write!(f, "observer disconnected"),
        }
    }
}

impl Error for ObserverError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_is_informative() {
        let e = ConfigError::UnsupportedDistribution {
            name: "heterogeneous-density",
        };
        let msg = e.to_string();
        assert!(msg.contains("heterogeneous-density"));
        assert!(msg.contains("not implemented"));
    }

    #[test]
    fn solver_error_reports_both_sides() {
        let left = PairSide {
            x: 1.0,
            v: 0.5,
            accel: 0.25,
            offset: 0.0,
        };
        let right = PairSide {
            x: 0.5,
            v: 0.25,
            accel: -0.25,
            offset: 0.125,
        };
        let e = SolverError::NegativeCrossingTime {
            time: -0.5,
            left,
            right,
        };
        assert_eq!(e.sides(), (left, right));
        let msg = e.to_string();
        assert!(msg.contains("left"));
        assert!(msg.contains("right"));
        assert!(msg.contains("offset"));
    }

    #[test]
    fn invalid_particle_count_names_bounds() {
        let msg = ConfigError::InvalidParticleCount.to_string();
        assert!(msg.contains('1'));
        assert!(msg.contains(&u32::MAX.to_string()));
    }

    #[test]
    fn no_forward_root_reports_both_sides() {
        let left = PairSide {
            x: 1e-3,
            v: 0.0,
            accel: 0.5,
            offset: 0.0,
        };
        let right = PairSide {
            x: 0.0,
            v: 0.0,
            accel: -0.5,
            offset: 0.0,
        };
        let e = SolverError::NoForwardRoot { left, right };
        assert_eq!(e.sides(), (left, right));
        assert!(e.to_string().contains("out of order"));
    }

    #[test]
    fn observer_error_display() {
        let e = ObserverError::Rejected {
            reason: "disk full".to_string(),
        };
        assert!(e.to_string().contains("disk full"));
        assert_eq!(ObserverError::Disconnected.to_string(), "observer disconnected");
    }
}
