//! Analytic crossing time for an adjacent pair.
//!
//! Each side is first projected forward by its own offset so both are
//! compared in a common time frame. The relative motion is then
//!
//! ```text
//! dx + dv·t + ½·da·t² = 0,   dx = x_L - x_R,  dv = v_L - v_R,  da = a_L - a_R
//! ```
//!
//! For adjacent slots `da = 2/N > 0` and `dx <= 0`, so the larger root is
//! the forward one. It is evaluated in whichever algebraically equivalent
//! form avoids cancellation.

use sheetsim_core::{PairSide, SolverError};

/// When, if ever, an adjacent pair next crosses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Crossing {
    /// Crossing after this much time, measured from the pair's base.
    At(f64),
    /// The pair never meets.
    Never,
}

impl Crossing {
    /// Crossing time, with [`Never`](Crossing::Never) mapped to `+∞`.
    #[inline]
    pub fn time(self) -> f64 {
        match self {
            Self::At(t) => t,
            Self::Never => f64::INFINITY,
        }
    }

    /// Whether the pair never meets.
    pub fn is_never(self) -> bool {
        matches!(self, Self::Never)
    }
}

#[inline]
fn project(side: &PairSide) -> (f64, f64) {
    let o = side.offset;
    (
        side.x + side.v * o + 0.5 * side.accel * o * o,
        side.v + side.accel * o,
    )
}

/// Whether the pair has equal accelerations, so its relative motion is
/// a straight line.
#[inline]
pub fn is_degenerate(left: &PairSide, right: &PairSide) -> bool {
    left.accel == right.accel
}

/// Solve for the forward crossing time of `left` and `right`.
///
/// Equal accelerations reduce the motion to a straight line: a pair with
/// no relative velocity, or one moving apart, never meets. This is the
/// only case that yields [`Crossing::Never`].
///
/// # Errors
///
/// - [`SolverError::NonFiniteCrossingTime`] if the result is NaN.
/// - [`SolverError::NoForwardRoot`] if a pair with unequal accelerations
///   has a negative discriminant.
/// - [`SolverError::NegativeCrossingTime`] if the forward root of a
///   pair with unequal accelerations is negative.
pub fn solve(left: PairSide, right: PairSide) -> Result<Crossing, SolverError> {
    let (xl, vl) = project(&left);
    let (xr, vr) = project(&right);
    let dx = xl - xr;
    let dv = vl - vr;
    let da = left.accel - right.accel;

    if is_degenerate(&left, &right) {
        if dv == 0.0 {
            return Ok(Crossing::Never);
        }
        let t = -dx / dv;
        return match t {
            t if t.is_nan() => Err(SolverError::NonFiniteCrossingTime { left, right }),
            t if t < 0.0 => Ok(Crossing::Never),
            t => Ok(Crossing::At(t)),
        };
    }

    let disc = dv * dv - 2.0 * da * dx;
    if disc < 0.0 {
        return Err(SolverError::NoForwardRoot { left, right });
    }
    let s = disc.sqrt();
    let t = if dv > 0.0 {
        -2.0 * dx / (dv + s)
    } else {
        (s - dv) / da
    };

    if t.is_nan() {
        Err(SolverError::NonFiniteCrossingTime { left, right })
    } else if t < 0.0 {
        Err(SolverError::NegativeCrossingTime {
            time: t,
            left,
            right,
        })
    } else {
        Ok(Crossing::At(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn side(x: f64, v: f64, accel: f64, offset: f64) -> PairSide {
        PairSide {
            x,
            v,
            accel,
            offset,
        }
    }

    fn gap_at(left: PairSide, right: PairSide, t: f64) -> f64 {
        let (xl, vl) = project(&left);
        let (xr, vr) = project(&right);
        let da = left.accel - right.accel;
        (xl - xr) + (vl - vr) * t + 0.5 * da * t * t
    }

    #[test]
    fn degenerate_pair_never_collides() {
        let l = side(-1.0, 0.3, 0.25, 0.0);
        let r = side(1.0, 0.3, 0.25, 0.0);
        assert_eq!(solve(l, r), Ok(Crossing::Never));
    }

    #[test]
    fn degenerate_pair_closing_is_linear() {
        let l = side(-1.0, 0.5, 0.0, 0.0);
        let r = side(1.0, -0.5, 0.0, 0.0);
        assert_eq!(solve(l, r), Ok(Crossing::At(2.0)));
    }

    #[test]
    fn degenerate_pair_separating_never_collides() {
        let l = side(-1.0, -0.5, 0.0, 0.0);
        let r = side(1.0, 0.5, 0.0, 0.0);
        assert_eq!(solve(l, r), Ok(Crossing::Never));
    }

    #[test]
    fn two_sheets_at_rest_meet_at_sqrt_of_gap() {
        // da = 1, dx = -2: t² / 2 = 2.
        let l = side(-1.0, 0.0, 0.5, 0.0);
        let r = side(1.0, 0.0, -0.5, 0.0);
        match solve(l, r) {
            Ok(Crossing::At(t)) => assert!((t - 2.0).abs() < 1e-15),
            other => panic!("expected crossing, got {other:?}"),
        }
    }

    #[test]
    fn just_crossed_pair_returns_later() {
        // Coincident, separating at relative speed 1 against da = 1.
        let l = side(0.0, -0.5, 0.5, 0.0);
        let r = side(0.0, 0.5, -0.5, 0.0);
        assert_eq!(solve(l, r), Ok(Crossing::At(2.0)));
    }

    #[test]
    fn offsets_project_before_solving() {
        let l = side(-1.0, 0.0, 0.5, 0.0);
        let r = side(1.0, 0.0, -0.5, 0.0);
        let full = solve(l, r).unwrap().time();
        // Advancing both by 0.5 leaves 1.5 to go.
        let shifted = solve(side(-1.0, 0.0, 0.5, 0.5), side(1.0, 0.0, -0.5, 0.5))
            .unwrap()
            .time();
        assert!((full - shifted - 0.5).abs() < 1e-12);
    }

    #[test]
    fn out_of_order_pair_is_fail_stop() {
        // Already past each other and still separating.
        let l = side(1.0, 2.0, 0.5, 0.0);
        let r = side(0.0, 0.0, -0.5, 0.0);
        match solve(l, r) {
            Err(SolverError::NegativeCrossingTime { time, left, right }) => {
                assert!(time < 0.0);
                assert_eq!(left, l);
                assert_eq!(right, r);
            }
            other => panic!("expected NegativeCrossingTime, got {other:?}"),
        }
    }

    #[test]
    fn out_of_order_pair_at_rest_is_fail_stop() {
        let l = side(1e-3, 0.0, 0.5, 0.0);
        let r = side(0.0, 0.0, -0.5, 0.0);
        assert_eq!(
            solve(l, r),
            Err(SolverError::NoForwardRoot { left: l, right: r })
        );
        // A small approach speed does not rescue it.
        let l = side(1e-3, 0.01, 0.5, 0.0);
        assert_eq!(
            solve(l, r),
            Err(SolverError::NoForwardRoot { left: l, right: r })
        );
    }

    #[test]
    fn nan_state_is_reported() {
        let l = side(f64::NAN, 0.0, 0.5, 0.0);
        let r = side(0.0, 0.0, -0.5, 0.0);
        assert!(matches!(
            solve(l, r),
            Err(SolverError::NonFiniteCrossingTime { .. })
        ));
    }

    #[test]
    fn degeneracy_is_equal_acceleration() {
        assert!(is_degenerate(&side(-1.0, 0.5, 0.25, 0.0), &side(1.0, 0.0, 0.25, 0.3)));
        assert!(!is_degenerate(&side(-1.0, 0.5, 0.5, 0.0), &side(1.0, 0.0, -0.5, 0.0)));
    }

    #[test]
    fn never_maps_to_infinity() {
        assert_eq!(Crossing::Never.time(), f64::INFINITY);
        assert!(Crossing::Never.is_never());
        assert!(!Crossing::At(1.0).is_never());
    }

    proptest! {
        #[test]
        fn crossing_closes_the_gap(
            gap in 1e-3f64..10.0,
            vl in -5.0f64..5.0,
            vr in -5.0f64..5.0,
            n in 2u32..1000,
        ) {
            let da = 2.0 / f64::from(n);
            let l = side(-gap, vl, da / 2.0, 0.0);
            let r = side(0.0, vr, -da / 2.0, 0.0);
            let t = solve(l, r).unwrap().time();
            prop_assert!(t.is_finite() && t >= 0.0);
            let scale = 1.0 + gap + (vl - vr).abs() * t + da * t * t;
            prop_assert!(gap_at(l, r, t).abs() <= 1e-9 * scale);
        }
    }
}
