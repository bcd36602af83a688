//! # Trajectory geometry
//!
//! Heading and curvature of a fitted curve, evaluated at each of the fitted points.
//!
//! Both quantities are derived from the chords between consecutive samples of the curve, so
//! each list has one value fewer than there are samples. The last value is repeated to give one
//! value per sample.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::fit::FittedCurve;
use util::maths::wrap_to_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Below this the chord and tangent are treated as aligned, and the curve as straight.
const MIN_TURN_SIN: f64 = 1e-9;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Heading of the chord from each sample to the next.
pub fn compute_orientation_from_fit(fit: &FittedCurve) -> Vec<f64> {
    let samples: Vec<_> = fit.knots().iter().map(|s| fit.position(*s)).collect();

    let mut yaws: Vec<f64> = samples
        .windows(2)
        .map(|w| (w[1].y - w[0].y).atan2(w[1].x - w[0].x))
        .collect();

    duplicate_last(&mut yaws);
    yaws
}

/// Curvature at each sample, limited to `max_curvature_m`.
///
/// The radius is that of the circle tangent to the curve at the sample and passing through the
/// next sample, `r = 0.5 * chord / sin(turn)`, where `turn` is the angle between the tangent and
/// the chord.
pub fn compute_curvature_from_fit(fit: &FittedCurve, max_curvature_m: f64) -> Vec<f64> {
    let knots = fit.knots();

    let mut curvatures: Vec<f64> = knots
        .windows(2)
        .map(|w| {
            let p0 = fit.position(w[0]);
            let p1 = fit.position(w[1]);
            let chord = p1 - p0;

            let chord_yaw = chord.y.atan2(chord.x);
            let turn_sin = wrap_to_pi(chord_yaw - fit.yaw(w[0])).sin().abs();

            if turn_sin < MIN_TURN_SIN {
                return 0.0;
            }

            let radius_m = 0.5 * chord.norm() / turn_sin;
            (1.0 / radius_m).min(max_curvature_m)
        })
        .collect();

    duplicate_last(&mut curvatures);
    curvatures
}

fn duplicate_last(values: &mut Vec<f64>) {
    if let Some(last) = values.last().copied() {
        values.push(last);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
