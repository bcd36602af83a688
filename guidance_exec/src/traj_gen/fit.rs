//! # Curve fitting
//!
//! Fits a pair of natural cubic splines `x(s)` and `y(s)` through a sequence of points, where
//! `s` is the cumulative chord length along the points.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use nalgebra::{DMatrix, DVector, Point2};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum number of points a curve can be fitted through.
pub const MIN_FIT_POINTS: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A one dimensional natural cubic spline.
///
/// On the interval `[knots[i], knots[i+1]]` the value is
/// `a[i] + b[i]*ds + c[i]*ds^2 + d[i]*ds^3` with `ds = t - knots[i]`.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

/// A smooth planar curve through a set of points.
#[derive(Debug, Clone)]
pub struct FittedCurve {
    s: Vec<f64>,
    sx: CubicSpline,
    sy: CubicSpline,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("Not enough points for a fit, got {0}")]
    TooFewPoints(usize),

    #[error("Point {0} is coincident with the point before it")]
    CoincidentPoints(usize),

    #[error("Knots must be strictly increasing")]
    NonIncreasingKnots,

    #[error("The spline coefficient system could not be solved")]
    SingularSystem,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CubicSpline {
    /// Build a natural spline through `(knots[i], values[i])`.
    pub fn new(knots: &[f64], values: &[f64]) -> Result<Self, FitError> {
        let n = knots.len();
        if n < MIN_FIT_POINTS || values.len() != n {
            return Err(FitError::TooFewPoints(n.min(values.len())));
        }

        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|hi| !(*hi > 0.0)) {
            return Err(FitError::NonIncreasingKnots);
        }

        // Tridiagonal system for the second order coefficients, with zero curvature at both ends
        let mut mat = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);
        mat[(0, 0)] = 1.0;
        mat[(n - 1, n - 1)] = 1.0;
        for i in 1..n - 1 {
            mat[(i, i - 1)] = h[i - 1];
            mat[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            mat[(i, i + 1)] = h[i];
            rhs[i] = 3.0 * (values[i + 1] - values[i]) / h[i]
                - 3.0 * (values[i] - values[i - 1]) / h[i - 1];
        }

        let c_vec = mat.lu().solve(&rhs).ok_or(FitError::SingularSystem)?;
        let c: Vec<f64> = c_vec.iter().copied().collect();

        let mut b = Vec::with_capacity(n - 1);
        let mut d = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((values[i + 1] - values[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }

        Ok(Self {
            knots: knots.to_vec(),
            a: values.to_vec(),
            b,
            c,
            d,
        })
    }

    /// Index of the interval containing `t`, clamped to the first and last intervals.
    fn interval(&self, t: f64) -> usize {
        let last = self.knots.len() - 2;
        match self.knots.partition_point(|k| *k <= t) {
            0 => 0,
            i => (i - 1).min(last),
        }
    }

    /// Value at `t`.
    pub fn value(&self, t: f64) -> f64 {
        let i = self.interval(t);
        let ds = t - self.knots[i];
        self.a[i] + self.b[i] * ds + self.c[i] * ds.powi(2) + self.d[i] * ds.powi(3)
    }

    /// First derivative at `t`.
    pub fn deriv(&self, t: f64) -> f64 {
        let i = self.interval(t);
        let ds = t - self.knots[i];
        self.b[i] + 2.0 * self.c[i] * ds + 3.0 * self.d[i] * ds.powi(2)
    }
}

impl FittedCurve {
    pub fn new(points: &[Point2<f64>]) -> Result<Self, FitError> {
        if points.len() < MIN_FIT_POINTS {
            return Err(FitError::TooFewPoints(points.len()));
        }

        let mut s = Vec::with_capacity(points.len());
        s.push(0.0);
        for (i, w) in points.windows(2).enumerate() {
            let ds = (w[1] - w[0]).norm();
            if !(ds > 0.0) {
                return Err(FitError::CoincidentPoints(i + 1));
            }
            s.push(s[i] + ds);
        }

        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();

        Ok(Self {
            sx: CubicSpline::new(&s, &xs)?,
            sy: CubicSpline::new(&s, &ys)?,
            s,
        })
    }

    /// Curve parameter at each of the fitted points.
    pub fn knots(&self) -> &[f64] {
        &self.s
    }

    /// Total chord length of the curve.
    pub fn length_m(&self) -> f64 {
        self.s.last().copied().unwrap_or(0.0)
    }

    pub fn position(&self, s: f64) -> Point2<f64> {
        Point2::new(self.sx.value(s), self.sy.value(s))
    }

    /// Heading of the curve's tangent at `s`.
    pub fn yaw(&self, s: f64) -> f64 {
        self.sy.deriv(s).atan2(self.sx.deriv(s))
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Fit a curve through the points, or `None` if no fit is possible.
///
/// A fit needs at least three points with no two consecutive points coincident.
pub fn compute_fit(points: &[Point2<f64>]) -> Option<FittedCurve> {
    match FittedCurve::new(points) {
        Ok(f) => Some(f),
        Err(e) => {
            warn!("No fit available: {}", e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
