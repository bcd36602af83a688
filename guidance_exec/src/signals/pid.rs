//! PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{Filter, Signal};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller driving its input towards a set point.
#[derive(Debug, Clone)]
pub struct PidController {
    /// Time of the previous sample
    prev_time_s: Option<f64>,

    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Target value of the input
    set_point: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains and set point.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, set_point: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            set_point,
            integral: 0f64,
            prev_time_s: None,
            prev_error: None,
        }
    }

    /// Get the value of the controller for the given input sample.
    ///
    /// The error is `set_point - value`. The time step is taken from the sample timestamps, so
    /// the first sample, and any sample not strictly after the previous one, contribute neither
    /// integral nor derivative.
    pub fn get(&mut self, signal: Signal) -> f64 {
        let error = self.set_point - signal.value;

        // Calculate dt
        let dt = match self.prev_time_s {
            Some(t0) if signal.time_s > t0 => Some(signal.time_s - t0),
            _ => None,
        };

        // Accumulate the integral term.
        //
        // Without a time difference nothing is accumulated, adding the raw error would produce a
        // spike compared to normal operation.
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64,
        };

        // Calculate the derivative
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64,
        };

        let out = self.k_p * error + self.k_i * self.integral + self.k_d * deriv;

        // Remember the previous error and time
        self.prev_error = Some(error);
        self.prev_time_s = Some(signal.time_s);

        out
    }
}

impl Filter for PidController {
    fn apply(&mut self, signal: Signal) -> Signal {
        Signal {
            value: self.get(signal),
            ..signal
        }
    }

    fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
        self.prev_time_s = None;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_proportional() {
        let mut pid = PidController::new(2.0, 0.0, 0.0, 1.0);
        assert!((pid.get(Signal::new(0.25, 0.0)) - 1.5).abs() < 1e-12);
        assert!((pid.get(Signal::new(1.5, 0.1)) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_sample_has_no_integral_or_derivative() {
        let mut pid = PidController::new(0.0, 1.0, 1.0, 1.0);
        assert_eq!(pid.get(Signal::new(0.0, 5.0)), 0.0);
    }

    #[test]
    fn test_integral_and_derivative() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 0.0);
        pid.get(Signal::new(-1.0, 0.0));
        // Error of 1 over 0.5 s
        assert!((pid.get(Signal::new(-1.0, 0.5)) - 0.5).abs() < 1e-12);
        assert!((pid.get(Signal::new(-1.0, 1.0)) - 1.0).abs() < 1e-12);

        let mut pid = PidController::new(0.0, 0.0, 1.0, 0.0);
        pid.get(Signal::new(0.0, 0.0));
        // Error goes from 0 to -2 in 0.5 s
        assert!((pid.get(Signal::new(2.0, 0.5)) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_increasing_time_ignored() {
        let mut pid = PidController::new(0.0, 1.0, 1.0, 0.0);
        pid.get(Signal::new(-1.0, 1.0));
        let out = pid.get(Signal::new(-3.0, 1.0));
        assert!(out.is_finite());
        assert_eq!(out, 0.0);
    }

    #[test]
    fn test_reset_clears_integral() {
        let mut pid = PidController::new(1.0, 1.0, 0.0, 0.0);
        pid.get(Signal::new(-1.0, 0.0));
        pid.get(Signal::new(-1.0, 1.0));
        pid.reset();

        assert_eq!(pid.get(Signal::new(-1.0, 2.0)), 1.0);
    }
}
