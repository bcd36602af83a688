//! # Signal processing module
//!
//! Provides the stateful scalar filters used by adaptive cruise control and the pipeline which
//! chains them together. A [`Pipeline`] is fixed at construction, each stage owning its own
//! state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod deadband;
mod moving_average;
mod pid;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use deadband::Deadband;
pub use moving_average::MovingAverageFilter;
pub use pid::PidController;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt::Debug;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A single stage of a filter pipeline.
pub trait Filter: Debug + Send {
    /// Apply the filter to the next sample, returning the filtered sample.
    fn apply(&mut self, signal: Signal) -> Signal;

    /// Clear any history held by the filter.
    fn reset(&mut self);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A timestamped scalar sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub value: f64,

    /// Time at which the sample was taken.
    ///
    /// Units: seconds
    pub time_s: f64,
}

/// An ordered chain of filters.
#[derive(Debug)]
pub struct Pipeline {
    stages: Vec<Box<dyn Filter>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Signal {
    pub fn new(value: f64, time_s: f64) -> Self {
        Self { value, time_s }
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Filter>>) -> Self {
        Self { stages }
    }

    /// Build the pipeline used by adaptive cruise control: deadband, then PID, then moving
    /// average.
    ///
    /// The deadband is centred on, and the PID targets, the `set_point`.
    pub fn acc(
        set_point: f64,
        deadband_width: f64,
        k_p: f64,
        k_i: f64,
        k_d: f64,
        num_averaging_samples: usize,
    ) -> Self {
        Self::new(vec![
            Box::new(Deadband::new(set_point, deadband_width)),
            Box::new(PidController::new(k_p, k_i, k_d, set_point)),
            Box::new(MovingAverageFilter::new(num_averaging_samples)),
        ])
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Filter for Pipeline {
    fn apply(&mut self, signal: Signal) -> Signal {
        self.stages
            .iter_mut()
            .fold(signal, |sig, stage| stage.apply(sig))
    }

    fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_pipeline_passes_through() {
        let mut pipeline = Pipeline::new(vec![]);
        let out = pipeline.apply(Signal::new(3.0, 1.0));
        assert_eq!(out, Signal::new(3.0, 1.0));
    }

    #[test]
    fn test_acc_pipeline_order() {
        // Deadband of 0.2 about 1.0, proportional only
        let mut pipeline = Pipeline::acc(1.0, 0.2, 2.0, 0.0, 0.0, 1);
        assert_eq!(pipeline.num_stages(), 3);

        // Inside the deadband, the PID sees zero error
        let out = pipeline.apply(Signal::new(0.9, 0.0));
        assert!(out.value.abs() < 1e-12);

        // Outside, error is 1.0 - 0.5
        let out = pipeline.apply(Signal::new(0.5, 0.1));
        assert!((out.value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pipeline_reset() {
        let mut pipeline = Pipeline::acc(1.0, 0.0, 0.0, 1.0, 0.0, 1);
        pipeline.apply(Signal::new(0.0, 0.0));
        let accumulated = pipeline.apply(Signal::new(0.0, 1.0));
        assert!((accumulated.value - 1.0).abs() < 1e-12);

        pipeline.reset();

        // After a reset the first sample carries no integral again
        let out = pipeline.apply(Signal::new(0.0, 2.0));
        assert!(out.value.abs() < 1e-12);
    }
}
