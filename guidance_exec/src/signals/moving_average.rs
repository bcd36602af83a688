//! Moving average filter

use std::collections::VecDeque;

use super::{Filter, Signal};

/// Outputs the mean of the last `N` samples.
///
/// A window of one is a pass-through.
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    window: usize,
    history: VecDeque<f64>,
}

impl MovingAverageFilter {
    /// Create a new filter, a window of zero is treated as one.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            history: VecDeque::with_capacity(window),
        }
    }
}

impl Filter for MovingAverageFilter {
    fn apply(&mut self, signal: Signal) -> Signal {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(signal.value);

        let mean = self.history.iter().sum::<f64>() / self.history.len() as f64;

        Signal {
            value: mean,
            ..signal
        }
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}
