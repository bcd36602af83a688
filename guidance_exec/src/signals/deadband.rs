//! Deadband filter

use super::{Filter, Signal};

/// Snaps values close to a centre onto the centre.
///
/// Values within `width` of `center` are output as `center`, all other values pass unchanged.
#[derive(Debug, Clone)]
pub struct Deadband {
    center: f64,
    width: f64,
}

impl Deadband {
    pub fn new(center: f64, width: f64) -> Self {
        Self {
            center,
            width: width.abs(),
        }
    }
}

impl Filter for Deadband {
    fn apply(&mut self, signal: Signal) -> Signal {
        if (signal.value - self.center).abs() < self.width {
            Signal {
                value: self.center,
                ..signal
            }
        } else {
            signal
        }
    }

    fn reset(&mut self) {}
}
