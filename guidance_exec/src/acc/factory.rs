//! Adaptive cruise control strategy factory

use log::trace;

use super::{AccStrategy, BasicAccStrategy, NoOpAccStrategy, Params};
use crate::signals::Pipeline;

/// Builds a fresh strategy for each maneuver from a shared set of parameters.
#[derive(Debug, Clone)]
pub struct AccStrategyFactory {
    params: Params,
}

impl AccStrategyFactory {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Create a new strategy with its own filter pipeline.
    ///
    /// When ACC is disabled a pass-through strategy is returned.
    pub fn create(&self) -> Box<dyn AccStrategy> {
        if !self.params.enabled {
            return Box::new(NoOpAccStrategy);
        }

        let pipeline = Pipeline::acc(
            self.params.desired_time_gap_s,
            self.params.deadband_s,
            self.params.k_p,
            self.params.k_i,
            self.params.k_d,
            self.params.num_averaging_samples,
        );

        trace!("ACC strategy created with {} filter stages", pipeline.num_stages());

        Box::new(BasicAccStrategy::new(self.params.clone(), pipeline))
    }
}

impl Default for AccStrategyFactory {
    fn default() -> Self {
        Self::new(Params::default())
    }
}
