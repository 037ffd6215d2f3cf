//! Flow-dependent travel times.

use serde::{Deserialize, Serialize};

use crate::model::Road;

/// Penalty applied to a road without usable capacity
pub const SATURATION_PENALTY: f64 = 1000.0;

/// Penalty formula applied to the flow ratio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionFunction {
    /// `1 + ratio`
    #[default]
    Linear,
    /// Bureau of Public Roads: `1 + alpha * ratio^beta`
    Bpr,
    /// `e^ratio`
    Exponential,
}

/// Congestion model configuration.
///
/// A plain value: every simulation holds its own copy, so changing one
/// model never affects another run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CongestionModel {
    pub function: CongestionFunction,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for CongestionModel {
    fn default() -> Self {
        Self {
            function: CongestionFunction::Linear,
            alpha: 0.15,
            beta: 4.0,
        }
    }
}

impl CongestionModel {
    pub fn new(function: CongestionFunction) -> Self {
        Self {
            function,
            ..Self::default()
        }
    }

    /// BPR model with custom parameters
    pub fn bpr(alpha: f64, beta: f64) -> Self {
        Self {
            function: CongestionFunction::Bpr,
            alpha,
            beta,
        }
    }

    pub fn set_function(&mut self, function: CongestionFunction) {
        self.function = function;
    }

    pub fn set_bpr_parameters(&mut self, alpha: f64, beta: f64) {
        self.alpha = alpha;
        self.beta = beta;
    }

    /// Multiplicative penalty for a flow/capacity ratio
    pub fn penalty(&self, flow_ratio: f64) -> f64 {
        match self.function {
            CongestionFunction::Linear => 1.0 + flow_ratio,
            CongestionFunction::Bpr => 1.0 + self.alpha * flow_ratio.powf(self.beta),
            CongestionFunction::Exponential => flow_ratio.exp(),
        }
    }

    /// Travel time over `road` at its current flow for a vehicle whose speed
    /// is `speed_factor` times the free-flow speed.
    ///
    /// A non-positive speed factor never finishes the road.
    pub fn travel_time(&self, road: &Road, speed_factor: f64) -> f64 {
        if speed_factor <= 0.0 {
            return f64::INFINITY;
        }
        let base = road.base_travel_time() / speed_factor;
        let penalty = road
            .flow_ratio()
            .map_or(SATURATION_PENALTY, |ratio| self.penalty(ratio));
        base * penalty
    }

    /// Edge cost for the route searches: congested travel time at free-flow
    /// speed
    pub fn cost(&self) -> impl Fn(&Road) -> f64 + '_ {
        move |road: &Road| self.travel_time(road, 1.0)
    }
}
