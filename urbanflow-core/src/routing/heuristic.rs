//! Remaining-cost estimates for [`super::HeuristicSearch`].
//!
//! A* returns optimal routes only when the estimate never exceeds the true
//! remaining cost (admissible), and it may stop at the first pop of the
//! target only when the estimate is also consistent. The estimate must be
//! expressed in the same unit as the edge cost: plain straight-line distance
//! suits a length cost, while a travel-time cost needs the distance divided
//! by the fastest possible speed on the network.

use crate::model::Intersection;

pub trait Heuristic {
    /// Estimated cost of travelling from `from` to `to`
    fn estimate(&self, from: &Intersection, to: &Intersection) -> f64;
}

/// Euclidean distance between intersection coordinates, times `scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLine {
    pub scale: f64,
}

impl StraightLine {
    /// Straight-line distance converted by `scale` cost units per distance unit
    pub fn scaled(scale: f64) -> Self {
        Self { scale }
    }

    /// Lower bound on travel time when no road is faster than `max_speed`
    /// distance units per time unit.
    pub fn for_max_speed(max_speed: f64) -> Self {
        Self::scaled(1.0 / max_speed)
    }
}

impl Default for StraightLine {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl Heuristic for StraightLine {
    fn estimate(&self, from: &Intersection, to: &Intersection) -> f64 {
        let dx = from.location.x() - to.location.x();
        let dy = from.location.y() - to.location.y();
        dx.hypot(dy) * self.scale
    }
}

/// Zero estimate, turns A* into Dijkstra with early exit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoHeuristic;

impl Heuristic for NoHeuristic {
    fn estimate(&self, _from: &Intersection, _to: &Intersection) -> f64 {
        0.0
    }
}

impl<F> Heuristic for F
where
    F: Fn(&Intersection, &Intersection) -> f64,
{
    fn estimate(&self, from: &Intersection, to: &Intersection) -> f64 {
        self(from, to)
    }
}
