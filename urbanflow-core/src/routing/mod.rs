//! Route search over the road graph

pub mod astar;
pub mod dijkstra;
pub mod heuristic;
pub(crate) mod state;

pub use astar::HeuristicSearch;
pub use dijkstra::ShortestPath;
pub use heuristic::{Heuristic, NoHeuristic, StraightLine};

use crate::{NodeId, model::Road};

/// Free-flow travel time of a road, the default edge cost
pub fn free_flow_time(road: &Road) -> f64 {
    road.base_travel_time()
}

/// Physical length of a road
pub fn road_length(road: &Road) -> f64 {
    road.length()
}

/// Follows predecessor links from `target` back to the root and returns the
/// path in travel order. Callers check reachability first.
pub(crate) fn reconstruct_path(parent: &[Option<NodeId>], target: NodeId) -> Vec<NodeId> {
    let mut path = vec![target];
    let mut current = target;
    while let Some(prev) = parent[current] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
