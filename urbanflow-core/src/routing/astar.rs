use std::collections::BinaryHeap;

use super::{
    free_flow_time,
    heuristic::{Heuristic, StraightLine},
    reconstruct_path,
    state::State,
};
use crate::{
    Error, NodeId,
    model::{CityModel, Intersection, Road},
};

/// Point-to-point route search (A*) guided by a [`Heuristic`].
///
/// Queries mirror [`super::ShortestPath`]. Distances are exact for every node
/// settled before the target; other nodes may hold an upper bound only.
#[derive(Debug)]
pub struct HeuristicSearch<'a, H = StraightLine> {
    city: &'a CityModel,
    heuristic: H,
    dist: Vec<f64>,
    f_score: Vec<f64>,
    parent: Vec<Option<NodeId>>,
}

impl<'a> HeuristicSearch<'a, StraightLine> {
    /// Search guided by plain straight-line distance between intersections
    pub fn new(city: &'a CityModel) -> Self {
        Self::with_heuristic(city, StraightLine::default())
    }
}

impl<'a, H: Heuristic> HeuristicSearch<'a, H> {
    pub fn with_heuristic(city: &'a CityModel, heuristic: H) -> Self {
        let node_count = city.graph().node_count();
        Self {
            city,
            heuristic,
            dist: vec![f64::INFINITY; node_count],
            f_score: vec![f64::INFINITY; node_count],
            parent: vec![None; node_count],
        }
    }

    /// Searches the cheapest route from `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeIndex`] if either node does not exist.
    pub fn compute<F>(&mut self, source: NodeId, target: NodeId, cost: F) -> Result<(), Error>
    where
        F: Fn(&Road) -> f64,
    {
        let city = self.city;
        let graph = city.graph();
        graph.validate_node(source)?;
        graph.validate_node(target)?;
        let goal = city.intersection(target)?;

        let node_count = graph.node_count();
        for buffer in [&mut self.dist, &mut self.f_score] {
            buffer.clear();
            buffer.resize(node_count, f64::INFINITY);
        }
        self.parent.clear();
        self.parent.resize(node_count, None);

        let mut open_set = BinaryHeap::with_capacity(node_count / 4 + 1);

        self.dist[source] = 0.0;
        self.f_score[source] = self.estimate(source, goal)?;
        open_set.push(State {
            cost: self.f_score[source],
            node: source,
        });

        while let Some(State { cost: priority, node }) = open_set.pop() {
            // Skip stale entry
            if priority > self.f_score[node] {
                continue;
            }

            if node == target {
                break;
            }

            for road in graph.outgoing(node)? {
                let next = road.to();
                let tentative = self.dist[node] + cost(road);

                if tentative < self.dist[next] {
                    self.dist[next] = tentative;
                    self.parent[next] = Some(node);
                    self.f_score[next] = tentative + self.estimate(next, goal)?;
                    open_set.push(State {
                        cost: self.f_score[next],
                        node: next,
                    });
                }
            }
        }

        Ok(())
    }

    /// [`compute`](HeuristicSearch::compute) with free-flow travel time as cost
    pub fn compute_travel_time(&mut self, source: NodeId, target: NodeId) -> Result<(), Error> {
        self.compute(source, target, free_flow_time)
    }

    /// Runs the search and returns the route, empty if `target` is unreachable
    pub fn route<F>(&mut self, source: NodeId, target: NodeId, cost: F) -> Result<Vec<NodeId>, Error>
    where
        F: Fn(&Road) -> f64,
    {
        self.compute(source, target, cost)?;
        self.path(target)
    }

    pub fn distance(&self, target: NodeId) -> Result<f64, Error> {
        self.validate_target(target)?;
        Ok(self.dist[target])
    }

    pub fn distances(&self) -> &[f64] {
        &self.dist
    }

    pub fn predecessor(&self, target: NodeId) -> Result<Option<NodeId>, Error> {
        self.validate_target(target)?;
        Ok(self.parent[target])
    }

    pub fn is_reachable(&self, target: NodeId) -> Result<bool, Error> {
        self.validate_target(target)?;
        Ok(self.dist[target].is_finite())
    }

    pub fn path(&self, target: NodeId) -> Result<Vec<NodeId>, Error> {
        if !self.is_reachable(target)? {
            return Ok(Vec::new());
        }
        Ok(reconstruct_path(&self.parent, target))
    }

    fn estimate(&self, node: NodeId, goal: &Intersection) -> Result<f64, Error> {
        let from = self.city.intersection(node)?;
        Ok(self.heuristic.estimate(from, goal))
    }

    fn validate_target(&self, target: NodeId) -> Result<(), Error> {
        if target < self.dist.len() {
            Ok(())
        } else {
            Err(Error::InvalidNodeIndex(target))
        }
    }
}
