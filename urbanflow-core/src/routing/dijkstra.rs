use std::collections::BinaryHeap;

use super::{free_flow_time, reconstruct_path, state::State};
use crate::{Error, NodeId, model::Graph, model::Road};

/// Single-source shortest paths (Dijkstra) under a caller-supplied edge cost.
///
/// The instance keeps the distances and predecessors of the last
/// [`compute`](ShortestPath::compute) call for later queries.
#[derive(Debug)]
pub struct ShortestPath<'a> {
    graph: &'a Graph,
    dist: Vec<f64>,
    parent: Vec<Option<NodeId>>,
}

impl<'a> ShortestPath<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let node_count = graph.node_count();
        Self {
            graph,
            dist: vec![f64::INFINITY; node_count],
            parent: vec![None; node_count],
        }
    }

    /// Computes least-cost distances from `source` to every node.
    ///
    /// `cost` must return a non-negative value for every road.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeIndex`] for an invalid source.
    pub fn compute<F>(&mut self, source: NodeId, cost: F) -> Result<(), Error>
    where
        F: Fn(&Road) -> f64,
    {
        let graph = self.graph;
        graph.validate_node(source)?;

        let node_count = graph.node_count();
        self.dist.clear();
        self.dist.resize(node_count, f64::INFINITY);
        self.parent.clear();
        self.parent.resize(node_count, None);

        let mut heap = BinaryHeap::with_capacity(node_count / 4 + 1);

        // Start node has distance 0
        self.dist[source] = 0.0;
        heap.push(State {
            cost: 0.0,
            node: source,
        });

        while let Some(State { cost: current, node }) = heap.pop() {
            // Skip if we've found a better path
            if current > self.dist[node] {
                continue;
            }

            for road in graph.outgoing(node)? {
                let next = road.to();
                let next_cost = current + cost(road);

                if next_cost < self.dist[next] {
                    self.dist[next] = next_cost;
                    self.parent[next] = Some(node);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
            }
        }

        Ok(())
    }

    /// [`compute`](ShortestPath::compute) with free-flow travel time as cost
    pub fn compute_travel_time(&mut self, source: NodeId) -> Result<(), Error> {
        self.compute(source, free_flow_time)
    }

    /// Least cost to `target`, infinite when unreachable
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

    /// Node sequence from the source to `target`, empty if unreachable
    pub fn path(&self, target: NodeId) -> Result<Vec<NodeId>, Error> {
        if !self.is_reachable(target)? {
            return Ok(Vec::new());
        }
        Ok(reconstruct_path(&self.parent, target))
    }

    fn validate_target(&self, target: NodeId) -> Result<(), Error> {
        if target < self.dist.len() {
            Ok(())
        } else {
            Err(Error::InvalidNodeIndex(target))
        }
    }
}
