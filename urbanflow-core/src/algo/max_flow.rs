//! Maximum flow between two intersections (Dinic's algorithm).
//!
//! Road capacities define the flow network. Every call to
//! [`MaxFlow::compute`] builds a fresh residual network private to the
//! instance, so the graph's roads are never modified.

use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use log::debug;

use crate::{EPSILON, EdgeId, Error, NodeId, model::Graph};

/// Residual arc. Forward arcs carry the road they were built from; every
/// arc knows the position of its partner in the partner's list.
#[derive(Debug, Clone, Copy)]
struct ResidualArc {
    to: NodeId,
    rev: usize,
    capacity: f64,
    road: Option<EdgeId>,
}

#[derive(Debug)]
pub struct MaxFlow<'a> {
    graph: &'a Graph,
    residual: Vec<Vec<ResidualArc>>,
    level: Vec<Option<usize>>,
    cursor: Vec<usize>,
    last_max_flow: f64,
}

impl<'a> MaxFlow<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        let node_count = graph.node_count();
        Self {
            graph,
            residual: vec![Vec::new(); node_count],
            level: vec![None; node_count],
            cursor: vec![0; node_count],
            last_max_flow: 0.0,
        }
    }

    /// Maximum flow from `source` to `sink`.
    ///
    /// A source equal to the sink has zero flow.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeIndex`] if either node does not exist.
    pub fn compute(&mut self, source: NodeId, sink: NodeId) -> Result<f64, Error> {
        self.graph.validate_node(source)?;
        self.graph.validate_node(sink)?;

        self.build_residual_graph();

        let mut max_flow = 0.0;
        let mut phases = 0usize;

        if source != sink {
            while self.build_levels(source, sink) {
                self.cursor.fill(0);
                max_flow += self.blocking_flow(source, sink);
                phases += 1;
            }
        }

        debug!("Max flow {source} -> {sink}: {max_flow} after {phases} phases");
        self.last_max_flow = max_flow;
        Ok(max_flow)
    }

    /// Value of the last computed flow
    pub fn max_flow(&self) -> f64 {
        self.last_max_flow
    }

    /// Nodes reachable from `reference` in the residual network of the last
    /// computation.
    ///
    /// `reference` must be the source of that computation for the result to
    /// be the source side of a minimum cut; the source is not remembered
    /// between calls.
    pub fn min_cut_set(&self, reference: NodeId) -> Result<FixedBitSet, Error> {
        self.graph.validate_node(reference)?;

        let mut visited = FixedBitSet::with_capacity(self.residual.len());
        let mut queue = VecDeque::new();
        visited.insert(reference);
        queue.push_back(reference);

        while let Some(node) = queue.pop_front() {
            for arc in &self.residual[node] {
                if !visited.contains(arc.to) && arc.capacity > EPSILON {
                    visited.insert(arc.to);
                    queue.push_back(arc.to);
                }
            }
        }

        Ok(visited)
    }

    /// Roads leading from the reachable side of [`min_cut_set`](MaxFlow::min_cut_set)
    /// to the unreachable side: the bottleneck of the network.
    pub fn min_cut_edges(&self, reference: NodeId) -> Result<Vec<EdgeId>, Error> {
        let reachable = self.min_cut_set(reference)?;
        Ok(self
            .graph
            .roads()
            .filter(|road| reachable.contains(road.from()) && !reachable.contains(road.to()))
            .map(|road| road.id())
            .collect())
    }

    /// Flow assigned to every road by the last computation, indexed by road
    /// handle
    pub fn edge_flows(&self) -> Vec<f64> {
        let mut flows = vec![0.0; self.graph.edge_count()];
        for arcs in &self.residual {
            for arc in arcs {
                if let Some(road) = arc.road {
                    // The paired reverse arc holds exactly what was pushed
                    flows[road] = self.residual[arc.to][arc.rev].capacity;
                }
            }
        }
        flows
    }

    fn build_residual_graph(&mut self) {
        let graph = self.graph;
        let node_count = graph.node_count();
        self.residual.clear();
        self.residual.resize(node_count, Vec::new());
        self.level.clear();
        self.level.resize(node_count, None);
        self.cursor.clear();
        self.cursor.resize(node_count, 0);

        let unbounded = graph
            .roads()
            .map(|road| road.capacity())
            .filter(|capacity| capacity.is_finite() && *capacity > 0.0)
            .sum::<f64>()
            + 1.0;

        for road in graph.roads() {
            let (from, to) = (road.from(), road.to());
            // Self-loops never carry flow between distinct nodes
            if from == to {
                continue;
            }
            let forward_pos = self.residual[from].len();
            let reverse_pos = self.residual[to].len();

            self.residual[from].push(ResidualArc {
                to,
                rev: reverse_pos,
                capacity: arc_capacity(road.capacity(), unbounded),
                road: Some(road.id()),
            });
            self.residual[to].push(ResidualArc {
                to: from,
                rev: forward_pos,
                capacity: 0.0,
                road: None,
            });
        }
    }

    /// Breadth-first level assignment; false once the sink is cut off
    fn build_levels(&mut self, source: NodeId, sink: NodeId) -> bool {
        self.level.fill(None);
        let mut queue = VecDeque::new();

        self.level[source] = Some(0);
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            let next_level = self.level[node].map(|level| level + 1);
            for arc in &self.residual[node] {
                if self.level[arc.to].is_none() && arc.capacity > EPSILON {
                    self.level[arc.to] = next_level;
                    queue.push_back(arc.to);
                }
            }
        }

        self.level[sink].is_some()
    }

    /// Pushes augmenting paths along level-increasing arcs until none is
    /// left. The walk keeps its path on an explicit stack, and each node's
    /// cursor only moves forward, so every arc is abandoned at most once per
    /// phase.
    fn blocking_flow(&mut self, source: NodeId, sink: NodeId) -> f64 {
        let mut total = 0.0;
        // (node, arc index) pairs of the current partial path
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut node = source;

        loop {
            if node == sink {
                let pushed = path
                    .iter()
                    .map(|&(from, arc)| self.residual[from][arc].capacity)
                    .fold(f64::INFINITY, f64::min);

                for &(from, arc) in &path {
                    let ResidualArc { to, rev, .. } = self.residual[from][arc];
                    self.residual[from][arc].capacity -= pushed;
                    self.residual[to][rev].capacity += pushed;
                }

                total += pushed;
                path.clear();
                node = source;
                continue;
            }

            match self.advance(node) {
                Some(arc) => {
                    path.push((node, arc));
                    node = self.residual[node][arc].to;
                }
                None => match path.pop() {
                    // Dead end: retreat and skip the arc that led here
                    Some((prev, _)) => {
                        self.cursor[prev] += 1;
                        node = prev;
                    }
                    None => break,
                },
            }
        }

        total
    }

    /// Moves the node's cursor to the next usable arc and returns it
    fn advance(&mut self, node: NodeId) -> Option<usize> {
        let next_level = self.level[node]? + 1;
        while self.cursor[node] < self.residual[node].len() {
            let arc = &self.residual[node][self.cursor[node]];
            if arc.capacity > EPSILON && self.level[arc.to] == Some(next_level) {
                return Some(self.cursor[node]);
            }
            self.cursor[node] += 1;
        }
        None
    }
}

/// Capacity of a road's forward arc.
///
/// Negative and NaN capacities carry nothing. An infinite capacity is capped
/// at `unbounded`, which exceeds the total finite capacity of the network, so
/// the residual arithmetic stays finite.
fn arc_capacity(capacity: f64, unbounded: f64) -> f64 {
    if capacity.is_nan() || capacity <= 0.0 {
        0.0
    } else {
        capacity.min(unbounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadAttributes;

    fn cap(capacity: f64) -> RoadAttributes {
        RoadAttributes::new(1.0, 1.0, capacity)
    }

    fn diamond() -> Graph {
        // S=0, X=1, Y=2, T=3
        let mut graph = Graph::with_nodes(4);
        graph.add_edge(0, 1, cap(5.0), false).unwrap();
        graph.add_edge(0, 2, cap(5.0), false).unwrap();
        graph.add_edge(1, 3, cap(5.0), false).unwrap();
        graph.add_edge(2, 3, cap(5.0), false).unwrap();
        graph
    }

    #[test]
    fn diamond_flow() {
        let graph = diamond();
        let mut flow = MaxFlow::new(&graph);
        assert_eq!(flow.compute(0, 3).unwrap(), 10.0);
        assert_eq!(flow.max_flow(), 10.0);
    }

    #[test]
    fn needs_reverse_arcs() {
        // Classic case where a greedy first path must be partially undone
        let mut graph = Graph::with_nodes(4);
        graph.add_edge(0, 1, cap(10.0), false).unwrap();
        graph.add_edge(0, 2, cap(10.0), false).unwrap();
        graph.add_edge(1, 2, cap(1.0), false).unwrap();
        graph.add_edge(1, 3, cap(10.0), false).unwrap();
        graph.add_edge(2, 3, cap(10.0), false).unwrap();

        let mut flow = MaxFlow::new(&graph);
        assert_eq!(flow.compute(0, 3).unwrap(), 20.0);
    }

    #[test]
    fn min_cut_matches_flow() {
        // 0 -> 1 is the bottleneck
        let mut graph = Graph::with_nodes(4);
        graph.add_edge(0, 1, cap(3.0), false).unwrap();
        graph.add_edge(1, 2, cap(8.0), false).unwrap();
        graph.add_edge(1, 3, cap(8.0), false).unwrap();
        graph.add_edge(2, 3, cap(8.0), false).unwrap();

        let mut flow = MaxFlow::new(&graph);
        let value = flow.compute(0, 3).unwrap();
        assert_eq!(value, 3.0);

        let side = flow.min_cut_set(0).unwrap();
        assert!(side.contains(0));
        assert!(!side.contains(1));
        assert_eq!(flow.min_cut_edges(0).unwrap(), vec![0]);

        let crossing: f64 = flow
            .min_cut_edges(0)
            .unwrap()
            .into_iter()
            .map(|edge| graph.road(edge).unwrap().capacity())
            .sum();
        assert_eq!(crossing, value);
    }

    #[test]
    fn edge_flows_are_conserved() {
        let graph = diamond();
        let mut flow = MaxFlow::new(&graph);
        flow.compute(0, 3).unwrap();
        let flows = flow.edge_flows();

        assert_eq!(flows.len(), 4);
        assert_eq!(flows[0] + flows[1], 10.0);
        assert_eq!(flows[0], flows[2]);
        assert_eq!(flows[1], flows[3]);
    }

    #[test]
    fn disconnected_sink_and_same_node() {
        let mut graph = diamond();
        let island = graph.add_node();
        let mut flow = MaxFlow::new(&graph);

        assert_eq!(flow.compute(0, island).unwrap(), 0.0);
        assert_eq!(flow.compute(1, 1).unwrap(), 0.0);
        assert!(matches!(flow.compute(0, 9), Err(Error::InvalidNodeIndex(9))));
        assert!(flow.min_cut_set(9).is_err());
    }

    #[test]
    fn unbounded_roads_stay_finite() {
        // 0 -> 1 is unlimited, 1 -> 2 limits the chain to 5
        let mut graph = Graph::with_nodes(3);
        graph.add_edge(0, 1, cap(f64::INFINITY), false).unwrap();
        graph.add_edge(1, 2, cap(5.0), false).unwrap();

        let mut flow = MaxFlow::new(&graph);
        assert_eq!(flow.compute(0, 2).unwrap(), 5.0);
        assert_eq!(flow.edge_flows(), vec![5.0, 5.0]);
        assert_eq!(flow.min_cut_edges(0).unwrap(), vec![1]);

        // A fully unlimited route is capped, never NaN
        graph.add_edge(0, 2, cap(f64::INFINITY), false).unwrap();
        graph.add_edge(0, 1, cap(f64::NAN), false).unwrap();
        let mut flow = MaxFlow::new(&graph);
        let value = flow.compute(0, 2).unwrap();
        assert!(value.is_finite() && value > 5.0);
        let flows = flow.edge_flows();
        assert!(flows.iter().all(|f| f.is_finite()));
        assert_eq!(flows[3], 0.0);
    }

    #[test]
    fn graph_is_left_untouched() {
        let graph = diamond();
        let mut flow = MaxFlow::new(&graph);
        flow.compute(0, 3).unwrap();
        assert_eq!(flow.compute(0, 3).unwrap(), 10.0);
        assert!(graph.roads().all(|road| road.capacity() == 5.0));
        assert!(graph.roads().all(|road| road.current_flow() == 0.0));
    }
}
