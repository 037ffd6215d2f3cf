//! Structural importance of intersections.

use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;

use crate::{
    EPSILON, Error, NodeId,
    model::{Graph, Road},
    routing::{ShortestPath, free_flow_time, state::State},
};

/// Degree, closeness and betweenness centrality of every node
#[derive(Debug, Clone, Copy)]
pub struct Centrality<'a> {
    graph: &'a Graph,
}

impl<'a> Centrality<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Out-degree of every node
    #[allow(clippy::cast_precision_loss)]
    pub fn degree(&self) -> Result<Vec<f64>, Error> {
        (0..self.graph.node_count())
            .map(|node| self.graph.out_degree(node).map(|degree| degree as f64))
            .collect()
    }

    /// Reachable node count divided by the summed free-flow travel time to
    /// them. Zero when nothing is reachable.
    #[allow(clippy::cast_precision_loss)]
    pub fn closeness(&self) -> Result<Vec<f64>, Error> {
        let node_count = self.graph.node_count();
        let mut result = vec![0.0; node_count];
        let mut shortest = ShortestPath::new(self.graph);

        for (source, score) in result.iter_mut().enumerate() {
            shortest.compute_travel_time(source)?;

            let (reachable, total) = shortest
                .distances()
                .iter()
                .enumerate()
                .filter(|&(node, dist)| node != source && dist.is_finite())
                .fold((0usize, 0.0), |(count, sum), (_, dist)| (count + 1, sum + dist));

            if reachable > 0 && total > EPSILON {
                *score = reachable as f64 / total;
            }
        }

        Ok(result)
    }

    /// Raw Brandes betweenness under free-flow travel time.
    ///
    /// Every ordered (source, target) pair contributes, so a node on the only
    /// route between two intersections collects 1 for each direction.
    pub fn betweenness(&self) -> Vec<f64> {
        self.betweenness_by(free_flow_time)
    }

    /// [`betweenness`](Centrality::betweenness) halved, the usual convention
    /// for networks whose roads are all bidirectional
    pub fn undirected_betweenness(&self) -> Vec<f64> {
        let mut scores = self.betweenness();
        for score in &mut scores {
            *score /= 2.0;
        }
        scores
    }

    /// Weighted Brandes betweenness under a caller-supplied edge cost.
    ///
    /// Two routes count as equally short when their costs differ by at most
    /// [`EPSILON`]. Scores are summed over all sources without normalization.
    pub fn betweenness_by<F>(&self, cost: F) -> Vec<f64>
    where
        F: Fn(&Road) -> f64,
    {
        let node_count = self.graph.node_count();
        let mut scores = vec![0.0; node_count];

        let mut dist = vec![f64::INFINITY; node_count];
        let mut sigma = vec![0.0; node_count];
        let mut delta = vec![0.0; node_count];
        let mut predecessors: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
        let mut settled = FixedBitSet::with_capacity(node_count);
        let mut stack: Vec<NodeId> = Vec::with_capacity(node_count);
        let mut heap = BinaryHeap::new();

        for source in 0..node_count {
            stack.clear();
            heap.clear();
            settled.clear();
            dist.fill(f64::INFINITY);
            sigma.fill(0.0);
            delta.fill(0.0);
            for preds in &mut predecessors {
                preds.clear();
            }

            dist[source] = 0.0;
            sigma[source] = 1.0;
            heap.push(State {
                cost: 0.0,
                node: source,
            });

            // Dijkstra counting shortest paths
            while let Some(State { cost: current, node }) = heap.pop() {
                if current > dist[node] || settled.contains(node) {
                    continue;
                }
                settled.insert(node);
                stack.push(node);

                for road in self.graph.roads_from(node) {
                    let next = road.to();
                    if settled.contains(next) {
                        continue;
                    }
                    let next_cost = current + cost(road);

                    if next_cost < dist[next] - EPSILON {
                        dist[next] = next_cost;
                        sigma[next] = sigma[node];
                        predecessors[next].clear();
                        predecessors[next].push(node);
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    } else if (next_cost - dist[next]).abs() <= EPSILON {
                        // Another shortest path found
                        sigma[next] += sigma[node];
                        predecessors[next].push(node);
                    }
                }
            }

            // Dependency accumulation in order of non-increasing distance
            while let Some(node) = stack.pop() {
                for &pred in &predecessors[node] {
                    if sigma[node] > 0.0 {
                        delta[pred] += (sigma[pred] / sigma[node]) * (1.0 + delta[node]);
                    }
                }
                if node != source {
                    scores[node] += delta[node];
                }
            }
        }

        scores
    }
}

/// Scales raw betweenness by `1 / ((n - 1)(n - 2))`, the number of ordered
/// pairs a node can lie between. Graphs with fewer than three nodes are left
/// unchanged.
#[allow(clippy::cast_precision_loss)]
pub fn normalize_betweenness(scores: &mut [f64]) {
    let n = scores.len();
    if n <= 2 {
        return;
    }
    let pairs = ((n - 1) * (n - 2)) as f64;
    for score in scores {
        *score /= pairs;
    }
}
