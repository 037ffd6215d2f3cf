//! Directed road graph backed by an adjacency list

use petgraph::{
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use super::components::{Road, RoadAttributes};
use crate::{EdgeId, Error, NodeId};

/// Road network graph.
///
/// Nodes are dense handles `0..node_count()`, roads are dense handles
/// `0..edge_count()` assigned in insertion order. Neither is ever removed,
/// so handles stay valid for the lifetime of the graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: DiGraph<(), Road>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with `node_count` isolated nodes
    pub fn with_nodes(node_count: usize) -> Self {
        let mut graph = Self::new();
        for _ in 0..node_count {
            graph.add_node();
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds an isolated node and returns its handle.
    ///
    /// Crate-private: a [`CityModel`](super::CityModel) adds a node together
    /// with its intersection, and a standalone graph is sized up front with
    /// [`Graph::with_nodes`].
    pub(crate) fn add_node(&mut self) -> NodeId {
        self.graph.add_node(()).index()
    }

    /// Adds a road `from -> to`, and with `bidirectional` an independent road
    /// `to -> from` with the same attributes.
    ///
    /// Returns the handle of the forward road.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeIndex`] if either endpoint does not exist.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        attributes: RoadAttributes,
        bidirectional: bool,
    ) -> Result<EdgeId, Error> {
        let from_idx = self.validate_node(from)?;
        let to_idx = self.validate_node(to)?;

        let forward = self.push_road(from_idx, to_idx, attributes);
        if bidirectional {
            self.push_road(to_idx, from_idx, attributes);
        }

        Ok(forward)
    }

    fn push_road(&mut self, from: NodeIndex, to: NodeIndex, attributes: RoadAttributes) -> EdgeId {
        let id = self.graph.edge_count();
        let road = Road::new(id, from.index(), to.index(), attributes);
        self.graph.add_edge(from, to, road).index()
    }

    /// Outgoing roads of `node`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeIndex`] if the node does not exist.
    pub fn outgoing(&self, node: NodeId) -> Result<impl Iterator<Item = &Road> + '_, Error> {
        let idx = self.validate_node(node)?;
        Ok(self.graph.edges(idx).map(|edge| edge.weight()))
    }

    /// Outgoing roads of a node already known to be valid; an unknown node
    /// has none.
    pub(crate) fn roads_from(&self, node: NodeId) -> impl Iterator<Item = &Road> + '_ {
        self.graph
            .edges(NodeIndex::new(node))
            .map(|edge| edge.weight())
    }

    /// Applies `update` to every outgoing road of `node`.
    ///
    /// Only the current flow of a road is mutable, so the visitor cannot
    /// change the network's structure.
    pub fn update_outgoing<F>(&mut self, node: NodeId, mut update: F) -> Result<(), Error>
    where
        F: FnMut(&mut Road),
    {
        let idx = self.validate_node(node)?;
        let edge_ids: Vec<EdgeIndex> = self.graph.edges(idx).map(|edge| edge.id()).collect();
        for edge_id in edge_ids {
            if let Some(road) = self.graph.edge_weight_mut(edge_id) {
                update(road);
            }
        }
        Ok(())
    }

    pub fn out_degree(&self, node: NodeId) -> Result<usize, Error> {
        let idx = self.validate_node(node)?;
        Ok(self.graph.edges(idx).count())
    }

    pub fn road(&self, edge: EdgeId) -> Result<&Road, Error> {
        self.graph
            .edge_weight(EdgeIndex::new(edge))
            .ok_or(Error::InvalidEdgeIndex(edge))
    }

    /// Sets the current flow of a single road
    pub fn set_flow(&mut self, edge: EdgeId, flow: f64) -> Result<(), Error> {
        let road = self.road_mut(edge).ok_or(Error::InvalidEdgeIndex(edge))?;
        road.set_current_flow(flow);
        Ok(())
    }

    /// Adds `delta` to the current flow of a single road
    pub fn add_flow(&mut self, edge: EdgeId, delta: f64) -> Result<(), Error> {
        let road = self.road_mut(edge).ok_or(Error::InvalidEdgeIndex(edge))?;
        road.set_current_flow(road.current_flow() + delta);
        Ok(())
    }

    pub(crate) fn road_mut(&mut self, edge: EdgeId) -> Option<&mut Road> {
        self.graph.edge_weight_mut(EdgeIndex::new(edge))
    }

    /// Road `from -> to` with the lowest handle, i.e. the first one added
    /// when parallel roads exist.
    ///
    /// Out-of-range handles simply find nothing.
    pub fn find_road(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if from >= self.node_count() || to >= self.node_count() {
            return None;
        }
        // petgraph lists the newest edge first
        self.graph
            .edges(NodeIndex::new(from))
            .filter(|edge| edge.target().index() == to)
            .map(|edge| edge.id().index())
            .min()
    }

    /// All roads in handle order
    pub fn roads(&self) -> impl Iterator<Item = &Road> + '_ {
        self.graph.edge_weights()
    }

    /// Sets the current flow of every road to zero
    pub fn reset_flows(&mut self) {
        for road in self.graph.edge_weights_mut() {
            road.set_current_flow(0.0);
        }
    }

    pub(crate) fn validate_node(&self, node: NodeId) -> Result<NodeIndex, Error> {
        if node < self.node_count() {
            Ok(NodeIndex::new(node))
        } else {
            Err(Error::InvalidNodeIndex(node))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(time: f64) -> RoadAttributes {
        RoadAttributes::new(1.0, time, 10.0)
    }

    #[test]
    fn nodes_are_dense_handles() {
        let mut graph = Graph::new();
        assert_eq!(graph.add_node(), 0);
        assert_eq!(graph.add_node(), 1);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(Graph::with_nodes(5).node_count(), 5);
    }

    #[test]
    fn edge_endpoints_are_validated() {
        let mut graph = Graph::with_nodes(2);
        let err = graph.add_edge(0, 2, attrs(1.0), false).unwrap_err();
        assert!(matches!(err, Error::InvalidNodeIndex(2)));
        assert!(err.is_out_of_range());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.outgoing(7).is_err());
        assert!(graph.out_degree(7).is_err());
        assert!(matches!(graph.road(0), Err(Error::InvalidEdgeIndex(0))));
        assert!(graph.set_flow(3, 1.0).is_err());
    }

    #[test]
    fn bidirectional_roads_are_independent() {
        let mut graph = Graph::with_nodes(2);
        let forward = graph.add_edge(0, 1, attrs(3.0), true).unwrap();
        assert_eq!(forward, 0);
        assert_eq!(graph.edge_count(), 2);

        let reverse = graph.find_road(1, 0).unwrap();
        assert_eq!(reverse, 1);
        assert_eq!(graph.road(reverse).unwrap().base_travel_time(), 3.0);

        graph.set_flow(forward, 4.0).unwrap();
        assert_eq!(graph.road(forward).unwrap().current_flow(), 4.0);
        assert_eq!(graph.road(reverse).unwrap().current_flow(), 0.0);
    }

    #[test]
    fn outgoing_lists_only_origin_roads() {
        let mut graph = Graph::with_nodes(3);
        graph.add_edge(0, 1, attrs(1.0), false).unwrap();
        graph.add_edge(0, 2, attrs(1.0), false).unwrap();
        graph.add_edge(1, 2, attrs(1.0), false).unwrap();

        let mut targets: Vec<NodeId> = graph.outgoing(0).unwrap().map(Road::to).collect();
        targets.sort_unstable();
        assert_eq!(targets, vec![1, 2]);
        assert_eq!(graph.out_degree(2).unwrap(), 0);
        assert_eq!(graph.roads().count(), 3);
        assert!(graph.find_road(2, 0).is_none());
        assert!(graph.find_road(0, 9).is_none());
    }

    #[test]
    fn parallel_roads_resolve_to_first_added() {
        let mut graph = Graph::with_nodes(3);
        let first = graph.add_edge(0, 1, attrs(1.0), false).unwrap();
        graph.add_edge(0, 1, attrs(5.0), false).unwrap();
        graph.add_edge(0, 2, attrs(1.0), false).unwrap();
        graph.add_edge(0, 1, attrs(9.0), true).unwrap();

        assert_eq!(graph.find_road(0, 1), Some(first));
        assert_eq!(graph.find_road(0, 2), Some(2));
        assert_eq!(graph.find_road(1, 0), Some(4));
        assert_eq!(graph.out_degree(0).unwrap(), 4);
    }

    #[test]
    fn flows_update_and_reset() {
        let mut graph = Graph::with_nodes(3);
        graph.add_edge(0, 1, attrs(1.0), false).unwrap();
        graph.add_edge(0, 2, attrs(1.0), false).unwrap();

        graph.update_outgoing(0, |road| road.set_current_flow(2.0)).unwrap();
        graph.add_flow(1, 1.5).unwrap();
        assert_eq!(graph.road(0).unwrap().current_flow(), 2.0);
        assert_eq!(graph.road(1).unwrap().current_flow(), 3.5);

        graph.reset_flows();
        assert!(graph.roads().all(|road| road.current_flow() == 0.0));
    }
}
