//! Named-intersection layer over the road graph

use geo::Point;
use hashbrown::HashMap;

use super::components::{Intersection, Road, RoadAttributes, TrafficSignal};
use super::graph::Graph;
use crate::traffic::{CongestionModel, Simulator};
use crate::{EdgeId, Error, NodeId};

/// City model: the road graph plus intersection names, coordinates and
/// signals.
///
/// The intersection list and the graph's node set always have the same
/// length; they only grow together through [`CityModel::add_intersection`].
#[derive(Debug, Clone, Default)]
pub struct CityModel {
    graph: Graph,
    intersections: Vec<Intersection>,
    name_to_id: HashMap<String, NodeId>,
}

impl CityModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new intersection and the matching graph node
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIntersection`] if the name is already taken.
    pub fn add_intersection(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        has_signal: bool,
    ) -> Result<NodeId, Error> {
        if self.name_to_id.contains_key(name) {
            return Err(Error::DuplicateIntersection(name.to_string()));
        }

        let id = self.graph.add_node();
        debug_assert_eq!(id, self.intersections.len());

        self.intersections.push(Intersection {
            id,
            name: name.to_string(),
            location: Point::new(x, y),
            signal: has_signal.then(TrafficSignal::default),
        });
        self.name_to_id.insert(name.to_string(), id);

        Ok(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_id.contains_key(name)
    }

    /// Resolves an intersection name
    ///
    /// # Errors
    ///
    /// Returns [`Error::IntersectionNotFound`] for an unregistered name.
    pub fn node_id(&self, name: &str) -> Result<NodeId, Error> {
        self.try_node_id(name)
            .ok_or_else(|| Error::IntersectionNotFound(name.to_string()))
    }

    pub fn try_node_id(&self, name: &str) -> Option<NodeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn intersection(&self, id: NodeId) -> Result<&Intersection, Error> {
        self.intersections
            .get(id)
            .ok_or(Error::InvalidNodeIndex(id))
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// Name of an intersection
    pub fn name(&self, id: NodeId) -> Result<&str, Error> {
        self.intersection(id).map(|node| node.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn has_signal(&self, id: NodeId) -> Result<bool, Error> {
        self.intersection(id).map(Intersection::has_signal)
    }

    pub fn signal(&self, id: NodeId) -> Result<Option<&TrafficSignal>, Error> {
        self.intersection(id).map(|node| node.signal.as_ref())
    }

    /// Installs or replaces the signal at an intersection
    pub fn set_signal(&mut self, id: NodeId, signal: TrafficSignal) -> Result<(), Error> {
        self.intersection_mut(id)?.signal = Some(signal);
        Ok(())
    }

    /// Enabling keeps an existing signal or installs a default one,
    /// disabling removes it.
    pub fn enable_signal(&mut self, id: NodeId, enabled: bool) -> Result<(), Error> {
        let node = self.intersection_mut(id)?;
        if enabled {
            node.signal.get_or_insert_with(TrafficSignal::default);
        } else {
            node.signal = None;
        }
        Ok(())
    }

    /// Flips the green flag of an installed signal.
    ///
    /// Returns the new state, or `None` if the intersection has no signal.
    pub fn toggle_signal(&mut self, id: NodeId) -> Result<Option<bool>, Error> {
        let node = self.intersection_mut(id)?;
        Ok(node.signal.as_mut().map(|signal| {
            signal.is_green = !signal.is_green;
            signal.is_green
        }))
    }

    /// Adds a road between two intersections, see [`Graph::add_edge`]
    pub fn add_road(
        &mut self,
        from: NodeId,
        to: NodeId,
        attributes: RoadAttributes,
        bidirectional: bool,
    ) -> Result<EdgeId, Error> {
        self.graph.add_edge(from, to, attributes, bidirectional)
    }

    /// Adds a road between two intersections given by name
    pub fn add_road_by_name(
        &mut self,
        from: &str,
        to: &str,
        attributes: RoadAttributes,
        bidirectional: bool,
    ) -> Result<EdgeId, Error> {
        let from = self.node_id(from)?;
        let to = self.node_id(to)?;
        self.add_road(from, to, attributes, bidirectional)
    }

    pub fn out_degree(&self, id: NodeId) -> Result<usize, Error> {
        self.graph.out_degree(id)
    }

    pub fn outgoing(&self, id: NodeId) -> Result<impl Iterator<Item = &Road> + '_, Error> {
        self.graph.outgoing(id)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the road graph.
    ///
    /// Nodes can only be created through [`CityModel::add_intersection`], so
    /// the graph exposes roads and flows here but never grows its node set.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Simulator writing its flows into this city's roads
    pub fn simulator(&mut self, model: CongestionModel, step: f64) -> Simulator<'_> {
        Simulator::new(&mut self.graph, model, step)
    }

    /// Sets the current flow of a single road
    pub fn set_flow(&mut self, edge: EdgeId, flow: f64) -> Result<(), Error> {
        self.graph.set_flow(edge, flow)
    }

    pub fn reset_all_flows(&mut self) {
        self.graph.reset_flows();
    }

    /// Translates a route of node handles into intersection names
    pub fn route_names(&self, route: &[NodeId]) -> Result<Vec<&str>, Error> {
        route.iter().map(|&id| self.name(id)).collect()
    }

    fn intersection_mut(&mut self, id: NodeId) -> Result<&mut Intersection, Error> {
        self.intersections
            .get_mut(id)
            .ok_or(Error::InvalidNodeIndex(id))
    }
}
