use serde::Serialize;

use crate::NodeId;

/// Progress of a vehicle along its route
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum VehicleState {
    /// Travelling on the road `route[edge_cursor] -> route[edge_cursor + 1]`,
    /// `dwell` time units after entering it
    EnRoute { edge_cursor: usize, dwell: f64 },
    Arrived,
}

/// A trip between two intersections.
///
/// The route is the node sequence chosen by a route search; an empty or
/// single-node route means the vehicle is already at its destination.
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    id: String,
    source: NodeId,
    destination: NodeId,
    route: Vec<NodeId>,
    cursor: usize,
    dwell: f64,
    speed_factor: f64,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, source: NodeId, destination: NodeId) -> Self {
        Self {
            id: id.into(),
            source,
            destination,
            route: Vec::new(),
            cursor: 0,
            dwell: 0.0,
            speed_factor: 1.0,
        }
    }

    /// Replaces the route and restarts the trip from its first node
    pub fn with_route(mut self, route: Vec<NodeId>) -> Self {
        self.set_route(route);
        self
    }

    pub fn with_speed_factor(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }

    pub fn set_route(&mut self, route: Vec<NodeId>) {
        self.route = route;
        self.cursor = 0;
        self.dwell = 0.0;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    pub fn route(&self) -> &[NodeId] {
        &self.route
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn dwell(&self) -> f64 {
        self.dwell
    }

    pub fn is_arrived(&self) -> bool {
        self.cursor + 1 >= self.route.len()
    }

    /// Endpoints of the road the vehicle is currently on
    pub fn current_road(&self) -> Option<(NodeId, NodeId)> {
        if self.is_arrived() {
            return None;
        }
        Some((self.route[self.cursor], self.route[self.cursor + 1]))
    }

    pub fn state(&self) -> VehicleState {
        if self.is_arrived() {
            VehicleState::Arrived
        } else {
            VehicleState::EnRoute {
                edge_cursor: self.cursor,
                dwell: self.dwell,
            }
        }
    }

    /// Spends `step` on the current road and moves to the next one once the
    /// accumulated time covers `travel_time`
    pub(crate) fn advance(&mut self, step: f64, travel_time: f64) {
        if self.is_arrived() {
            return;
        }
        self.dwell += step;
        if self.dwell >= travel_time {
            self.cursor += 1;
            self.dwell = 0.0;
        }
    }
}
