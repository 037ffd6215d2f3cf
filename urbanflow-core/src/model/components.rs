//! Road network components - intersections, traffic signals and road segments

use std::str::FromStr;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{EdgeId, Error, NodeId};

/// Road classification, advisory only: no cost formula reads it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadClass {
    Highway,
    Arterial,
    #[default]
    Local,
}

impl FromStr for RoadClass {
    type Err = Error;

    /// Accepts the short and long spellings used in road tables.
    /// Anything unrecognised is a local road.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "HW" | "HIGHWAY" => RoadClass::Highway,
            "ART" | "ARTERIAL" => RoadClass::Arterial,
            _ => RoadClass::Local,
        })
    }
}

/// Traffic signal installed at an intersection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficSignal {
    /// Vehicles are allowed to pass while green
    pub is_green: bool,
    /// Full signal cycle in seconds
    pub cycle_time: f64,
    /// Fraction of the cycle spent green
    pub green_ratio: f64,
}

impl Default for TrafficSignal {
    fn default() -> Self {
        Self {
            is_green: true,
            cycle_time: 60.0,
            green_ratio: 0.6,
        }
    }
}

/// Intersection metadata kept by [`crate::model::CityModel`]
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub id: NodeId,
    /// Unique display name
    pub name: String,
    /// Abstract plane coordinates
    pub location: Point<f64>,
    pub signal: Option<TrafficSignal>,
}

impl Intersection {
    pub fn has_signal(&self) -> bool {
        self.signal.is_some()
    }
}

/// Static parameters of a road segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadAttributes {
    /// Physical length
    pub length: f64,
    /// Free-flow travel time
    pub base_travel_time: f64,
    /// Maximum throughput
    pub capacity: f64,
    pub class: RoadClass,
}

impl RoadAttributes {
    pub fn new(length: f64, base_travel_time: f64, capacity: f64) -> Self {
        Self {
            length,
            base_travel_time,
            capacity,
            class: RoadClass::Local,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: RoadClass) -> Self {
        self.class = class;
        self
    }
}

/// Directed road segment.
///
/// Static parameters are fixed at creation; only the current flow can be
/// changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    id: EdgeId,
    from: NodeId,
    to: NodeId,
    attributes: RoadAttributes,
    current_flow: f64,
}

impl Road {
    pub(crate) fn new(id: EdgeId, from: NodeId, to: NodeId, attributes: RoadAttributes) -> Self {
        Self {
            id,
            from,
            to,
            attributes,
            current_flow: 0.0,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn length(&self) -> f64 {
        self.attributes.length
    }

    pub fn base_travel_time(&self) -> f64 {
        self.attributes.base_travel_time
    }

    pub fn capacity(&self) -> f64 {
        self.attributes.capacity
    }

    pub fn class(&self) -> RoadClass {
        self.attributes.class
    }

    pub fn attributes(&self) -> RoadAttributes {
        self.attributes
    }

    pub fn current_flow(&self) -> f64 {
        self.current_flow
    }

    pub fn set_current_flow(&mut self, flow: f64) {
        self.current_flow = flow;
    }

    /// Current flow over capacity, `None` when the road has no usable capacity
    pub fn flow_ratio(&self) -> Option<f64> {
        (self.capacity() > 0.0).then(|| self.current_flow / self.capacity())
    }
}
