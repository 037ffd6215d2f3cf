//! Road network model
//!
//! Contains the directed road graph and the named-intersection layer on top of it.

pub mod city;
pub mod components;
pub mod graph;

pub use city::CityModel;
pub use components::{Intersection, Road, RoadAttributes, RoadClass, TrafficSignal};
pub use graph::Graph;
