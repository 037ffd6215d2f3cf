pub use crate::{EPSILON, EdgeId, Error, NodeId};

// Network model
pub use crate::model::{
    CityModel, Graph, Intersection, Road, RoadAttributes, RoadClass, TrafficSignal,
};

// Routing
pub use crate::routing::{
    Heuristic, HeuristicSearch, NoHeuristic, ShortestPath, StraightLine, free_flow_time,
    road_length,
};

// Network analysis
pub use crate::algo::{Centrality, MaxFlow, normalize_betweenness};

// Traffic
pub use crate::traffic::{
    Arrival, CongestionFunction, CongestionModel, Simulator, TickReport, Vehicle, VehicleState,
};

// Data exchange with loaders and exporters
pub use crate::export::{
    EdgeCongestion, EdgeLoad, RouteExport, edge_congestion, edge_loads, route_exports,
    write_edge_congestion, write_vehicle_paths,
};
pub use crate::loading::{CityData, CityDataConfig, load_city, load_city_from_readers};
