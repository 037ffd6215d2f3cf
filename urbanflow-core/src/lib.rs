//! Road network analysis and traffic simulation.
//!
//! The crate models a city as a directed road graph and provides shortest
//! route search (Dijkstra and A*), maximum throughput with its bottleneck
//! cut (Dinic), intersection importance (degree, closeness and Brandes
//! betweenness), a flow-dependent congestion model and a tick-based vehicle
//! simulator that feeds vehicle positions back into road load.

pub mod algo;
pub mod error;
pub mod export;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod traffic;

pub use error::Error;

/// Dense handle of an intersection inside a [`model::Graph`]
pub type NodeId = usize;
/// Dense handle of a directed road segment inside a [`model::Graph`]
pub type EdgeId = usize;

/// Residual capacities and tie tolerances below this value count as zero
pub const EPSILON: f64 = 1e-12;
