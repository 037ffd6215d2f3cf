//! Network analysis: throughput and intersection importance

pub mod centrality;
pub mod max_flow;

pub use centrality::{Centrality, normalize_betweenness};
pub use max_flow::MaxFlow;
