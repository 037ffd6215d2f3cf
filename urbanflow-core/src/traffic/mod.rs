//! Vehicle movement and flow-dependent travel times

pub mod congestion;
pub mod simulator;
pub mod vehicle;

pub use congestion::{CongestionFunction, CongestionModel};
pub use simulator::{Arrival, Simulator, TickReport};
pub use vehicle::{Vehicle, VehicleState};
