//! Discrete-time traffic simulation.
//!
//! Each tick advances the clock, moves every vehicle using travel times
//! derived from the flows left by the previous tick, rebuilds the flow of
//! every road from the vehicles still travelling, and retires the vehicles
//! that reached their destination.

use log::{debug, trace};
use serde::Serialize;

use super::{congestion::CongestionModel, vehicle::Vehicle};
use crate::model::Graph;

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickReport {
    /// Simulation time after the tick
    pub time: f64,
    /// Vehicles still travelling
    pub active: usize,
    /// Vehicles retired during the tick
    pub arrived: usize,
}

/// A vehicle that reached its destination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrival {
    pub vehicle_id: String,
    pub time: f64,
}

/// Moves vehicles over a road graph.
///
/// The simulator holds the graph exclusively for its lifetime and is the
/// only writer of road flows.
#[derive(Debug)]
pub struct Simulator<'a> {
    graph: &'a mut Graph,
    model: CongestionModel,
    vehicles: Vec<Vehicle>,
    arrivals: Vec<Arrival>,
    time: f64,
    step: f64,
}

impl<'a> Simulator<'a> {
    /// Creates an empty simulation at time zero.
    ///
    /// `step` must be finite and positive; the driver validates it before
    /// building a simulator.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `step` is not a finite positive number.
    pub fn new(graph: &'a mut Graph, model: CongestionModel, step: f64) -> Self {
        debug_assert!(
            step.is_finite() && step > 0.0,
            "simulation step must be finite and positive, got {step}"
        );
        Self {
            graph,
            model,
            vehicles: Vec::new(),
            arrivals: Vec::new(),
            time: 0.0,
            step,
        }
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
    }

    pub fn extend_vehicles<I>(&mut self, vehicles: I)
    where
        I: IntoIterator<Item = Vehicle>,
    {
        self.vehicles.extend(vehicles);
    }

    /// Vehicles still travelling
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn arrivals(&self) -> &[Arrival] {
        &self.arrivals
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn model(&self) -> &CongestionModel {
        &self.model
    }

    pub fn set_model(&mut self, model: CongestionModel) {
        self.model = model;
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    /// Advances the simulation by one step
    pub fn tick(&mut self) -> TickReport {
        self.time += self.step;
        self.move_vehicles();
        self.refresh_flows();
        let arrived = self.retire_arrived();

        TickReport {
            time: self.time,
            active: self.vehicles.len(),
            arrived,
        }
    }

    /// Runs `ticks` steps and returns the report of each
    pub fn run(&mut self, ticks: usize) -> Vec<TickReport> {
        let reports: Vec<TickReport> = (0..ticks).map(|_| self.tick()).collect();
        debug!(
            "Simulated {ticks} ticks up to t={}: {} vehicles active, {} arrived",
            self.time,
            self.vehicles.len(),
            self.arrivals.len()
        );
        reports
    }

    /// Rebuilds every road's flow from the vehicles currently on it
    pub fn refresh_flows(&mut self) {
        self.graph.reset_flows();
        for vehicle in &self.vehicles {
            let Some((from, to)) = vehicle.current_road() else {
                continue;
            };
            if let Some(road) = self
                .graph
                .find_road(from, to)
                .and_then(|edge| self.graph.road_mut(edge))
            {
                road.set_current_flow(road.current_flow() + 1.0);
            }
        }
    }

    /// Removes all vehicles and arrivals, rewinds the clock and clears flows
    pub fn reset(&mut self) {
        self.vehicles.clear();
        self.arrivals.clear();
        self.time = 0.0;
        self.graph.reset_flows();
    }

    fn move_vehicles(&mut self) {
        let graph = &*self.graph;
        let model = self.model;
        let step = self.step;

        for vehicle in &mut self.vehicles {
            let Some((from, to)) = vehicle.current_road() else {
                continue;
            };
            // Skip vehicles whose route does not match the graph
            let Some(road) = graph.find_road(from, to).and_then(|edge| graph.road(edge).ok())
            else {
                trace!("Vehicle {} has no road {from} -> {to}, skipping", vehicle.id());
                continue;
            };
            let travel_time = model.travel_time(road, vehicle.speed_factor());
            vehicle.advance(step, travel_time);
        }
    }

    fn retire_arrived(&mut self) -> usize {
        let time = self.time;
        let before = self.arrivals.len();
        let (arrived, active): (Vec<Vehicle>, Vec<Vehicle>) = std::mem::take(&mut self.vehicles)
            .into_iter()
            .partition(Vehicle::is_arrived);

        self.vehicles = active;
        self.arrivals.extend(arrived.into_iter().map(|vehicle| Arrival {
            vehicle_id: vehicle.id().to_string(),
            time,
        }));
        self.arrivals.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadAttributes;
    use crate::traffic::CongestionFunction;

    /// A=0 -> B=1 with capacity 10 and free-flow time 4
    fn single_road() -> Graph {
        let mut graph = Graph::with_nodes(2);
        graph
            .add_edge(0, 1, RoadAttributes::new(1.0, 4.0, 10.0), false)
            .unwrap();
        graph
    }

    fn five_vehicles() -> Vec<Vehicle> {
        (0..5)
            .map(|i| Vehicle::new(format!("v{i}"), 0, 1).with_route(vec![0, 1]))
            .collect()
    }

    #[test]
    fn congestion_delays_departure() {
        let mut graph = single_road();
        let mut sim = Simulator::new(
            &mut graph,
            CongestionModel::new(CongestionFunction::Bpr),
            1.0,
        );
        sim.extend_vehicles(five_vehicles());

        let first = sim.tick();
        assert_eq!(first.active, 5);
        assert_eq!(sim.graph().road(0).unwrap().current_flow(), 5.0);

        let road = sim.graph().road(0).unwrap();
        assert!((sim.model().travel_time(road, 1.0) - 4.0375).abs() < 1e-12);

        // Dwell reaches 4.0 but the congested road takes 4.0375
        for _ in 0..3 {
            assert_eq!(sim.tick().arrived, 0);
        }
        assert_eq!(sim.vehicles().len(), 5);

        let fifth = sim.tick();
        assert_eq!(fifth.arrived, 5);
        assert_eq!(fifth.active, 0);
        assert_eq!(fifth.time, 5.0);
        assert_eq!(sim.graph().road(0).unwrap().current_flow(), 0.0);
        assert!(sim.arrivals().iter().all(|arrival| arrival.time == 5.0));
    }

    #[test]
    fn free_road_departs_on_time() {
        let mut graph = single_road();
        let mut sim = Simulator::new(&mut graph, CongestionModel::default(), 1.0);
        sim.add_vehicle(Vehicle::new("solo", 0, 1).with_route(vec![0, 1]));

        // Refreshed flow already counts the vehicle itself
        sim.refresh_flows();
        let reports = sim.run(5);
        // Linear penalty at ratio 0.1 stretches 4.0 to 4.4
        assert_eq!(reports[3].arrived, 0);
        assert_eq!(reports[4].arrived, 1);
        assert_eq!(sim.arrivals()[0].vehicle_id, "solo");
    }

    #[test]
    fn missing_road_is_skipped() {
        let mut graph = single_road();
        let mut sim = Simulator::new(&mut graph, CongestionModel::default(), 1.0);
        sim.add_vehicle(Vehicle::new("lost", 1, 0).with_route(vec![1, 0]));
        sim.add_vehicle(Vehicle::new("ok", 0, 1).with_route(vec![0, 1]));

        let reports = sim.run(10);
        assert!(reports.iter().all(|report| report.active >= 1));
        assert_eq!(sim.vehicles().len(), 1);
        assert_eq!(sim.vehicles()[0].id(), "lost");
        assert_eq!(sim.arrivals().len(), 1);
    }

    #[test]
    fn trivial_route_arrives_on_first_tick() {
        let mut graph = single_road();
        let mut sim = Simulator::new(&mut graph, CongestionModel::default(), 0.5);
        sim.add_vehicle(Vehicle::new("home", 0, 0));

        let report = sim.tick();
        assert_eq!(report.time, 0.5);
        assert_eq!(report.arrived, 1);
    }

    #[test]
    fn parallel_roads_use_the_first_added() {
        // Road 0 takes 1, the parallel road 1 takes 5
        let mut graph = Graph::with_nodes(2);
        graph
            .add_edge(0, 1, RoadAttributes::new(1.0, 1.0, 10.0), false)
            .unwrap();
        graph
            .add_edge(0, 1, RoadAttributes::new(1.0, 5.0, 10.0), false)
            .unwrap();

        let mut shortest = crate::routing::ShortestPath::new(&graph);
        shortest.compute_travel_time(0).unwrap();
        assert_eq!(shortest.distance(1).unwrap(), 1.0);

        let mut sim = Simulator::new(&mut graph, CongestionModel::default(), 1.0);
        sim.add_vehicle(Vehicle::new("car", 0, 1).with_route(vec![0, 1]));
        let report = sim.tick();
        assert_eq!(report.arrived, 1);
        assert_eq!(sim.arrivals()[0].time, 1.0);
    }

    #[test]
    fn flows_land_on_the_first_parallel_road() {
        let mut graph = Graph::with_nodes(2);
        for time in [3.0, 6.0] {
            graph
                .add_edge(0, 1, RoadAttributes::new(1.0, time, 10.0), false)
                .unwrap();
        }
        let mut sim = Simulator::new(&mut graph, CongestionModel::default(), 1.0);
        sim.extend_vehicles(five_vehicles());
        sim.refresh_flows();

        assert_eq!(sim.graph().road(0).unwrap().current_flow(), 5.0);
        assert_eq!(sim.graph().road(1).unwrap().current_flow(), 0.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "simulation step must be finite and positive")]
    fn zero_step_is_rejected() {
        let mut graph = single_road();
        Simulator::new(&mut graph, CongestionModel::default(), 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut graph = single_road();
        let mut sim = Simulator::new(&mut graph, CongestionModel::default(), 1.0);
        sim.extend_vehicles(five_vehicles());
        sim.tick();

        sim.reset();
        assert_eq!(sim.time(), 0.0);
        assert!(sim.vehicles().is_empty());
        assert!(sim.arrivals().is_empty());
        assert_eq!(sim.graph().road(0).unwrap().current_flow(), 0.0);
    }
}
