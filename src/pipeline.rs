//! The full analysis run: network statistics, vehicle routing and traffic
//! simulation over one loaded city.

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{debug, info, warn};
use urbanflow_core::prelude::*;

use crate::config::AppConfig;

/// Everything the run reports besides the two CSV exports
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub intersections: usize,
    pub roads: usize,
    pub vehicles: usize,
    /// Free-flow travel time from the first intersection, `None` if
    /// unreachable
    pub travel_time_from_origin: Vec<Option<f64>>,
    /// A* travel time from the first to the last intersection
    pub origin_to_last: Option<f64>,
    pub degree: Vec<f64>,
    pub closeness: Vec<f64>,
    pub betweenness: Vec<f64>,
    pub max_flow: Option<ThroughputSummary>,
    pub simulation: SimulationSummary,
    pub edge_loads: Vec<EdgeLoad>,
}

/// Maximum flow from the first to the last intersection and the roads that
/// limit it
#[derive(Debug, Clone, Serialize)]
pub struct ThroughputSummary {
    pub source: String,
    pub sink: String,
    pub value: f64,
    pub bottleneck: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub ticks: usize,
    pub time: f64,
    pub active: usize,
    pub unrouted: Vec<String>,
    pub arrivals: Vec<Arrival>,
}

/// Results of a run, ready to be written out
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub summary: Summary,
    pub routes: Vec<RouteExport>,
    pub congestion: Vec<EdgeCongestion>,
}

/// Analyses the network, routes every vehicle and simulates the traffic
///
/// # Errors
/// Returns error if the city has no intersections.
pub fn run(data: CityData, config: &AppConfig) -> Result<RunOutput> {
    let CityData {
        mut city,
        mut vehicles,
    } = data;

    if city.is_empty() {
        bail!("City has no intersections");
    }
    let last = city.len() - 1;

    let travel_time_from_origin = origin_travel_times(&city)?;

    let origin_to_last = if last > 0 {
        let mut search = HeuristicSearch::new(&city);
        search.compute_travel_time(0, last)?;
        let distance = search.distance(last)?;
        info!("A* travel time 0 -> {last}: {distance}");
        distance.is_finite().then_some(distance)
    } else {
        None
    };

    let centrality = Centrality::new(city.graph());
    let degree = centrality.degree()?;
    let closeness = centrality.closeness()?;
    let betweenness = centrality.betweenness();
    debug!("Centrality computed for {} intersections", city.len());

    let max_flow = if last > 0 {
        Some(throughput(&city, 0, last)?)
    } else {
        None
    };

    let unrouted = assign_routes(&city, &mut vehicles)?;
    let routes = route_exports(&city, &vehicles).context("Failed to resolve vehicle routes")?;

    let vehicle_count = vehicles.len();
    // Vehicles without a route never enter the road network
    let routed = vehicles
        .into_iter()
        .filter(|vehicle| !vehicle.route().is_empty());
    let simulation = simulate(&mut city, routed, config, unrouted);
    let congestion = edge_congestion(&city)?;

    let summary = Summary {
        intersections: city.len(),
        roads: city.graph().edge_count(),
        vehicles: vehicle_count,
        travel_time_from_origin,
        origin_to_last,
        degree,
        closeness,
        betweenness,
        max_flow,
        simulation,
        edge_loads: edge_loads(city.graph()),
    };

    Ok(RunOutput {
        summary,
        routes,
        congestion,
    })
}

fn origin_travel_times(city: &CityModel) -> Result<Vec<Option<f64>>> {
    let mut shortest = ShortestPath::new(city.graph());
    shortest.compute_travel_time(0)?;

    let times: Vec<Option<f64>> = shortest
        .distances()
        .iter()
        .map(|dist| dist.is_finite().then_some(*dist))
        .collect();
    info!(
        "{} of {} intersections reachable from the origin",
        times.iter().flatten().count(),
        times.len()
    );
    Ok(times)
}

fn throughput(city: &CityModel, source: NodeId, sink: NodeId) -> Result<ThroughputSummary> {
    let mut flow = MaxFlow::new(city.graph());
    let value = flow.compute(source, sink)?;

    let bottleneck = flow
        .min_cut_edges(source)?
        .into_iter()
        .map(|edge| {
            let road = city.graph().road(edge)?;
            Ok((
                city.name(road.from())?.to_string(),
                city.name(road.to())?.to_string(),
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    info!(
        "Max flow {} -> {}: {value} through {} bottleneck roads",
        city.name(source)?,
        city.name(sink)?,
        bottleneck.len()
    );

    Ok(ThroughputSummary {
        source: city.name(source)?.to_string(),
        sink: city.name(sink)?.to_string(),
        value,
        bottleneck,
    })
}

/// Gives every vehicle its free-flow A* route and returns the ids of the
/// vehicles whose destination cannot be reached
fn assign_routes(city: &CityModel, vehicles: &mut [Vehicle]) -> Result<Vec<String>> {
    let mut search = HeuristicSearch::new(city);
    let mut unrouted = Vec::new();

    for vehicle in vehicles.iter_mut() {
        let route = search.route(vehicle.source(), vehicle.destination(), free_flow_time)?;
        if route.is_empty() {
            warn!(
                "Vehicle {} cannot reach {} from {}",
                vehicle.id(),
                city.name(vehicle.destination())?,
                city.name(vehicle.source())?
            );
            unrouted.push(vehicle.id().to_string());
        }
        vehicle.set_route(route);
    }

    Ok(unrouted)
}

fn simulate(
    city: &mut CityModel,
    vehicles: impl IntoIterator<Item = Vehicle>,
    config: &AppConfig,
    unrouted: Vec<String>,
) -> SimulationSummary {
    let mut sim = city.simulator(config.congestion, config.step);
    sim.extend_vehicles(vehicles);

    info!("Simulating {} ticks of {}", config.ticks, config.step);
    for _ in 0..config.ticks {
        let report = sim.tick();
        debug!(
            "time={} vehicles={} arrived={}",
            report.time, report.active, report.arrived
        );
    }

    info!(
        "Simulation finished at t={}: {} arrived, {} still travelling",
        sim.time(),
        sim.arrivals().len(),
        sim.vehicles().len()
    );

    SimulationSummary {
        ticks: config.ticks,
        time: sim.time(),
        active: sim.vehicles().len(),
        unrouted,
        arrivals: sim.arrivals().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERSECTIONS: &str = "\
name,x,y,has_signal
A,0,0,1
B,1,0,0
C,2,0,0
D,5,5,0
";

    const ROADS: &str = "\
from,to,length,time,capacity,road_type,bidirectional
A,B,1,2,10,HW,1
B,C,1,3,10,ART,1
";

    const VEHICLES: &str = "\
id,source,destination
car1,A,C
car2,C,A
stuck,A,D
";

    fn city_data() -> CityData {
        load_city_from_readers(
            INTERSECTIONS.as_bytes(),
            ROADS.as_bytes(),
            VEHICLES.as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn full_run() {
        let config = AppConfig {
            ticks: 30,
            ..AppConfig::default()
        };
        let output = run(city_data(), &config).unwrap();
        let summary = &output.summary;

        assert_eq!(summary.intersections, 4);
        assert_eq!(summary.roads, 4);
        assert_eq!(
            summary.travel_time_from_origin,
            vec![Some(0.0), Some(2.0), Some(5.0), None]
        );
        // D is isolated
        assert_eq!(summary.origin_to_last, None);
        assert_eq!(summary.max_flow.as_ref().unwrap().value, 0.0);
        assert_eq!(summary.betweenness[1], 2.0);

        assert_eq!(output.routes[0].nodes, vec!["A", "B", "C"]);
        assert!(output.routes[2].nodes.is_empty());
        assert_eq!(summary.simulation.unrouted, vec!["stuck".to_string()]);

        // Everyone has arrived after 30 ticks, so the roads are empty again
        assert_eq!(summary.simulation.active, 0);
        assert_eq!(summary.simulation.arrivals.len(), 2);
        assert!(
            summary
                .simulation
                .arrivals
                .iter()
                .all(|arrival| arrival.vehicle_id != "stuck")
        );
        assert_eq!(summary.vehicles, 3);
        assert!(output.congestion.iter().all(|row| row.factor == 0.0));
    }

    #[test]
    fn congestion_snapshot_mid_run() {
        let config = AppConfig {
            ticks: 1,
            ..AppConfig::default()
        };
        let output = run(city_data(), &config).unwrap();

        // car1 sits on A -> B and car2 on C -> B, both with the same ratio
        let busy: Vec<_> = output
            .congestion
            .iter()
            .filter(|row| row.factor > 0.0)
            .map(|row| (row.from.as_str(), row.to.as_str(), row.factor))
            .collect();
        assert_eq!(busy, vec![("A", "B", 1.0), ("C", "B", 1.0)]);

        // The unroutable vehicle is reported, not counted as arrived
        let simulation = &output.summary.simulation;
        assert!(simulation.arrivals.is_empty());
        assert_eq!(simulation.active, 2);
        assert_eq!(simulation.unrouted, vec!["stuck".to_string()]);
    }

    #[test]
    fn empty_city_is_an_error() {
        let data = load_city_from_readers(&b""[..], &b""[..], &b""[..]).unwrap();
        assert!(run(data, &AppConfig::default()).is_err());
    }
}
