//! Road loads, congestion factors and vehicle routes in a form external
//! viewers can consume.

use std::io::Write;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    Error, NodeId,
    model::{CityModel, Graph, Road},
    traffic::Vehicle,
};

/// Load of one directed road
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeLoad {
    pub from: NodeId,
    pub to: NodeId,
    pub current_flow: f64,
    pub capacity: f64,
}

/// Congestion of one directed road relative to the most congested road
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeCongestion {
    pub from: String,
    pub to: String,
    pub factor: f64,
}

/// A vehicle's route as intersection names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteExport {
    pub vehicle_id: String,
    pub nodes: Vec<String>,
}

/// `(origin, destination, current flow, capacity)` of every road in handle
/// order
pub fn edge_loads(graph: &Graph) -> Vec<EdgeLoad> {
    graph
        .roads()
        .map(|road| EdgeLoad {
            from: road.from(),
            to: road.to(),
            current_flow: road.current_flow(),
            capacity: road.capacity(),
        })
        .collect()
}

/// Flow ratio of every road divided by the largest ratio in the network, so
/// the busiest road has factor 1. Roads without capacity count as empty.
///
/// # Errors
///
/// Returns [`Error::InvalidNodeIndex`] if a road endpoint has no
/// intersection, which cannot happen for a consistently built city.
pub fn edge_congestion(city: &CityModel) -> Result<Vec<EdgeCongestion>, Error> {
    let ratio = |road: &Road| road.flow_ratio().unwrap_or(0.0);

    let max_ratio = city.graph().roads().map(ratio).fold(0.0, f64::max);
    let scale = if max_ratio > 0.0 { max_ratio } else { 1.0 };

    city.graph()
        .roads()
        .map(|road| {
            Ok(EdgeCongestion {
                from: city.name(road.from())?.to_string(),
                to: city.name(road.to())?.to_string(),
                factor: ratio(road) / scale,
            })
        })
        .collect()
}

/// Resolves every vehicle's route to intersection names
pub fn route_exports(city: &CityModel, vehicles: &[Vehicle]) -> Result<Vec<RouteExport>, Error> {
    vehicles
        .iter()
        .map(|vehicle| {
            let nodes = city
                .route_names(vehicle.route())?
                .into_iter()
                .map(str::to_string)
                .collect();
            Ok(RouteExport {
                vehicle_id: vehicle.id().to_string(),
                nodes,
            })
        })
        .collect()
}

/// Writes one `id;A,B,C` line per route
///
/// # Errors
///
/// Returns [`Error::IoError`] if writing fails.
pub fn write_vehicle_paths<W: Write>(mut writer: W, routes: &[RouteExport]) -> Result<(), Error> {
    for route in routes {
        writeln!(writer, "{};{}", route.vehicle_id, route.nodes.iter().join(","))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes headerless `from,to,factor` rows
///
/// # Errors
///
/// Returns [`Error::CsvError`] if writing fails.
pub fn write_edge_congestion<W: Write>(writer: W, rows: &[EdgeCongestion]) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadAttributes;

    fn city() -> CityModel {
        let mut city = CityModel::new();
        for name in ["A", "B", "C"] {
            city.add_intersection(name, 0.0, 0.0, false).unwrap();
        }
        city.add_road(0, 1, RoadAttributes::new(1.0, 1.0, 10.0), false)
            .unwrap();
        city.add_road(1, 2, RoadAttributes::new(1.0, 1.0, 20.0), false)
            .unwrap();
        city.add_road(2, 0, RoadAttributes::new(1.0, 1.0, 0.0), false)
            .unwrap();
        city
    }

    #[test]
    fn congestion_is_normalized() {
        let mut city = city();
        city.set_flow(0, 5.0).unwrap();
        city.set_flow(1, 5.0).unwrap();
        city.set_flow(2, 7.0).unwrap();

        let rows = edge_congestion(&city).unwrap();
        assert_eq!(rows[0].factor, 1.0);
        assert_eq!(rows[1].factor, 0.5);
        assert_eq!(rows[2].factor, 0.0);
        assert_eq!((rows[1].from.as_str(), rows[1].to.as_str()), ("B", "C"));

        let mut out = Vec::new();
        write_edge_congestion(&mut out, &rows).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "A,B,1.0\nB,C,0.5\nC,A,0.0\n");
    }

    #[test]
    fn empty_network_keeps_zero_factors() {
        let rows = edge_congestion(&city()).unwrap();
        assert!(rows.iter().all(|row| row.factor == 0.0));
    }

    #[test]
    fn loads_follow_road_order() {
        let mut city = city();
        city.set_flow(1, 3.0).unwrap();
        let loads = edge_loads(city.graph());
        assert_eq!(loads.len(), 3);
        assert_eq!(
            loads[1],
            EdgeLoad {
                from: 1,
                to: 2,
                current_flow: 3.0,
                capacity: 20.0
            }
        );
    }

    #[test]
    fn vehicle_paths_format() {
        let city = city();
        let vehicles = vec![
            Vehicle::new("car1", 0, 2).with_route(vec![0, 1, 2]),
            Vehicle::new("car2", 1, 1),
        ];
        let routes = route_exports(&city, &vehicles).unwrap();
        assert_eq!(routes[0].nodes, vec!["A", "B", "C"]);

        let mut out = Vec::new();
        write_vehicle_paths(&mut out, &routes).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "car1;A,B,C\ncar2;\n");
    }
}
