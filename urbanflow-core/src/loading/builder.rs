use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;

use super::config::CityDataConfig;
use super::parser::read_records;
use super::raw_types::{IntersectionRecord, RoadRecord, VehicleRecord};
use crate::{
    Error,
    model::{CityModel, RoadAttributes, RoadClass},
    traffic::Vehicle,
};

/// A loaded city: the road network and the trips to simulate on it.
///
/// Vehicles carry resolved source and destination handles but no route yet.
#[derive(Debug, Clone, Default)]
pub struct CityData {
    pub city: CityModel,
    pub vehicles: Vec<Vehicle>,
}

/// Loads the three city tables from the configured data directory
///
/// # Errors
///
/// Returns an error if a table cannot be opened or read, if an intersection
/// name is registered twice, or if a road or vehicle refers to an unknown
/// intersection.
pub fn load_city(config: &CityDataConfig) -> Result<CityData, Error> {
    if !config.data_dir().is_dir() {
        return Err(Error::InvalidData(format!(
            "Data directory not found: {}",
            config.data_dir().display()
        )));
    }

    info!("Loading city data from {}", config.data_dir().display());
    load_city_from_readers(
        open_table(&config.intersections_path())?,
        open_table(&config.roads_path())?,
        open_table(&config.vehicles_path())?,
    )
}

/// Builds a city from any three readers holding the intersection, road and
/// vehicle tables
///
/// # Errors
///
/// See [`load_city`].
pub fn load_city_from_readers<I, R, V>(
    intersections: I,
    roads: R,
    vehicles: V,
) -> Result<CityData, Error>
where
    I: Read,
    R: Read,
    V: Read,
{
    let mut city = CityModel::new();

    let intersection_records: Vec<IntersectionRecord> =
        read_records(intersections, "intersections")?;
    for record in &intersection_records {
        city.add_intersection(&record.name, record.x, record.y, record.has_signal)?;
    }
    info!("Loaded {} intersections", city.len());

    let road_records: Vec<RoadRecord> = read_records(roads, "roads")?;
    for record in &road_records {
        let class = record
            .road_type
            .parse::<RoadClass>()
            .unwrap_or_default();
        let attributes =
            RoadAttributes::new(record.length, record.time, record.capacity).with_class(class);
        city.add_road_by_name(&record.from, &record.to, attributes, record.bidirectional)?;
    }
    info!(
        "Loaded {} road records as {} directed roads",
        road_records.len(),
        city.graph().edge_count()
    );

    let vehicle_records: Vec<VehicleRecord> = read_records(vehicles, "vehicles")?;
    let vehicles = vehicle_records
        .into_iter()
        .map(|record| {
            let source = city.node_id(&record.source)?;
            let destination = city.node_id(&record.destination)?;
            Ok(Vehicle::new(record.id, source, destination))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    info!("Loaded {} vehicles", vehicles.len());

    Ok(CityData { city, vehicles })
}

fn open_table(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERSECTIONS: &str = "\
name,x,y,has_signal
A,0,0,1
B,100,0,0
C,100,100,0
";

    const ROADS: &str = "\
from,to,length,time,capacity,road_type,bidirectional
A,B,100,2,500,HW,1
B,C,100,3,200,ART,0
# closed for works
C,A,150,9,100,LOCAL,0
";

    const VEHICLES: &str = "\
id,source,destination
car1,A,C
car2,C,B
";

    #[test]
    fn builds_city_and_vehicles() {
        let data = load_city_from_readers(
            INTERSECTIONS.as_bytes(),
            ROADS.as_bytes(),
            VEHICLES.as_bytes(),
        )
        .unwrap();

        let city = &data.city;
        assert_eq!(city.len(), 3);
        assert!(city.has_signal(0).unwrap());
        // A-B counts twice, the commented road not at all
        assert_eq!(city.graph().edge_count(), 3);

        let ab = city.graph().find_road(0, 1).unwrap();
        let road = city.graph().road(ab).unwrap();
        assert_eq!(road.class(), RoadClass::Highway);
        assert_eq!(road.capacity(), 500.0);
        assert!(city.graph().find_road(1, 0).is_some());
        assert!(city.graph().find_road(2, 0).is_none());

        assert_eq!(data.vehicles.len(), 2);
        assert_eq!(data.vehicles[0].id(), "car1");
        assert_eq!(data.vehicles[0].source(), 0);
        assert_eq!(data.vehicles[0].destination(), 2);
        assert!(data.vehicles[0].route().is_empty());
    }

    #[test]
    fn unknown_intersection_is_not_found() {
        let roads = "from,to,length,time,capacity,road_type,bidirectional\nA,Z,1,1,1,,0\n";
        let err = load_city_from_readers(INTERSECTIONS.as_bytes(), roads.as_bytes(), &b""[..])
            .unwrap_err();
        assert!(matches!(err, Error::IntersectionNotFound(name) if name == "Z"));

        let vehicles = "id,source,destination\nv,A,Nowhere\n";
        let err = load_city_from_readers(
            INTERSECTIONS.as_bytes(),
            ROADS.as_bytes(),
            vehicles.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::IntersectionNotFound(_)));
    }

    #[test]
    fn duplicate_intersection_fails() {
        let intersections = "name,x,y,has_signal\nA,0,0,0\nA,1,1,0\n";
        let err = load_city_from_readers(intersections.as_bytes(), &b""[..], &b""[..])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateIntersection(_)));
    }

    #[test]
    fn missing_directory_is_reported() {
        let config = CityDataConfig::new("/definitely/not/a/real/dir");
        assert!(matches!(load_city(&config), Err(Error::InvalidData(_))));
    }
}
