//! Loading city data (intersections, roads and vehicle trips) from CSV
//! tables and building a [`CityModel`](crate::model::CityModel) from them.

mod builder;
mod config;
mod parser;
mod raw_types;

pub use builder::{CityData, load_city, load_city_from_readers};
pub use config::CityDataConfig;
pub use parser::read_records;
pub use raw_types::{IntersectionRecord, RoadRecord, VehicleRecord};
