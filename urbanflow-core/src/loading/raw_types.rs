use serde::{Deserialize, Deserializer};

/// Row of `intersections.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct IntersectionRecord {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub has_signal: bool,
}

/// Row of `roads.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct RoadRecord {
    pub from: String,
    pub to: String,
    pub length: f64,
    pub time: f64,
    pub capacity: f64,
    #[serde(default)]
    pub road_type: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub bidirectional: bool,
}

/// Row of `vehicles.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub source: String,
    pub destination: String,
}

/// `1`/`0` or `true`/`false`; an empty cell is false
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    match value.trim() {
        "1" => Ok(true),
        "0" | "" => Ok(false),
        other if other.eq_ignore_ascii_case("true") => Ok(true),
        other if other.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected 1/0 or true/false, got '{other}'"
        ))),
    }
}
