use serde::{Deserialize, Serialize};

use crate::{costing::Costing, point::Point};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl From<&Point> for Location {
    fn from(point: &Point) -> Self {
        Self {
            lat: point.lat,
            lon: point.lng,
        }
    }
}

/// Body of a `sources_to_targets` request: a single source and the targets
/// to measure from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRequest {
    pub sources: Vec<Location>,
    pub targets: Vec<Location>,
    pub costing: Costing,
}

impl MatrixRequest {
    pub fn new(source: &Point, targets: &[Point], costing: Costing) -> Self {
        Self {
            sources: vec![Location::from(source)],
            targets: targets.iter().map(Location::from).collect(),
            costing,
        }
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

/// Distance (km) and time (s) from the source to one target. The routing
/// engine reports `null` for targets it cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub distance: Option<f64>,
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_index: Option<u32>,
}

impl Measurement {
    pub fn new(distance: f64, time: i64) -> Self {
        Self {
            distance: Some(distance),
            time: Some(time),
            to_index: None,
            from_index: None,
        }
    }
}

/// Measurements in the same order as the targets of the originating request.
pub type MatrixResult = Vec<Measurement>;
