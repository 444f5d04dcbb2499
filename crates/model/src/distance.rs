use serde::{Deserialize, Serialize};

use crate::{costing::Costing, matrix::Measurement, work_row::WorkRow};

/// A measured residence-amenity pair, the unit written to every sink.
///
/// Field order matches the `residence_amenity_distances` insert and the CSV
/// column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub distance: Option<f64>,
    pub time: Option<i64>,
    pub amenity_id: i32,
    pub residence_id: i32,
    pub mode: Costing,
}

impl DistanceRecord {
    pub fn new(measurement: &Measurement, row: &WorkRow, mode: Costing) -> Self {
        Self {
            distance: measurement.distance,
            time: measurement.time,
            amenity_id: row.amenity_id,
            residence_id: row.residence_id,
            mode,
        }
    }

    /// Primary key of the stored record.
    pub fn key(&self) -> (i32, i32) {
        (self.residence_id, self.amenity_id)
    }

    /// The record as a comma separated line without trailing newline.
    /// Unreachable targets leave their distance/time fields empty.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.distance.map(|d| d.to_string()).unwrap_or_default(),
            self.time.map(|t| t.to_string()).unwrap_or_default(),
            self.amenity_id,
            self.residence_id,
            self.mode
        )
    }
}
