use serde::{Deserialize, Serialize};

use crate::point::Point;

/// One residence-amenity pair that still needs a network measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkRow {
    pub residence_id: i32,
    pub amenity_id: i32,
    pub residence_lat: f64,
    pub residence_lng: f64,
    pub amenity_lat: f64,
    pub amenity_lng: f64,
}

impl WorkRow {
    pub fn new(residence: Point, amenity: Point) -> Self {
        Self {
            residence_id: residence.id,
            amenity_id: amenity.id,
            residence_lat: residence.lat,
            residence_lng: residence.lng,
            amenity_lat: amenity.lat,
            amenity_lng: amenity.lng,
        }
    }

    pub fn residence(&self) -> Point {
        Point::new(self.residence_id, self.residence_lat, self.residence_lng)
    }

    pub fn amenity(&self) -> Point {
        Point::new(self.amenity_id, self.amenity_lat, self.amenity_lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_points() {
        let residence = Point::new(7, 54.3, 10.1);
        let amenity = Point::new(42, 54.31, 10.12);
        let row = WorkRow::new(residence, amenity);

        assert_eq!(row.residence(), residence);
        assert_eq!(row.amenity(), amenity);
        assert_eq!(row.residence_id, 7);
        assert_eq!(row.amenity_id, 42);
    }
}
