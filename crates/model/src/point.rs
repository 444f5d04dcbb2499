use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A located entity (residence or amenity) as used for routing.
///
/// Two points are equal when id and both coordinates are bitwise equal, which
/// makes `Point` usable as a grouping key even though it carries floats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub id: i32,
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub fn new(id: i32, lat: f64, lng: f64) -> Self {
        Self { id, lat, lng }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.lat.to_bits() == other.lat.to_bits()
            && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.lat.to_bits().hash(state);
        self.lng.to_bits().hash(state);
    }
}
