use model::WorkRow;
use sqlx::prelude::FromRow;

use super::DatabaseRow;

/// A residence-amenity pair with both geometries in EPSG:4326.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct WorkRowRow {
    pub residence_id: i32,
    pub amenity_id: i32,
    pub residence_lat: f64,
    pub residence_lng: f64,
    pub amenity_lat: f64,
    pub amenity_lng: f64,
}

impl DatabaseRow for WorkRowRow {
    type Model = WorkRow;

    fn to_model(self) -> Self::Model {
        WorkRow {
            residence_id: self.residence_id,
            amenity_id: self.amenity_id,
            residence_lat: self.residence_lat,
            residence_lng: self.residence_lng,
            amenity_lat: self.amenity_lat,
            amenity_lng: self.amenity_lng,
        }
    }
}
