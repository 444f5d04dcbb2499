pub mod costing;
pub mod distance;
pub mod matrix;
pub mod point;
pub mod study_area;
pub mod work_row;

pub use costing::Costing;
pub use distance::DistanceRecord;
pub use matrix::{Location, MatrixRequest, MatrixResult, Measurement};
pub use point::Point;
pub use study_area::StudyArea;
pub use work_row::WorkRow;
