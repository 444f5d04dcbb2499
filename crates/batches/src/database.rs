use std::{error, fmt, result};

use async_trait::async_trait;
use model::{DistanceRecord, StudyArea, WorkRow};

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    /// A unique constraint was violated. Carries the driver message.
    Duplicate(String),
    Other(Box<dyn error::Error + Send + Sync>),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::Duplicate(message) => write!(f, "duplicate key: {message}"),
            Self::Other(why) => write!(f, "{why}"),
        }
    }
}

impl error::Error for DatabaseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Other(why) => Some(why.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait DistanceRepo: Send + Sync + 'static {
    /// Inserts all records in one statement. Fails with
    /// [`DatabaseError::Duplicate`] without inserting anything if one key is
    /// already stored.
    async fn insert_distances(&self, records: &[DistanceRecord]) -> Result<u64>;
}

#[async_trait]
pub trait StudyAreaRepo: Send + Sync {
    async fn study_area_by_name(&self, name: &str) -> Result<Option<StudyArea>>;
}

/// Filters applied when selecting residence-amenity pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkFilter {
    pub category: Option<String>,
    pub name: Option<String>,
}

/// The residence-amenity pairs of a study area, readable page by page.
/// Pages are ordered by `(residence_id, amenity_id)` so consecutive pages
/// neither overlap nor skip rows.
#[async_trait]
pub trait WorkRowSource: Send + Sync {
    async fn count(&self) -> Result<u64>;
    async fn page(&self, start: u64, limit: u64) -> Result<Vec<WorkRow>>;
}

