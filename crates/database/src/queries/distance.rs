use batches::database::Result;
use model::DistanceRecord;
use sqlx::{Executor, Postgres};

use super::{convert_error, insert_all};

pub const COLUMNS: [&str; 5] = ["distance", "time", "amenity_id", "residence_id", "mode"];

/// Inserts `records` in a single statement. A stored key fails the whole
/// statement with [`batches::database::DatabaseError::Duplicate`].
pub async fn insert<'c, E>(executor: E, records: &[DistanceRecord]) -> Result<u64>
where
    E: Executor<'c, Database = Postgres>,
{
    if records.is_empty() {
        return Ok(0);
    }

    insert_all(
        executor,
        "residence_amenity_distances",
        &COLUMNS,
        records,
        |query, record| {
            query
                .bind(record.distance)
                .bind(record.time.and_then(|time| i32::try_from(time).ok()))
                .bind(record.amenity_id)
                .bind(record.residence_id)
                .bind(record.mode.as_str())
        },
    )
    .await
    .map(|result| result.rows_affected())
    .map_err(convert_error)
}
