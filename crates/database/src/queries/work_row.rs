use batches::database::{Result, WorkFilter};
use model::WorkRow;
use sqlx::{Executor, Postgres};
use utility::let_also::LetAlso;

use crate::data_model::{to_models, work_row::WorkRowRow, CountRow};

use super::convert_error;

pub async fn count<'c, E>(executor: E, study_area_id: i32, filter: &WorkFilter) -> Result<u64>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, CountRow>(
        "
        SELECT COUNT(*) AS count
        FROM residence_amenity_distances_straight s
        JOIN amenities a ON a.id = s.amenity_id
        WHERE a.study_area_id = $1
            AND ($2::TEXT IS NULL OR a.category = $2)
            AND ($3::TEXT IS NULL OR a.name = $3);
        ",
    )
    .bind(study_area_id)
    .bind(filter.category.as_deref())
    .bind(filter.name.as_deref())
    .fetch_one(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: CountRow| Ok(row.count.max(0) as u64))
}

/// Rows `start..start + limit` ordered by residence and amenity, with both
/// geometries transformed to EPSG:4326.
pub async fn page<'c, E>(
    executor: E,
    study_area_id: i32,
    filter: &WorkFilter,
    start: u64,
    limit: u64,
) -> Result<Vec<WorkRow>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as::<_, WorkRowRow>(
        "
        SELECT
            s.residence_id,
            s.amenity_id,
            ST_Y(ST_Transform(r.geom, 4326)) AS residence_lat,
            ST_X(ST_Transform(r.geom, 4326)) AS residence_lng,
            ST_Y(ST_Transform(a.geom, 4326)) AS amenity_lat,
            ST_X(ST_Transform(a.geom, 4326)) AS amenity_lng
        FROM residence_amenity_distances_straight s
        JOIN residences r ON r.id = s.residence_id
        JOIN amenities a ON a.id = s.amenity_id
        WHERE a.study_area_id = $1
            AND ($2::TEXT IS NULL OR a.category = $2)
            AND ($3::TEXT IS NULL OR a.name = $3)
        ORDER BY s.residence_id, s.amenity_id
        OFFSET $4
        LIMIT $5;
        ",
    )
    .bind(study_area_id)
    .bind(filter.category.as_deref())
    .bind(filter.name.as_deref())
    .bind(start as i64)
    .bind(limit as i64)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|rows: Vec<WorkRowRow>| Ok(to_models(rows)))
}
