use batches::database::Result;
use model::StudyArea;
use sqlx::{Executor, Postgres};
use utility::let_also::LetAlso;

use crate::data_model::{study_area::StudyAreaRow, DatabaseRow};

use super::convert_error;

pub async fn get_by_name<'c, E>(executor: E, name: &str) -> Result<Option<StudyArea>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, description
        FROM study_areas
        WHERE name = $1;
        ",
    )
    .bind(name)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|row: Option<StudyAreaRow>| Ok(row.map(DatabaseRow::to_model)))
}
