use std::fmt::Write as _;

use batches::database::DatabaseError;
use sqlx::{
    postgres::{PgArguments, PgQueryResult},
    query::Query,
    Executor, Postgres,
};

pub mod distance;
pub mod study_area;
pub mod work_row;

pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            DatabaseError::Duplicate(db.message().to_owned())
        }
        _ => DatabaseError::Other(Box::new(why)),
    }
}

/// Builds `INSERT INTO table (a, b) VALUES ($1, $2), ($3, $4), ...` for
/// `rows` rows of `columns.len()` placeholders each.
pub(crate) fn insert_statement(table: &str, columns: &[&str], rows: usize) -> String {
    let mut query_str = format!("INSERT INTO {} ({}) VALUES ", table, columns.join(", "));
    let mut placeholder_index = 1;
    for i in 0..rows {
        if i > 0 {
            query_str.push_str(", ");
        }
        query_str.push('(');
        for j in 0..columns.len() {
            if j > 0 {
                query_str.push_str(", ");
            }
            let _ = write!(&mut query_str, "${}", placeholder_index);
            placeholder_index += 1;
        }
        query_str.push(')');
    }
    query_str.push(';');
    query_str
}

// bulk insert

/// Inserts all `values` in one statement. Either every row is stored or
/// none is.
pub async fn insert_all<'c, E, T, B>(
    executor: E,
    table: &str,
    columns: &[&str],
    values: &[T],
    bind: B,
) -> Result<PgQueryResult, sqlx::Error>
where
    E: Executor<'c, Database = Postgres>,
    for<'a> B:
        Fn(Query<'a, Postgres, PgArguments>, &T) -> Query<'a, Postgres, PgArguments>,
{
    let query_str = insert_statement(table, columns, values.len());

    let mut query = sqlx::query::<Postgres>(&query_str);
    for value in values {
        query = bind(query, value);
    }
    query.execute(executor).await
}
