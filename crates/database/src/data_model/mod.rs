use sqlx::prelude::FromRow;

pub mod study_area;
pub mod work_row;

/// A row that maps onto one model value.
pub trait DatabaseRow {
    type Model;

    fn to_model(self) -> Self::Model;
}

pub fn to_models<R: DatabaseRow>(rows: Vec<R>) -> Vec<R::Model> {
    rows.into_iter().map(DatabaseRow::to_model).collect()
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct CountRow {
    pub count: i64,
}
