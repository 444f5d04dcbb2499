use model::StudyArea;
use sqlx::prelude::FromRow;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct StudyAreaRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl DatabaseRow for StudyAreaRow {
    type Model = StudyArea;

    fn to_model(self) -> Self::Model {
        StudyArea {
            id: self.id,
            name: self.name,
            description: self.description,
        }
    }
}
