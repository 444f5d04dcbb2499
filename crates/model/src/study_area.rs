use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyArea {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}
