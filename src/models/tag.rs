use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub slug: String,
}
