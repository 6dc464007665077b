use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Certificate {
    pub id: i32,
    pub response_id: i32,
    pub filename: String,
    pub filepath: String,
}
