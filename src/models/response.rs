use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SurveyResponse {
    pub id: i32,
    pub full_name: String,
    pub email_address: String,
    pub description: String,
    pub gender: String,
    pub programming_stack: String,
    pub date_responded: NaiveDateTime,
}
