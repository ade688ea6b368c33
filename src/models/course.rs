use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub instructor: String,
    pub description: String,
    pub schedule: String,
    /// Display-only; no billing logic anywhere in the service.
    pub monthly_fee: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CourseInput {
    pub title: String,
    pub instructor: String,
    pub description: String,
    pub schedule: String,
    pub monthly_fee: i64,
}
