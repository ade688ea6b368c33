use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Singleton row (id = 1), created by the initial migration.
#[derive(Debug, Clone, FromRow)]
pub struct SiteSettings {
    pub id: i32,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl From<SiteSettings> for ContactDetails {
    fn from(s: SiteSettings) -> Self {
        Self {
            email: s.contact_email,
            phone: s.contact_phone,
            address: s.contact_address,
        }
    }
}
