use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One profile per student, keyed by the caller's principal. The profile
/// photo lives on disk under the media dir and is served separately.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentProfile {
    pub principal: String,
    pub name: String,
    pub age: i64,
    pub class_name: String,
    pub school: String,
    pub batch: String,
    pub tuition_center: String,
    pub parent_mobile_number: String,
    pub date_of_birth: String,
    pub student_mobile_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update body. Every field except `student_mobile_number` is
/// mandatory; validation happens before any write.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub age: i64,
    pub class_name: String,
    pub school: String,
    pub batch: String,
    pub tuition_center: String,
    pub parent_mobile_number: String,
    pub date_of_birth: String,
    pub student_mobile_number: Option<String>,
}

/// Caller's own profile plus the completion flags a client needs to decide
/// whether to show the blocking profile-setup form.
#[derive(Debug, Serialize)]
pub struct CallerProfileResponse {
    pub profile: Option<StudentProfile>,
    pub has_photo: bool,
    pub complete: bool,
}
