use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::course::Course;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Approved => "approved",
            EnrollmentStatus::Rejected => "rejected",
            EnrollmentStatus::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for EnrollmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EnrollmentStatus::Pending),
            "approved" => Ok(EnrollmentStatus::Approved),
            "rejected" => Ok(EnrollmentStatus::Rejected),
            "expired" => Ok(EnrollmentStatus::Expired),
            _ => Err(anyhow::anyhow!("Unknown enrollment status: {s}")),
        }
    }
}

/// DB row struct — status is stored as TEXT constrained by the schema.
#[derive(Debug, Clone, FromRow)]
pub struct Enrollment {
    pub id: i64,
    pub student: String,
    pub course_id: i64,
    pub status: String,
    pub renewal_request: bool,
    pub request_date: DateTime<Utc>,
    pub approval_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Wire form: dates as nanoseconds since epoch, matching the attendance and
/// results surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentView {
    pub student: String,
    pub course_id: i64,
    pub status: EnrollmentStatus,
    pub renewal_request: bool,
    pub request_date: i64,
    pub approval_date: Option<i64>,
    pub expiry_date: Option<i64>,
}

impl From<Enrollment> for EnrollmentView {
    fn from(e: Enrollment) -> Self {
        Self {
            student: e.student,
            course_id: e.course_id,
            status: e.status.parse().unwrap_or(EnrollmentStatus::Pending),
            renewal_request: e.renewal_request,
            request_date: e.request_date.timestamp_millis() * 1_000_000,
            approval_date: e.approval_date.map(|d| d.timestamp_millis() * 1_000_000),
            expiry_date: e.expiry_date.map(|d| d.timestamp_millis() * 1_000_000),
        }
    }
}

/// Student-initiated request bodies carry only the course id; the student is
/// the caller's principal.
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: i64,
}

/// Admin actions address a specific (student, course) pair.
#[derive(Debug, Deserialize)]
pub struct EnrollmentActionRequest {
    pub student: String,
    pub course_id: i64,
}

/// Per-course classification derived from the three id lists.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseEnrollmentState {
    Active,
    Expired,
    Pending,
    NotEnrolled,
}

/// The single action a student may take on a course in a given state.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentAction {
    Enroll,
    Renew,
    None,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DerivedCourseStatus {
    pub course_id: i64,
    pub state: CourseEnrollmentState,
    pub action: EnrollmentAction,
}

/// Combined query result: every course, the caller's three id lists, and the
/// per-course classification derived from them.
#[derive(Debug, Serialize)]
pub struct CoursesWithEnrollmentStatus {
    pub courses: Vec<Course>,
    pub active_enrollments: Vec<i64>,
    pub expired_enrollments: Vec<i64>,
    pub enrollment_requests: Vec<i64>,
    pub statuses: Vec<DerivedCourseStatus>,
}
