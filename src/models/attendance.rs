use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted status. "Unmarked" is the absence of a row, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AttendanceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(anyhow::anyhow!("Unknown attendance status: {s}")),
        }
    }
}

/// Derived three-state classification used for calendar rendering.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Present,
    Absent,
    Unmarked,
}

/// DB row struct — status stored as TEXT constrained by the schema.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceRow {
    pub id: i64,
    pub student: String,
    pub day: NaiveDate,
    pub status: String,
    pub marked_at: DateTime<Utc>,
}

/// Wire form: `date` is nanoseconds since epoch, pinned to noon UTC of the
/// marked day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub date: i64,
    pub status: AttendanceStatus,
}

/// One classified day of a month, for calendar rendering.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AttendanceDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub status: DayStatus,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub student: String,
    /// Nanoseconds since epoch; the day is extracted in UTC.
    pub date: i64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Deserialize)]
pub struct ToggleAttendanceRequest {
    pub student: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceRangeQuery {
    /// Nanoseconds since epoch, inclusive bounds.
    pub from: i64,
    pub to: i64,
}
