use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct TestResult {
    pub id: i64,
    pub student: String,
    pub course_id: i64,
    pub score: i64,
    pub grade: String,
    pub pass: bool,
    pub feedback: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResultView {
    pub id: i64,
    pub student: String,
    pub course_id: i64,
    pub score: i64,
    pub grade: String,
    pub pass: bool,
    pub feedback: String,
    pub date: i64,
}

impl From<TestResult> for TestResultView {
    fn from(r: TestResult) -> Self {
        Self {
            id: r.id,
            student: r.student,
            course_id: r.course_id,
            score: r.score,
            grade: r.grade,
            pass: r.pass,
            feedback: r.feedback,
            date: r.date.timestamp_millis() * 1_000_000,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyResult {
    pub id: i64,
    pub student: String,
    pub course_id: i64,
    pub date: DateTime<Utc>,
    pub day: NaiveDate,
    pub result_type: String,
    pub score: i64,
    pub remarks: String,
}

/// List form carries no id: daily results are addressed by
/// (student, course, day, type) and overwritten in place.
#[derive(Debug, Clone, Serialize)]
pub struct DailyResultView {
    pub student: String,
    pub course_id: i64,
    pub date: i64,
    pub result_type: String,
    pub score: i64,
    pub remarks: String,
}

impl From<DailyResult> for DailyResultView {
    fn from(r: DailyResult) -> Self {
        Self {
            student: r.student,
            course_id: r.course_id,
            date: r.date.timestamp_millis() * 1_000_000,
            result_type: r.result_type,
            score: r.score,
            remarks: r.remarks,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTestResultRequest {
    pub student: String,
    pub course_id: i64,
    pub score: i64,
    pub grade: String,
    pub pass: bool,
    pub feedback: String,
    /// Nanoseconds since epoch.
    pub date: i64,
}

#[derive(Debug, Deserialize)]
pub struct PostDailyResultRequest {
    pub student: String,
    pub course_id: i64,
    /// Nanoseconds since epoch.
    pub date: i64,
    pub result_type: String,
    pub score: i64,
    pub remarks: Option<String>,
}

/// Every results query returns both families in one response.
#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub test_results: Vec<TestResultView>,
    pub daily_results: Vec<DailyResultView>,
}
