use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::models::result::{
    CreateTestResultRequest, DailyResult, PostDailyResultRequest, TestResult,
};

#[derive(Debug, Error)]
pub enum ResultError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("Invalid result timestamp")]
    InvalidDate,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

fn date_from_nanos(nanos: i64) -> Result<DateTime<Utc>, ResultError> {
    DateTime::from_timestamp_millis(nanos / 1_000_000).ok_or(ResultError::InvalidDate)
}

async fn ensure_course(pool: &PgPool, course_id: i64) -> Result<(), ResultError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
        .bind(course_id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(ResultError::CourseNotFound)
    }
}

pub struct ResultService;

impl ResultService {
    /// Test results are immutable history: every submission appends.
    pub async fn create_test(
        pool: &PgPool,
        req: &CreateTestResultRequest,
    ) -> Result<TestResult, ResultError> {
        ensure_course(pool, req.course_id).await?;
        let date = date_from_nanos(req.date)?;

        let row = sqlx::query_as::<_, TestResult>(
            "INSERT INTO test_results (student, course_id, score, grade, pass, feedback, date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&req.student)
        .bind(req.course_id)
        .bind(req.score)
        .bind(&req.grade)
        .bind(req.pass)
        .bind(&req.feedback)
        .bind(date)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Daily results are addressed by (student, course, day, type): posting
    /// the same slot again overwrites score and remarks.
    pub async fn upsert_daily(
        pool: &PgPool,
        req: &PostDailyResultRequest,
    ) -> Result<DailyResult, ResultError> {
        ensure_course(pool, req.course_id).await?;
        let date = date_from_nanos(req.date)?;
        let day = date.date_naive();
        let remarks = req.remarks.clone().unwrap_or_default();

        let row = sqlx::query_as::<_, DailyResult>(
            "INSERT INTO daily_results (student, course_id, date, day, result_type, score, remarks)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (student, course_id, day, result_type)
             DO UPDATE SET date = EXCLUDED.date, score = EXCLUDED.score,
                           remarks = EXCLUDED.remarks
             RETURNING *",
        )
        .bind(&req.student)
        .bind(req.course_id)
        .bind(date)
        .bind(day)
        .bind(&req.result_type)
        .bind(req.score)
        .bind(remarks)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn for_student(
        pool: &PgPool,
        student: &str,
    ) -> Result<(Vec<TestResult>, Vec<DailyResult>), ResultError> {
        let tests = sqlx::query_as::<_, TestResult>(
            "SELECT * FROM test_results WHERE student = $1 ORDER BY date DESC",
        )
        .bind(student)
        .fetch_all(pool)
        .await?;
        let daily = sqlx::query_as::<_, DailyResult>(
            "SELECT * FROM daily_results WHERE student = $1 ORDER BY date DESC",
        )
        .bind(student)
        .fetch_all(pool)
        .await?;
        Ok((tests, daily))
    }

    pub async fn for_course(
        pool: &PgPool,
        course_id: i64,
    ) -> Result<(Vec<TestResult>, Vec<DailyResult>), ResultError> {
        let tests = sqlx::query_as::<_, TestResult>(
            "SELECT * FROM test_results WHERE course_id = $1 ORDER BY date DESC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;
        let daily = sqlx::query_as::<_, DailyResult>(
            "SELECT * FROM daily_results WHERE course_id = $1 ORDER BY date DESC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;
        Ok((tests, daily))
    }

    pub async fn for_day(
        pool: &PgPool,
        day: NaiveDate,
    ) -> Result<(Vec<TestResult>, Vec<DailyResult>), ResultError> {
        let tests = sqlx::query_as::<_, TestResult>(
            "SELECT * FROM test_results WHERE date::date = $1 ORDER BY date DESC",
        )
        .bind(day)
        .fetch_all(pool)
        .await?;
        let daily = sqlx::query_as::<_, DailyResult>(
            "SELECT * FROM daily_results WHERE day = $1 ORDER BY date DESC",
        )
        .bind(day)
        .fetch_all(pool)
        .await?;
        Ok((tests, daily))
    }
}
