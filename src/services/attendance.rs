use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

use crate::models::attendance::{AttendanceEntry, AttendanceRow, AttendanceStatus, DayStatus};
use crate::services::calendar;

pub struct AttendanceService;

impl AttendanceService {
    /// One row per (student, day): marking an already-marked day overwrites
    /// its status in place.
    pub async fn mark(
        pool: &PgPool,
        student: &str,
        day: NaiveDate,
        status: AttendanceStatus,
    ) -> anyhow::Result<AttendanceRow> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            "INSERT INTO attendance (student, day, status)
             VALUES ($1, $2, $3)
             ON CONFLICT (student, day)
             DO UPDATE SET status = EXCLUDED.status, marked_at = NOW()
             RETURNING *",
        )
        .bind(student)
        .bind(day)
        .bind(status.to_string())
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn status_on(
        pool: &PgPool,
        student: &str,
        day: NaiveDate,
    ) -> anyhow::Result<Option<AttendanceStatus>> {
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM attendance WHERE student = $1 AND day = $2",
        )
        .bind(student)
        .bind(day)
        .fetch_optional(pool)
        .await?;
        Ok(status.and_then(|s| s.parse().ok()))
    }

    /// Apply the additive toggle for a day and persist the outcome as a
    /// single write. Returns the status that was written.
    pub async fn toggle(
        pool: &PgPool,
        student: &str,
        day: NaiveDate,
    ) -> anyhow::Result<AttendanceRow> {
        let current = match Self::status_on(pool, student, day).await? {
            Some(AttendanceStatus::Present) => DayStatus::Present,
            Some(AttendanceStatus::Absent) => DayStatus::Absent,
            None => DayStatus::Unmarked,
        };
        Self::mark(pool, student, day, calendar::toggled(current)).await
    }

    pub async fn list_for_student(
        pool: &PgPool,
        student: &str,
    ) -> anyhow::Result<Vec<AttendanceRow>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance WHERE student = $1 ORDER BY day",
        )
        .bind(student)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_range(
        pool: &PgPool,
        student: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> anyhow::Result<Vec<AttendanceRow>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT * FROM attendance
             WHERE student = $1 AND day >= $2 AND day <= $3
             ORDER BY day",
        )
        .bind(student)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Wire form: each stored day becomes a noon-UTC nanosecond timestamp.
    pub fn entries(rows: &[AttendanceRow]) -> Vec<AttendanceEntry> {
        rows.iter()
            .filter_map(|row| {
                let date = calendar::day_to_timestamp(
                    row.day.year(),
                    row.day.month(),
                    row.day.day(),
                )?;
                let status = row.status.parse().ok()?;
                Some(AttendanceEntry { date, status })
            })
            .collect()
    }
}
