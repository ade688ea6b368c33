use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::models::course::Course;
use crate::models::enrollment::{
    CourseEnrollmentState, CoursesWithEnrollmentStatus, DerivedCourseStatus, Enrollment,
    EnrollmentAction,
};

/// Approval opens a validity window of this many days; past it the
/// enrollment reads as expired until renewed.
pub const VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("No enrollment exists for this student and course")]
    NotFound,
    #[error("Enrollment is already active")]
    AlreadyActive,
    #[error("An enrollment request is already pending")]
    AlreadyPending,
    #[error("Enrollment has expired; request a renewal instead")]
    RenewalRequired,
    #[error("Only expired enrollments can be renewed")]
    NotExpired,
    #[error("No pending request for this student and course")]
    NotPending,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Ordered checklist from the three id lists: active wins over expired wins
/// over pending; anything else is not enrolled. An id should not appear in
/// more than one list, but if it does this order governs.
pub fn derive_course_status(
    course_id: i64,
    active: &[i64],
    expired: &[i64],
    pending: &[i64],
) -> DerivedCourseStatus {
    let (state, action) = if active.contains(&course_id) {
        (CourseEnrollmentState::Active, EnrollmentAction::None)
    } else if expired.contains(&course_id) {
        (CourseEnrollmentState::Expired, EnrollmentAction::Renew)
    } else if pending.contains(&course_id) {
        (CourseEnrollmentState::Pending, EnrollmentAction::None)
    } else {
        (CourseEnrollmentState::NotEnrolled, EnrollmentAction::Enroll)
    };
    DerivedCourseStatus {
        course_id,
        state,
        action,
    }
}

pub struct EnrollmentService;

impl EnrollmentService {
    /// Flip approved enrollments whose window has lapsed. Expiry is computed
    /// by the backend only; callers observe it on the next read.
    pub async fn expire_overdue(pool: &PgPool) -> Result<u64, EnrollmentError> {
        let res = sqlx::query(
            "UPDATE enrollments SET status = 'expired'
             WHERE status = 'approved' AND expiry_date IS NOT NULL AND expiry_date < NOW()",
        )
        .execute(pool)
        .await?;
        Ok(res.rows_affected())
    }

    pub async fn expire_overdue_for_student(
        pool: &PgPool,
        student: &str,
    ) -> Result<(), EnrollmentError> {
        sqlx::query(
            "UPDATE enrollments SET status = 'expired'
             WHERE student = $1 AND status = 'approved'
               AND expiry_date IS NOT NULL AND expiry_date < NOW()",
        )
        .bind(student)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn find(
        pool: &PgPool,
        student: &str,
        course_id: i64,
    ) -> Result<Option<Enrollment>, EnrollmentError> {
        let row = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE student = $1 AND course_id = $2",
        )
        .bind(student)
        .bind(course_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    async fn course_exists(pool: &PgPool, course_id: i64) -> Result<bool, EnrollmentError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Student asks to join a course. A rejected enrollment may be
    /// re-requested; an expired one must go through renewal.
    pub async fn request(
        pool: &PgPool,
        student: &str,
        course_id: i64,
    ) -> Result<Enrollment, EnrollmentError> {
        if !Self::course_exists(pool, course_id).await? {
            return Err(EnrollmentError::CourseNotFound);
        }
        Self::expire_overdue_for_student(pool, student).await?;

        match Self::find(pool, student, course_id).await? {
            None => {
                let row = sqlx::query_as::<_, Enrollment>(
                    "INSERT INTO enrollments (student, course_id, status, renewal_request)
                     VALUES ($1, $2, 'pending', FALSE)
                     RETURNING *",
                )
                .bind(student)
                .bind(course_id)
                .fetch_one(pool)
                .await?;
                Ok(row)
            }
            Some(existing) => match existing.status.as_str() {
                "rejected" => {
                    let row = sqlx::query_as::<_, Enrollment>(
                        "UPDATE enrollments
                         SET status = 'pending', renewal_request = FALSE,
                             request_date = NOW(), approval_date = NULL, expiry_date = NULL
                         WHERE id = $1
                         RETURNING *",
                    )
                    .bind(existing.id)
                    .fetch_one(pool)
                    .await?;
                    Ok(row)
                }
                "pending" => Err(EnrollmentError::AlreadyPending),
                "approved" => Err(EnrollmentError::AlreadyActive),
                _ => Err(EnrollmentError::RenewalRequired),
            },
        }
    }

    /// Student asks to renew an expired enrollment.
    pub async fn request_renewal(
        pool: &PgPool,
        student: &str,
        course_id: i64,
    ) -> Result<Enrollment, EnrollmentError> {
        Self::expire_overdue_for_student(pool, student).await?;

        match Self::find(pool, student, course_id).await? {
            None => Err(EnrollmentError::NotFound),
            Some(existing) => match existing.status.as_str() {
                "expired" => {
                    let row = sqlx::query_as::<_, Enrollment>(
                        "UPDATE enrollments
                         SET status = 'pending', renewal_request = TRUE, request_date = NOW()
                         WHERE id = $1
                         RETURNING *",
                    )
                    .bind(existing.id)
                    .fetch_one(pool)
                    .await?;
                    Ok(row)
                }
                "pending" => Err(EnrollmentError::AlreadyPending),
                "approved" => Err(EnrollmentError::AlreadyActive),
                _ => Err(EnrollmentError::NotExpired),
            },
        }
    }

    /// Admin approves a pending request (first enrollment or renewal alike)
    /// and opens a fresh validity window.
    pub async fn approve(
        pool: &PgPool,
        student: &str,
        course_id: i64,
    ) -> Result<Enrollment, EnrollmentError> {
        let existing = Self::find(pool, student, course_id)
            .await?
            .ok_or(EnrollmentError::NotFound)?;
        if existing.status != "pending" {
            return Err(EnrollmentError::NotPending);
        }

        let now = Utc::now();
        let expiry = now + Duration::days(VALIDITY_DAYS);
        let row = sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments
             SET status = 'approved', renewal_request = FALSE,
                 approval_date = $1, expiry_date = $2
             WHERE id = $3
             RETURNING *",
        )
        .bind(now)
        .bind(expiry)
        .bind(existing.id)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn reject(
        pool: &PgPool,
        student: &str,
        course_id: i64,
    ) -> Result<Enrollment, EnrollmentError> {
        let existing = Self::find(pool, student, course_id)
            .await?
            .ok_or(EnrollmentError::NotFound)?;
        if existing.status != "pending" {
            return Err(EnrollmentError::NotPending);
        }

        let row = sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments
             SET status = 'rejected', renewal_request = FALSE
             WHERE id = $1
             RETURNING *",
        )
        .bind(existing.id)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Admin renews an expired enrollment directly, without a student
    /// request in between.
    pub async fn renew(
        pool: &PgPool,
        student: &str,
        course_id: i64,
    ) -> Result<Enrollment, EnrollmentError> {
        Self::expire_overdue_for_student(pool, student).await?;

        let existing = Self::find(pool, student, course_id)
            .await?
            .ok_or(EnrollmentError::NotFound)?;
        if existing.status != "expired" {
            return Err(EnrollmentError::NotExpired);
        }

        let now = Utc::now();
        let expiry = now + Duration::days(VALIDITY_DAYS);
        let row = sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments
             SET status = 'approved', renewal_request = FALSE,
                 approval_date = $1, expiry_date = $2
             WHERE id = $3
             RETURNING *",
        )
        .bind(now)
        .bind(expiry)
        .bind(existing.id)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    pub async fn list_for_student(
        pool: &PgPool,
        student: &str,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        Self::expire_overdue_for_student(pool, student).await?;
        let rows = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE student = $1 ORDER BY request_date DESC",
        )
        .bind(student)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_course(
        pool: &PgPool,
        course_id: i64,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        Self::expire_overdue(pool).await?;
        let rows = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE course_id = $1 ORDER BY request_date DESC",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// The combined query behind the student enrollment panel: every course
    /// plus the caller's active/expired/pending id lists and the derived
    /// per-course state.
    pub async fn courses_with_status(
        pool: &PgPool,
        student: &str,
    ) -> Result<CoursesWithEnrollmentStatus, EnrollmentError> {
        Self::expire_overdue_for_student(pool, student).await?;

        let courses = sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY id")
            .fetch_all(pool)
            .await?;
        let enrollments = sqlx::query_as::<_, Enrollment>(
            "SELECT * FROM enrollments WHERE student = $1",
        )
        .bind(student)
        .fetch_all(pool)
        .await?;

        let mut active = Vec::new();
        let mut expired = Vec::new();
        let mut pending = Vec::new();
        for e in &enrollments {
            match e.status.as_str() {
                "approved" => active.push(e.course_id),
                "expired" => expired.push(e.course_id),
                "pending" => pending.push(e.course_id),
                _ => {}
            }
        }

        let statuses = courses
            .iter()
            .map(|c| derive_course_status(c.id, &active, &expired, &pending))
            .collect();

        Ok(CoursesWithEnrollmentStatus {
            courses,
            active_enrollments: active,
            expired_enrollments: expired,
            enrollment_requests: pending,
            statuses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_course_gets_renew_action() {
        let derived = derive_course_status(7, &[], &[7], &[]);
        assert_eq!(derived.state, CourseEnrollmentState::Expired);
        assert_eq!(derived.action, EnrollmentAction::Renew);
    }

    #[test]
    fn unknown_course_gets_enroll_action() {
        let derived = derive_course_status(7, &[1], &[2], &[3]);
        assert_eq!(derived.state, CourseEnrollmentState::NotEnrolled);
        assert_eq!(derived.action, EnrollmentAction::Enroll);
    }

    #[test]
    fn active_and_pending_offer_no_action() {
        let active = derive_course_status(1, &[1], &[], &[]);
        assert_eq!(active.state, CourseEnrollmentState::Active);
        assert_eq!(active.action, EnrollmentAction::None);

        let pending = derive_course_status(3, &[], &[], &[3]);
        assert_eq!(pending.state, CourseEnrollmentState::Pending);
        assert_eq!(pending.action, EnrollmentAction::None);
    }

    #[test]
    fn list_precedence_governs_overlapping_ids() {
        // The same id in every list: active wins.
        let derived = derive_course_status(5, &[5], &[5], &[5]);
        assert_eq!(derived.state, CourseEnrollmentState::Active);

        // Absent from active: expired wins over pending.
        let derived = derive_course_status(5, &[], &[5], &[5]);
        assert_eq!(derived.state, CourseEnrollmentState::Expired);
        assert_eq!(derived.action, EnrollmentAction::Renew);
    }
}
