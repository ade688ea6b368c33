use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::{
        auth::AuthenticatedUser,
        enrollment::{
            CoursesWithEnrollmentStatus, EnrollRequest, EnrollmentActionRequest, EnrollmentView,
        },
    },
    services::{
        enrollments::{EnrollmentError, EnrollmentService},
        roles::RoleService,
    },
    AppState,
};

fn enrollment_error(e: EnrollmentError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        EnrollmentError::CourseNotFound | EnrollmentError::NotFound => StatusCode::NOT_FOUND,
        EnrollmentError::AlreadyActive
        | EnrollmentError::AlreadyPending
        | EnrollmentError::RenewalRequired
        | EnrollmentError::NotExpired
        | EnrollmentError::NotPending => StatusCode::CONFLICT,
        EnrollmentError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

/// POST /enrollments/request — the caller asks to join a course.
pub async fn request_enrollment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<EnrollmentView>), (StatusCode, Json<Value>)> {
    EnrollmentService::request(&state.db, &user.principal, body.course_id)
        .await
        .map(|e| (StatusCode::CREATED, Json(e.into())))
        .map_err(enrollment_error)
}

/// POST /enrollments/renew-request — the caller asks to renew an expired
/// enrollment.
pub async fn request_renewal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<EnrollRequest>,
) -> Result<Json<EnrollmentView>, (StatusCode, Json<Value>)> {
    EnrollmentService::request_renewal(&state.db, &user.principal, body.course_id)
        .await
        .map(|e| Json(e.into()))
        .map_err(enrollment_error)
}

pub async fn approve_enrollment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<EnrollmentActionRequest>,
) -> Result<Json<EnrollmentView>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    EnrollmentService::approve(&state.db, &body.student, body.course_id)
        .await
        .map(|e| Json(e.into()))
        .map_err(enrollment_error)
}

pub async fn reject_enrollment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<EnrollmentActionRequest>,
) -> Result<Json<EnrollmentView>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    EnrollmentService::reject(&state.db, &body.student, body.course_id)
        .await
        .map(|e| Json(e.into()))
        .map_err(enrollment_error)
}

/// POST /enrollments/renew — admin renews an expired enrollment directly.
pub async fn renew_enrollment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<EnrollmentActionRequest>,
) -> Result<Json<EnrollmentView>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    EnrollmentService::renew(&state.db, &body.student, body.course_id)
        .await
        .map(|e| Json(e.into()))
        .map_err(enrollment_error)
}

pub async fn my_enrollments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<EnrollmentView>>, (StatusCode, Json<Value>)> {
    EnrollmentService::list_for_student(&state.db, &user.principal)
        .await
        .map(|rows| Json(rows.into_iter().map(Into::into).collect()))
        .map_err(enrollment_error)
}

pub async fn enrollments_by_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
) -> Result<Json<Vec<EnrollmentView>>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    EnrollmentService::list_for_student(&state.db, &principal)
        .await
        .map(|rows| Json(rows.into_iter().map(Into::into).collect()))
        .map_err(enrollment_error)
}

pub async fn enrollments_by_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<EnrollmentView>>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    EnrollmentService::list_for_course(&state.db, course_id)
        .await
        .map(|rows| Json(rows.into_iter().map(Into::into).collect()))
        .map_err(enrollment_error)
}

/// GET /courses/enrollment-status — the combined query behind the student
/// enrollment panel.
pub async fn courses_with_enrollment_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CoursesWithEnrollmentStatus>, (StatusCode, Json<Value>)> {
    EnrollmentService::courses_with_status(&state.db, &user.principal)
        .await
        .map(Json)
        .map_err(enrollment_error)
}
