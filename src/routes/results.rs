use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::{
    models::{
        auth::AuthenticatedUser,
        result::{
            CreateTestResultRequest, DailyResult, DailyResultView, PostDailyResultRequest,
            ResultsResponse, TestResult, TestResultView,
        },
    },
    services::{
        results::{ResultError, ResultService},
        roles::RoleService,
    },
    AppState,
};

fn result_error(e: ResultError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        ResultError::CourseNotFound => StatusCode::NOT_FOUND,
        ResultError::InvalidDate => StatusCode::BAD_REQUEST,
        ResultError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

fn to_response(rows: (Vec<TestResult>, Vec<DailyResult>)) -> ResultsResponse {
    ResultsResponse {
        test_results: rows.0.into_iter().map(Into::into).collect(),
        daily_results: rows.1.into_iter().map(Into::into).collect(),
    }
}

/// POST /results/tests — admin records an immutable test result.
pub async fn create_test_result(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateTestResultRequest>,
) -> Result<(StatusCode, Json<TestResultView>), (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    if body.student.trim().is_empty() || body.grade.trim().is_empty() || body.feedback.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please fill in all fields" })),
        ));
    }

    ResultService::create_test(&state.db, &body)
        .await
        .map(|r| (StatusCode::CREATED, Json(r.into())))
        .map_err(result_error)
}

/// POST /results/daily — admin posts (or overwrites) the day's result for a
/// (student, course, type) slot.
pub async fn post_daily_result(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<PostDailyResultRequest>,
) -> Result<Json<DailyResultView>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    if body.student.trim().is_empty() || body.result_type.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please fill in all required fields" })),
        ));
    }

    ResultService::upsert_daily(&state.db, &body)
        .await
        .map(|r| Json(r.into()))
        .map_err(result_error)
}

pub async fn my_results(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ResultsResponse>, (StatusCode, Json<Value>)> {
    ResultService::for_student(&state.db, &user.principal)
        .await
        .map(|rows| Json(to_response(rows)))
        .map_err(result_error)
}

pub async fn results_by_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
) -> Result<Json<ResultsResponse>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    ResultService::for_student(&state.db, &principal)
        .await
        .map(|rows| Json(to_response(rows)))
        .map_err(result_error)
}

pub async fn results_by_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<i64>,
) -> Result<Json<ResultsResponse>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    ResultService::for_course(&state.db, course_id)
        .await
        .map(|rows| Json(to_response(rows)))
        .map_err(result_error)
}

/// GET /results/date/{YYYY-MM-DD} — admin only.
pub async fn results_by_date(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(day): Path<NaiveDate>,
) -> Result<Json<ResultsResponse>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    ResultService::for_day(&state.db, day)
        .await
        .map(|rows| Json(to_response(rows)))
        .map_err(result_error)
}
