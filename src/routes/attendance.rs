use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::{
    models::{
        attendance::{
            AttendanceDay, AttendanceEntry, AttendanceRangeQuery, MarkAttendanceRequest,
            ToggleAttendanceRequest,
        },
        auth::AuthenticatedUser,
    },
    services::{attendance::AttendanceService, calendar, roles::RoleService},
    AppState,
};

fn invalid_date() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid attendance date" })),
    )
}

fn internal(e: anyhow::Error) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

/// POST /attendance/mark — admin sets a day to an explicit status. One row
/// per (student, day); re-marking overwrites.
pub async fn mark_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<MarkAttendanceRequest>,
) -> Result<Json<AttendanceEntry>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    let (year, month, day) = calendar::timestamp_to_day(body.date).ok_or_else(invalid_date)?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid_date)?;

    let row = AttendanceService::mark(&state.db, &body.student, date, body.status)
        .await
        .map_err(internal)?;
    AttendanceService::entries(&[row])
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(invalid_date)
}

/// POST /attendance/toggle — admin cycles a day: unmarked and absent become
/// present, present becomes absent. Returns the status that was written.
pub async fn toggle_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<ToggleAttendanceRequest>,
) -> Result<Json<AttendanceEntry>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    let date =
        NaiveDate::from_ymd_opt(body.year, body.month, body.day).ok_or_else(invalid_date)?;

    let row = AttendanceService::toggle(&state.db, &body.student, date)
        .await
        .map_err(internal)?;
    AttendanceService::entries(&[row])
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(invalid_date)
}

pub async fn my_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<AttendanceEntry>>, (StatusCode, Json<Value>)> {
    AttendanceService::list_for_student(&state.db, &user.principal)
        .await
        .map(|rows| Json(AttendanceService::entries(&rows)))
        .map_err(internal)
}

pub async fn attendance_by_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
) -> Result<Json<Vec<AttendanceEntry>>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    AttendanceService::list_for_student(&state.db, &principal)
        .await
        .map(|rows| Json(AttendanceService::entries(&rows)))
        .map_err(internal)
}

/// GET /attendance/student/{principal}/month/{year}/{month} — every day of
/// the month classified present/absent/unmarked for calendar rendering.
pub async fn attendance_month(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((principal, year, month)): Path<(String, i32, u32)>,
) -> Result<Json<Vec<AttendanceDay>>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_self_or_admin(role, &user.principal, &principal) {
        return Err(err);
    }
    if !(1..=12).contains(&month) {
        return Err(invalid_date());
    }

    let rows = AttendanceService::list_for_student(&state.db, &principal)
        .await
        .map_err(internal)?;
    let lookup = calendar::build_lookup(&AttendanceService::entries(&rows));
    Ok(Json(calendar::month_days(year, month, &lookup)))
}

/// GET /attendance/student/{principal}/range?from=&to= — inclusive
/// nanosecond-timestamp bounds.
pub async fn attendance_range(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
    Query(query): Query<AttendanceRangeQuery>,
) -> Result<Json<Vec<AttendanceEntry>>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_self_or_admin(role, &user.principal, &principal) {
        return Err(err);
    }

    let (fy, fm, fd) = calendar::timestamp_to_day(query.from).ok_or_else(invalid_date)?;
    let (ty, tm, td) = calendar::timestamp_to_day(query.to).ok_or_else(invalid_date)?;
    let from = NaiveDate::from_ymd_opt(fy, fm, fd).ok_or_else(invalid_date)?;
    let to = NaiveDate::from_ymd_opt(ty, tm, td).ok_or_else(invalid_date)?;

    AttendanceService::list_range(&state.db, &principal, from, to)
        .await
        .map(|rows| Json(AttendanceService::entries(&rows)))
        .map_err(internal)
}
