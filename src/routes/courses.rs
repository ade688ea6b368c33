use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::{
        auth::AuthenticatedUser,
        course::{Course, CourseInput},
    },
    services::roles::RoleService,
    AppState,
};

fn validate(body: &CourseInput) -> Option<(StatusCode, Json<Value>)> {
    if body.title.trim().is_empty()
        || body.instructor.trim().is_empty()
        || body.description.trim().is_empty()
        || body.schedule.trim().is_empty()
    {
        return Some((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please fill in all fields" })),
        ));
    }
    if body.monthly_fee < 0 {
        return Some((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Monthly fee cannot be negative" })),
        ));
    }
    None
}

/// GET /courses — public endpoint, backs the landing page course list.
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, (StatusCode, Json<Value>)> {
    sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY id")
        .fetch_all(&state.db)
        .await
        .map(Json)
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, (StatusCode, Json<Value>)> {
    let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    course.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Course not found" })),
    ))
}

pub async fn create_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CourseInput>,
) -> Result<(StatusCode, Json<Course>), (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }
    if let Some(err) = validate(&body) {
        return Err(err);
    }

    sqlx::query_as::<_, Course>(
        "INSERT INTO courses (title, instructor, description, schedule, monthly_fee)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(body.title.trim())
    .bind(body.instructor.trim())
    .bind(body.description.trim())
    .bind(body.schedule.trim())
    .bind(body.monthly_fee)
    .fetch_one(&state.db)
    .await
    .map(|course| (StatusCode::CREATED, Json(course)))
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })
}

pub async fn update_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<CourseInput>,
) -> Result<Json<Course>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }
    if let Some(err) = validate(&body) {
        return Err(err);
    }

    let course = sqlx::query_as::<_, Course>(
        "UPDATE courses
         SET title = $1, instructor = $2, description = $3, schedule = $4,
             monthly_fee = $5, updated_at = NOW()
         WHERE id = $6
         RETURNING *",
    )
    .bind(body.title.trim())
    .bind(body.instructor.trim())
    .bind(body.description.trim())
    .bind(body.schedule.trim())
    .bind(body.monthly_fee)
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    course.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Course not found" })),
    ))
}

/// DELETE /courses/{id} — enrollment and result rows cascade with the course.
pub async fn delete_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    let res = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

    if res.rows_affected() == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Course not found" })),
        ));
    }
    Ok(Json(json!({ "message": "Course deleted" })))
}
