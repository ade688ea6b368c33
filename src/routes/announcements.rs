use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    models::{
        announcement::{Announcement, AnnouncementInput},
        auth::AuthenticatedUser,
    },
    services::roles::RoleService,
    AppState,
};

fn validate(body: &AnnouncementInput) -> Option<(StatusCode, Json<Value>)> {
    if body.title.trim().is_empty() || body.message.trim().is_empty() || body.date.trim().is_empty()
    {
        return Some((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please fill in all fields" })),
        ));
    }
    None
}

/// GET /announcements — public endpoint, newest first.
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, (StatusCode, Json<Value>)> {
    sqlx::query_as::<_, Announcement>("SELECT * FROM announcements ORDER BY id DESC")
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

pub async fn create_announcement(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<AnnouncementInput>,
) -> Result<(StatusCode, Json<Announcement>), (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }
    if let Some(err) = validate(&body) {
        return Err(err);
    }

    sqlx::query_as::<_, Announcement>(
        "INSERT INTO announcements (title, date, message)
         VALUES ($1, $2, $3)
         RETURNING *",
    )
    .bind(body.title.trim())
    .bind(body.date.trim())
    .bind(body.message.trim())
    .fetch_one(&state.db)
    .await
    .map(|a| (StatusCode::CREATED, Json(a)))
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })
}

pub async fn update_announcement(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<AnnouncementInput>,
) -> Result<Json<Announcement>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }
    if let Some(err) = validate(&body) {
        return Err(err);
    }

    let announcement = sqlx::query_as::<_, Announcement>(
        "UPDATE announcements
         SET title = $1, date = $2, message = $3, updated_at = NOW()
         WHERE id = $4
         RETURNING *",
    )
    .bind(body.title.trim())
    .bind(body.date.trim())
    .bind(body.message.trim())
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    announcement.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Announcement not found" })),
    ))
}

pub async fn delete_announcement(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    let res = sqlx::query("DELETE FROM announcements WHERE id = $1")
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
            Json(json!({ "error": "Announcement not found" })),
        ));
    }
    Ok(Json(json!({ "message": "Announcement deleted" })))
}
