use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::{
    models::auth::AuthenticatedUser,
    services::roles::RoleService,
    AppState,
};

pub(crate) fn detect_image_ext(content_type: &str, filename: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => return Some("png"),
        "image/jpeg" | "image/jpg" => return Some("jpg"),
        "image/webp" => return Some("webp"),
        "image/gif" => return Some("gif"),
        _ => {}
    }
    let ext = filename.rsplit('.').next()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        "webp" => Some("webp"),
        "gif" => Some("gif"),
        _ => None,
    }
}

async fn find_logo(media_dir: &str) -> Option<(PathBuf, String)> {
    let mut dir = tokio::fs::read_dir(media_dir).await.ok()?;
    while let Ok(Some(entry)) = dir.next_entry().await {
        let fname = entry.file_name().to_string_lossy().to_string();
        if fname.starts_with("logo.") {
            return Some((entry.path(), fname));
        }
    }
    None
}

/// PUT /logo — admin replaces the site logo. A single file keyed `logo.<ext>`
/// under the media dir.
pub async fn upload_logo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    let media_dir = PathBuf::from(&state.config.media_dir);
    tokio::fs::create_dir_all(&media_dir).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    // Remove any existing logo file
    if let Some((old_path, _)) = find_logo(&state.config.media_dir).await {
        let _ = tokio::fs::remove_file(old_path).await;
    }

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
    })? {
        let ct = field.content_type().unwrap_or("").to_string();
        let fname = field.file_name().unwrap_or("").to_string();

        let file_ext = detect_image_ext(&ct, &fname).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Unsupported format. Use PNG, JPG, WebP or GIF." })),
            )
        })?;

        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

        if data.len() > 5 * 1024 * 1024 {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "File too large (max 5 MB)" })),
            ));
        }

        let file_path = media_dir.join(format!("logo.{file_ext}"));
        tokio::fs::write(&file_path, &data).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })?;

        return Ok(Json(json!({ "ok": true })));
    }

    Err((
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "No file provided" })),
    ))
}

/// DELETE /logo — admin removes the site logo.
pub async fn delete_logo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    if let Some((path, _)) = find_logo(&state.config.media_dir).await {
        let _ = tokio::fs::remove_file(path).await;
    }

    Ok(Json(json!({ "ok": true })))
}

/// GET /logo — public endpoint used by the landing page header.
pub async fn serve_logo(State(state): State<AppState>) -> Result<Response<Body>, StatusCode> {
    let (file_path, fname) = find_logo(&state.config.media_dir)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    let ext = fname.rsplit('.').next().unwrap_or("").to_lowercase();

    let data = tokio::fs::read(&file_path)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let content_type = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(data))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
