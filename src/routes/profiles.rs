use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::{
    models::{
        auth::AuthenticatedUser,
        profile::{CallerProfileResponse, ProfileInput, StudentProfile},
    },
    services::{
        profiles::{self, ProfileError, ProfileService},
        roles::RoleService,
    },
    AppState,
};

use super::logo::detect_image_ext;

fn profile_error(e: ProfileError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        ProfileError::AlreadyExists => StatusCode::CONFLICT,
        ProfileError::NotFound => StatusCode::NOT_FOUND,
        ProfileError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

/// Principals become file names under the photos dir, so path metacharacters
/// are rejected outright.
fn check_principal(principal: &str) -> Result<(), (StatusCode, Json<Value>)> {
    if principal.is_empty() || principal.contains('/') || principal.contains("..") {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid principal" })),
        ));
    }
    Ok(())
}

async fn find_photo(media_dir: &str, principal: &str) -> Option<PathBuf> {
    let dir = PathBuf::from(media_dir).join("photos");
    let mut rd = tokio::fs::read_dir(&dir).await.ok()?;
    let prefix = format!("{principal}.");
    while let Ok(Some(entry)) = rd.next_entry().await {
        let fname = entry.file_name().to_string_lossy().to_string();
        if fname.starts_with(&prefix) {
            return Some(entry.path());
        }
    }
    None
}

/// POST /profiles — the caller creates their own profile. All fields except
/// the secondary mobile number are mandatory.
pub async fn create_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<ProfileInput>,
) -> Result<(StatusCode, Json<StudentProfile>), (StatusCode, Json<Value>)> {
    let input = profiles::validate(&body)
        .map_err(|msg| (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))))?;

    ProfileService::create(&state.db, &user.principal, &input)
        .await
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(profile_error)
}

/// GET /profiles/me — the caller's profile plus the completion flags behind
/// the blocking profile-setup form.
pub async fn get_my_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CallerProfileResponse>, (StatusCode, Json<Value>)> {
    let profile = ProfileService::get(&state.db, &user.principal)
        .await
        .map_err(profile_error)?;
    let has_photo = find_photo(&state.config.media_dir, &user.principal)
        .await
        .is_some();
    let complete = profile.is_some() && has_photo;

    Ok(Json(CallerProfileResponse {
        profile,
        has_photo,
        complete,
    }))
}

/// GET /profiles — admin only; every (principal, profile) pair.
pub async fn list_profiles(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<StudentProfile>>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    ProfileService::list(&state.db)
        .await
        .map(Json)
        .map_err(profile_error)
}

/// GET /profiles/{principal} — admin only.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
) -> Result<Json<StudentProfile>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    let profile = ProfileService::get(&state.db, &principal)
        .await
        .map_err(profile_error)?;
    profile.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Student profile not found" })),
    ))
}

/// PUT /profiles/{principal} — the student themselves or an admin; full
/// replace of the profile fields.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
    Json(body): Json<ProfileInput>,
) -> Result<Json<StudentProfile>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_self_or_admin(role, &user.principal, &principal) {
        return Err(err);
    }

    let input = profiles::validate(&body)
        .map_err(|msg| (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))))?;

    ProfileService::update(&state.db, &principal, &input)
        .await
        .map(Json)
        .map_err(profile_error)
}

/// POST /profiles/{principal}/photo — photo bytes upload, required to
/// complete a profile. One file per student, keyed by principal.
pub async fn upload_photo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_self_or_admin(role, &user.principal, &principal) {
        return Err(err);
    }
    check_principal(&principal)?;

    let photos_dir = PathBuf::from(&state.config.media_dir).join("photos");
    tokio::fs::create_dir_all(&photos_dir).await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    if let Some(old) = find_photo(&state.config.media_dir, &principal).await {
        let _ = tokio::fs::remove_file(old).await;
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

        if data.is_empty() {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Please provide a profile photo" })),
            ));
        }
        if data.len() > 5 * 1024 * 1024 {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "File too large (max 5 MB)" })),
            ));
        }

        let file_path = photos_dir.join(format!("{principal}.{file_ext}"));
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

/// GET /profiles/{principal}/photo — the student themselves or an admin.
pub async fn serve_photo(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
) -> Result<Response<Body>, StatusCode> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if super::require_self_or_admin(role, &user.principal, &principal).is_some() {
        return Err(StatusCode::FORBIDDEN);
    }
    if check_principal(&principal).is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let file_path = find_photo(&state.config.media_dir, &principal)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    let data = tokio::fs::read(&file_path)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let content_type = mime_guess::from_path(&file_path)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(data))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
