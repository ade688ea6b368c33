use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    middleware::auth::MaybeUser,
    models::{
        auth::AuthenticatedUser,
        role::{AssignRoleRequest, CallerRoleResponse, Role},
    },
    services::roles::RoleService,
    AppState,
};

/// GET /roles/me — answers for signed-out callers too, as guest.
pub async fn get_caller_role(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Json<CallerRoleResponse> {
    let role = match user {
        Some(u) => RoleService::resolve(&state.db, &u.principal).await,
        None => Role::Guest,
    };
    Json(CallerRoleResponse {
        role,
        is_admin: role.is_admin(),
    })
}

/// GET /roles/{principal} — admin only.
pub async fn get_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(principal): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let caller_role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(caller_role) {
        return Err(err);
    }

    let role = RoleService::resolve(&state.db, &principal).await;
    Ok(Json(json!({ "principal": principal, "role": role })))
}

/// POST /roles/assign — admin only. Guest is derived, never assigned.
pub async fn assign_role(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<AssignRoleRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let caller_role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(caller_role) {
        return Err(err);
    }

    if body.role == Role::Guest {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "The guest role cannot be assigned" })),
        ));
    }
    if body.principal.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please provide a principal" })),
        ));
    }

    RoleService::assign(&state.db, body.principal.trim(), body.role, &user.principal)
        .await
        .map(|assignment| Json(serde_json::to_value(assignment).unwrap()))
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        })
}
