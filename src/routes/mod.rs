pub mod announcements;
pub mod attendance;
pub mod courses;
pub mod enrollments;
pub mod health;
pub mod logo;
pub mod profiles;
pub mod results;
pub mod roles;
pub mod settings;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::models::role::Role;

/// Admin-only gate. Authenticated non-admins get the restricted-access
/// message rather than a hard failure.
pub(crate) fn require_admin(role: Role) -> Option<(StatusCode, Json<Value>)> {
    match role {
        Role::Admin => None,
        Role::Student | Role::Guest => Some((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "This area is restricted to administrators only." })),
        )),
    }
}

/// Gate for per-student resources: the student themselves or an admin.
pub(crate) fn require_self_or_admin(
    role: Role,
    caller: &str,
    subject: &str,
) -> Option<(StatusCode, Json<Value>)> {
    if role.is_admin() || caller == subject {
        None
    } else {
        Some((
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Access denied" })),
        ))
    }
}
