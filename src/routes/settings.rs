use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    models::{
        auth::AuthenticatedUser,
        settings::{ContactDetails, SiteSettings},
    },
    services::roles::RoleService,
    AppState,
};

/// GET /contact — public endpoint. A missing or unreadable row degrades to
/// empty contact details rather than an error.
pub async fn get_contact_details(State(state): State<AppState>) -> Json<ContactDetails> {
    let settings = sqlx::query_as::<_, SiteSettings>(
        "SELECT * FROM site_settings WHERE id = 1",
    )
    .fetch_optional(&state.db)
    .await
    .ok()
    .flatten();

    Json(settings.map(Into::into).unwrap_or(ContactDetails {
        email: String::new(),
        phone: String::new(),
        address: String::new(),
    }))
}

/// PUT /contact — admin only.
pub async fn update_contact_details(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<ContactDetails>,
) -> Result<Json<ContactDetails>, (StatusCode, Json<Value>)> {
    let role = RoleService::resolve(&state.db, &user.principal).await;
    if let Some(err) = super::require_admin(role) {
        return Err(err);
    }

    if body.email.trim().is_empty() || body.phone.trim().is_empty() || body.address.trim().is_empty()
    {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Please fill in all fields" })),
        ));
    }

    let settings = sqlx::query_as::<_, SiteSettings>(
        "UPDATE site_settings
         SET contact_email = $1, contact_phone = $2, contact_address = $3, updated_at = NOW()
         WHERE id = 1
         RETURNING *",
    )
    .bind(body.email.trim())
    .bind(body.phone.trim())
    .bind(body.address.trim())
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(Json(settings.into()))
}
