use sqlx::PgPool;

use crate::models::role::{Role, RoleAssignment};

pub struct RoleService;

impl RoleService {
    /// Resolve a principal's role from the roles table. Authenticated
    /// callers without a row are students; a failed lookup degrades to
    /// guest on read paths instead of surfacing a server error.
    pub async fn resolve(pool: &PgPool, principal: &str) -> Role {
        let row: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE principal = $1")
                .bind(principal)
                .fetch_optional(pool)
                .await;

        match row {
            Ok(Some(role)) => role.parse().unwrap_or(Role::Student),
            Ok(None) => Role::Student,
            Err(e) => {
                tracing::warn!("Role lookup failed for {principal}: {e}");
                Role::Guest
            }
        }
    }

    pub async fn assign(
        pool: &PgPool,
        principal: &str,
        role: Role,
        assigned_by: &str,
    ) -> anyhow::Result<RoleAssignment> {
        let row = sqlx::query_as::<_, RoleAssignment>(
            "INSERT INTO user_roles (principal, role, assigned_by)
             VALUES ($1, $2, $3)
             ON CONFLICT (principal)
             DO UPDATE SET role = EXCLUDED.role, assigned_by = EXCLUDED.assigned_by,
                           updated_at = NOW()
             RETURNING *",
        )
        .bind(principal)
        .bind(role.to_string())
        .bind(assigned_by)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Ensure the configured bootstrap principals hold the admin role. Safe
    /// to call on every startup; existing assignments are left alone.
    pub async fn bootstrap_admins(pool: &PgPool, principals: &[String]) -> anyhow::Result<()> {
        for principal in principals {
            sqlx::query(
                "INSERT INTO user_roles (principal, role, assigned_by)
                 VALUES ($1, 'admin', 'bootstrap')
                 ON CONFLICT (principal) DO NOTHING",
            )
            .bind(principal)
            .execute(pool)
            .await?;
            tracing::info!("Bootstrap admin ensured: {principal}");
        }
        Ok(())
    }
}
