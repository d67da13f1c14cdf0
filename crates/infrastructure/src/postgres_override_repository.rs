use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgQueryResult;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use transitguard_application::{RoleOverrideRepository, UserOverrideBatch, UserOverrideRepository};
use transitguard_core::{AppError, AppResult, Role, UserId};
use transitguard_domain::{PermissionId, PermissionName, RoleOverride, UserOverride};

/// PostgreSQL-backed repository for role-level and user-level overrides.
#[derive(Clone)]
pub struct PostgresOverrideRepository {
    pool: PgPool,
}

impl PostgresOverrideRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'_, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

/// Rejects the batch when the permission vanished between validation and write.
fn ensure_row_written(result: &PgQueryResult, permission_id: PermissionId) -> AppResult<()> {
    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "permission '{permission_id}' is missing or deleted"
        )));
    }

    Ok(())
}

fn decode_name(value: &str) -> AppResult<PermissionName> {
    PermissionName::new(value).map_err(|error| {
        AppError::Internal(format!("failed to decode permission '{value}': {error}"))
    })
}

#[derive(Debug, FromRow)]
struct RoleOverrideRow {
    role: String,
    permission_id: i64,
    permission_name: String,
    granted: bool,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl RoleOverrideRow {
    fn into_override(self) -> AppResult<RoleOverride> {
        let role = Role::from_str(self.role.as_str()).map_err(|error| {
            AppError::Internal(format!("failed to decode role '{}': {error}", self.role))
        })?;

        Ok(RoleOverride {
            role,
            permission_id: PermissionId::new(self.permission_id),
            permission_name: decode_name(self.permission_name.as_str())?,
            granted: self.granted,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserOverrideRow {
    user_id: i64,
    permission_id: i64,
    permission_name: String,
    granted: bool,
    granted_by: i64,
    expires_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl UserOverrideRow {
    fn into_override(self) -> AppResult<UserOverride> {
        Ok(UserOverride {
            user_id: UserId::new(self.user_id),
            permission_id: PermissionId::new(self.permission_id),
            permission_name: decode_name(self.permission_name.as_str())?,
            granted: self.granted,
            granted_by: UserId::new(self.granted_by),
            expires_at: self.expires_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

#[async_trait]
impl RoleOverrideRepository for PostgresOverrideRepository {
    async fn upsert_role_overrides(
        &self,
        role: Role,
        permission_ids: &[PermissionId],
        granted: bool,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        for permission_id in permission_ids {
            let result = sqlx::query(
                r#"
                INSERT INTO role_permission_overrides (role, permission_id, granted)
                SELECT $1, $2::BIGINT, $3::BOOLEAN
                WHERE EXISTS (
                    SELECT 1
                    FROM permissions
                    WHERE id = $2 AND deleted_at IS NULL
                    FOR SHARE
                )
                ON CONFLICT (role, permission_id) DO UPDATE
                SET granted = EXCLUDED.granted,
                    deleted_at = NULL,
                    updated_at = now()
                "#,
            )
            .bind(role.as_str())
            .bind(permission_id.as_i64())
            .bind(granted)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to persist role override: {error}"))
            })?;
            ensure_row_written(&result, *permission_id)?;
        }

        commit(transaction).await
    }

    async fn list_granted_permission_names(&self, role: Role) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT permissions.name
            FROM role_permission_overrides AS overrides
            INNER JOIN permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.role = $1
                AND overrides.granted = true
                AND overrides.deleted_at IS NULL
                AND permissions.deleted_at IS NULL
            ORDER BY permissions.name
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role permissions: {error}")))
    }

    async fn has_active_role_grant(&self, role: Role, permission_name: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role_permission_overrides AS overrides
                INNER JOIN permissions
                    ON permissions.id = overrides.permission_id
                WHERE overrides.role = $1
                    AND permissions.name = $2
                    AND overrides.granted = true
                    AND overrides.deleted_at IS NULL
                    AND permissions.deleted_at IS NULL
            )
            "#,
        )
        .bind(role.as_str())
        .bind(permission_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check role override: {error}")))
    }

    async fn list_role_overrides(&self, role: Role) -> AppResult<Vec<RoleOverride>> {
        let rows = sqlx::query_as::<_, RoleOverrideRow>(
            r#"
            SELECT
                overrides.role,
                overrides.permission_id,
                permissions.name AS permission_name,
                overrides.granted,
                overrides.updated_at,
                overrides.deleted_at
            FROM role_permission_overrides AS overrides
            INNER JOIN permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.role = $1
                AND overrides.deleted_at IS NULL
                AND permissions.deleted_at IS NULL
            ORDER BY permissions.name
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role overrides: {error}")))?;

        rows.into_iter().map(RoleOverrideRow::into_override).collect()
    }
}

#[async_trait]
impl UserOverrideRepository for PostgresOverrideRepository {
    async fn upsert_user_overrides(&self, batch: &UserOverrideBatch) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        for permission_id in &batch.permission_ids {
            let result = sqlx::query(
                r#"
                INSERT INTO user_permission_overrides (
                    user_id,
                    permission_id,
                    granted,
                    granted_by,
                    expires_at
                )
                SELECT $1::BIGINT, $2::BIGINT, $3::BOOLEAN, $4::BIGINT, $5::TIMESTAMPTZ
                WHERE EXISTS (
                    SELECT 1
                    FROM permissions
                    WHERE id = $2 AND deleted_at IS NULL
                    FOR SHARE
                )
                ON CONFLICT (user_id, permission_id) DO UPDATE
                SET granted = EXCLUDED.granted,
                    granted_by = EXCLUDED.granted_by,
                    expires_at = EXCLUDED.expires_at,
                    deleted_at = NULL,
                    updated_at = now()
                "#,
            )
            .bind(batch.user_id.as_i64())
            .bind(permission_id.as_i64())
            .bind(batch.granted)
            .bind(batch.granted_by.as_i64())
            .bind(batch.expires_at)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to persist user override: {error}"))
            })?;
            ensure_row_written(&result, *permission_id)?;
        }

        commit(transaction).await
    }

    async fn find_active_user_overrides(
        &self,
        user_id: UserId,
        permission_name: &str,
    ) -> AppResult<Vec<UserOverride>> {
        let rows = sqlx::query_as::<_, UserOverrideRow>(
            r#"
            SELECT
                overrides.user_id,
                overrides.permission_id,
                permissions.name AS permission_name,
                overrides.granted,
                overrides.granted_by,
                overrides.expires_at,
                overrides.updated_at,
                overrides.deleted_at
            FROM user_permission_overrides AS overrides
            INNER JOIN permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.user_id = $1
                AND permissions.name = $2
                AND overrides.deleted_at IS NULL
            ORDER BY overrides.permission_id
            "#,
        )
        .bind(user_id.as_i64())
        .bind(permission_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user overrides: {error}")))?;

        rows.into_iter().map(UserOverrideRow::into_override).collect()
    }

    async fn list_user_overrides(&self, user_id: UserId) -> AppResult<Vec<UserOverride>> {
        let rows = sqlx::query_as::<_, UserOverrideRow>(
            r#"
            SELECT
                overrides.user_id,
                overrides.permission_id,
                permissions.name AS permission_name,
                overrides.granted,
                overrides.granted_by,
                overrides.expires_at,
                overrides.updated_at,
                overrides.deleted_at
            FROM user_permission_overrides AS overrides
            INNER JOIN permissions
                ON permissions.id = overrides.permission_id
            WHERE overrides.user_id = $1
                AND overrides.deleted_at IS NULL
            ORDER BY permissions.name
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user overrides: {error}")))?;

        rows.into_iter().map(UserOverrideRow::into_override).collect()
    }

    async fn soft_delete_user_overrides(&self, user_id: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_permission_overrides
            SET deleted_at = now(), updated_at = now()
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke user overrides: {error}")))?;

        Ok(result.rows_affected())
    }
}
