use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use transitguard_application::PermissionRepository;
use transitguard_core::{AppError, AppResult};
use transitguard_domain::{PermissionDefinition, PermissionId, PermissionName};

/// PostgreSQL-backed repository for the capability catalog.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl PermissionRow {
    fn into_definition(self) -> AppResult<PermissionDefinition> {
        let name = PermissionName::new(self.name.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode permission '{}' ({}): {error}",
                self.name, self.id
            ))
        })?;

        Ok(PermissionDefinition {
            id: PermissionId::new(self.id),
            name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

fn map_name_conflict(error: sqlx::Error, name: &PermissionName, operation: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("permission '{name}' already exists"));
    }

    AppError::Internal(format!("failed to {operation} permission: {error}"))
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn create_permission(
        &self,
        name: &PermissionName,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO permissions (name, resource, action, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, created_at, updated_at, deleted_at
            "#,
        )
        .bind(name.as_str())
        .bind(name.resource())
        .bind(name.action())
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_name_conflict(error, name, "create"))?;

        row.into_definition()
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, created_at, updated_at, deleted_at
            FROM permissions
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_definition).collect()
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<PermissionDefinition>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, created_at, updated_at, deleted_at
            FROM permissions
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(PermissionRow::into_definition)
        .transpose()
    }

    async fn find_active_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionDefinition>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, created_at, updated_at, deleted_at
            FROM permissions
            WHERE name = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?
        .map(PermissionRow::into_definition)
        .transpose()
    }

    async fn find_active_permissions_by_ids(
        &self,
        ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionDefinition>> {
        let ids = ids.iter().map(PermissionId::as_i64).collect::<Vec<_>>();
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, name, description, created_at, updated_at, deleted_at
            FROM permissions
            WHERE id = ANY($1) AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_definition).collect()
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        name: &PermissionName,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            UPDATE permissions
            SET name = $2,
                resource = $3,
                action = $4,
                description = $5,
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, description, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id.as_i64())
        .bind(name.as_str())
        .bind(name.resource())
        .bind(name.action())
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_name_conflict(error, name, "update"))?
        .ok_or_else(|| AppError::NotFound(format!("permission '{id}' was not found")))?
        .into_definition()
    }

    async fn soft_delete_permission(&self, id: PermissionId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE permissions
            SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete permission: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{id}' was not found"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
