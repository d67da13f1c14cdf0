use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use transitguard_application::UserDirectory;
use transitguard_core::{AppError, AppResult, Role, UserId};

/// PostgreSQL-backed read view over user accounts.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user_role(&self, user_id: UserId) -> AppResult<Option<Role>> {
        let role = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        role.map(|value| {
            Role::from_str(value.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode role '{value}' for user '{user_id}': {error}"
                ))
            })
        })
        .transpose()
    }
}
