use async_trait::async_trait;
use sqlx::PgPool;

use transitguard_application::OwnerLookup;
use transitguard_core::{AppError, AppResult, UserId};

/// Resolves resource owners from a single table.
///
/// Table and column names are static identifiers chosen at composition time,
/// never request input.
#[derive(Clone)]
pub struct PostgresOwnerLookup {
    pool: PgPool,
    query: String,
}

impl PostgresOwnerLookup {
    /// Creates a lookup reading `owner_column` of the `table` row whose
    /// `id_column` equals the resource id.
    #[must_use]
    pub fn new(
        pool: PgPool,
        table: &'static str,
        id_column: &'static str,
        owner_column: &'static str,
    ) -> Self {
        let query = format!(
            "SELECT {owner_column} FROM {table} WHERE {id_column} = $1 AND deleted_at IS NULL"
        );

        Self { pool, query }
    }

    /// Lookup for user accounts, each owned by itself.
    #[must_use]
    pub fn users(pool: PgPool) -> Self {
        Self::new(pool, "users", "id", "id")
    }
}

#[async_trait]
impl OwnerLookup for PostgresOwnerLookup {
    async fn find_owner(&self, resource_id: &str) -> AppResult<Option<UserId>> {
        let Ok(resource_id) = resource_id.parse::<i64>() else {
            return Ok(None);
        };

        let owner = sqlx::query_scalar::<_, i64>(self.query.as_str())
            .bind(resource_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to resolve owner: {error}")))?;

        Ok(owner.map(UserId::new))
    }
}
