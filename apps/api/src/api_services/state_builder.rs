use std::sync::Arc;

use sqlx::PgPool;
use transitguard_application::OwnershipRegistry;
use transitguard_domain::RoleDefaults;
use transitguard_infrastructure::{
    PostgresOverrideRepository, PostgresOwnerLookup, PostgresPermissionRepository,
    PostgresUserDirectory,
};

use crate::state::{AppState, StatePorts};

pub fn build_app_state(pool: PgPool) -> AppState {
    let overrides = Arc::new(PostgresOverrideRepository::new(pool.clone()));

    AppState::new(StatePorts {
        role_defaults: Arc::new(RoleDefaults::standard()),
        permissions: Arc::new(PostgresPermissionRepository::new(pool.clone())),
        role_overrides: overrides.clone(),
        user_overrides: overrides,
        users: Arc::new(PostgresUserDirectory::new(pool.clone())),
        ownership_registry: OwnershipRegistry::new()
            .register("users", Arc::new(PostgresOwnerLookup::users(pool))),
    })
}
