use std::sync::Arc;

use transitguard_application::{
    AuthorizationGuard, AuthorizationService, OwnershipRegistry, PermissionAssignmentService,
    PermissionCatalogService, PermissionRepository, RoleOverrideRepository, UserDirectory,
    UserOverrideRepository,
};
use transitguard_domain::RoleDefaults;

/// Adapters the application services are wired over.
pub struct StatePorts {
    pub role_defaults: Arc<RoleDefaults>,
    pub permissions: Arc<dyn PermissionRepository>,
    pub role_overrides: Arc<dyn RoleOverrideRepository>,
    pub user_overrides: Arc<dyn UserOverrideRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub ownership_registry: OwnershipRegistry,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: PermissionCatalogService,
    pub assignment_service: PermissionAssignmentService,
    pub authorization_service: AuthorizationService,
    pub guard: AuthorizationGuard,
}

impl AppState {
    pub fn new(ports: StatePorts) -> Self {
        let authorization_service = AuthorizationService::new(
            ports.role_defaults,
            ports.role_overrides.clone(),
            ports.user_overrides.clone(),
        );

        Self {
            catalog_service: PermissionCatalogService::new(ports.permissions.clone()),
            assignment_service: PermissionAssignmentService::new(
                authorization_service.clone(),
                ports.permissions,
                ports.role_overrides,
                ports.user_overrides,
                ports.users,
            ),
            guard: AuthorizationGuard::new(
                authorization_service.clone(),
                ports.ownership_registry,
            ),
            authorization_service,
        }
    }
}
