//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod authorization_guard;
mod authorization_service;
mod ownership_registry;
mod permission_assignment_service;
mod permission_catalog_service;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    AssignUserPermissionsInput, Clock, CreatePermissionInput, EffectivePermissions, OwnerLookup,
    PermissionRepository, RoleOverrideRepository, SystemClock, UpdatePermissionInput,
    UserDirectory, UserOverrideBatch, UserOverrideRepository,
};
pub use authorization_guard::AuthorizationGuard;
pub use authorization_service::{AuthorizationService, CapabilityDecision};
pub use ownership_registry::OwnershipRegistry;
pub use permission_assignment_service::PermissionAssignmentService;
pub use permission_catalog_service::PermissionCatalogService;
