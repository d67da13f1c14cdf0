mod access;
mod common;

pub use access::{
    AssignRolePermissionRequest, AssignUserPermissionRequest, BulkAssignRolePermissionsRequest,
    BulkAssignUserPermissionsRequest, CreatePermissionRequest, EffectivePermissionsResponse,
    PermissionCheckResponse, PermissionResponse, RevokeAllResponse, RoleOverrideResponse,
    RolePermissionsResponse, UpdatePermissionRequest, UserOverrideResponse,
};
pub use common::HealthResponse;
