use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Incoming payload for capability creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-permission-request.ts"
)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
}

/// Incoming payload for capability updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-permission-request.ts"
)]
pub struct UpdatePermissionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Incoming payload for a single role-level assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-role-permission-request.ts"
)]
pub struct AssignRolePermissionRequest {
    pub permission_id: i64,
    /// Defaults to a grant.
    pub granted: Option<bool>,
}

/// Incoming payload for bulk role-level assignments.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-assign-role-permissions-request.ts"
)]
pub struct BulkAssignRolePermissionsRequest {
    pub permission_ids: Vec<i64>,
    pub granted: Option<bool>,
}

/// Incoming payload for a single user-level assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-user-permission-request.ts"
)]
pub struct AssignUserPermissionRequest {
    pub permission_id: i64,
    pub granted: Option<bool>,
    /// RFC 3339 timestamp; only meaningful for grants.
    pub expires_at: Option<String>,
}

/// Incoming payload for bulk user-level assignments.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bulk-assign-user-permissions-request.ts"
)]
pub struct BulkAssignUserPermissionsRequest {
    pub permission_ids: Vec<i64>,
    pub granted: Option<bool>,
    pub expires_at: Option<String>,
}

/// API representation of a capability definition.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub id: i64,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

/// Role capabilities from override rows, with the compiled baseline.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-permissions-response.ts"
)]
pub struct RolePermissionsResponse {
    pub role: String,
    pub permissions: Vec<String>,
    pub compiled_defaults: Vec<String>,
}

/// API representation of a role-level override row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-override-response.ts"
)]
pub struct RoleOverrideResponse {
    pub role: String,
    pub permission_id: i64,
    pub permission_name: String,
    pub granted: bool,
    pub updated_at: String,
}

/// API representation of a user-level override row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-override-response.ts"
)]
pub struct UserOverrideResponse {
    pub user_id: i64,
    pub permission_id: i64,
    pub permission_name: String,
    pub granted: bool,
    pub granted_by: i64,
    /// Rows past this instant are still listed but no longer grant.
    pub expires_at: Option<String>,
    pub updated_at: String,
}

/// Capability listing for one user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub user_id: i64,
    pub role: String,
    pub permissions: Vec<String>,
    pub compiled_defaults: Vec<String>,
}

/// Result of one capability check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub permission: String,
    pub allowed: bool,
    pub source: String,
    pub expires_at: Option<String>,
}

/// Number of user overrides removed by a revoke-all.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/revoke-all-response.ts"
)]
pub struct RevokeAllResponse {
    pub revoked: u64,
}
