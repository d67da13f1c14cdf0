use transitguard_application::EffectivePermissions;
use transitguard_domain::{CheckOutcome, PermissionDefinition, RoleOverride, UserOverride};

use super::{
    EffectivePermissionsResponse, PermissionCheckResponse, PermissionResponse,
    RoleOverrideResponse, UserOverrideResponse,
};

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            id: value.id.as_i64(),
            resource: value.resource().to_owned(),
            action: value.action().to_owned(),
            name: value.name.as_str().to_owned(),
            description: value.description,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
            deleted_at: value.deleted_at.map(|deleted_at| deleted_at.to_rfc3339()),
        }
    }
}

impl From<RoleOverride> for RoleOverrideResponse {
    fn from(value: RoleOverride) -> Self {
        Self {
            role: value.role.as_str().to_owned(),
            permission_id: value.permission_id.as_i64(),
            permission_name: value.permission_name.as_str().to_owned(),
            granted: value.granted,
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

impl From<UserOverride> for UserOverrideResponse {
    fn from(value: UserOverride) -> Self {
        Self {
            user_id: value.user_id.as_i64(),
            permission_id: value.permission_id.as_i64(),
            permission_name: value.permission_name.as_str().to_owned(),
            granted: value.granted,
            granted_by: value.granted_by.as_i64(),
            expires_at: value.expires_at.map(|expires_at| expires_at.to_rfc3339()),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

impl From<EffectivePermissions> for EffectivePermissionsResponse {
    fn from(value: EffectivePermissions) -> Self {
        Self {
            user_id: value.user_id.as_i64(),
            role: value.role.as_str().to_owned(),
            permissions: value.permissions.into_iter().collect(),
            compiled_defaults: value.compiled_defaults.into_iter().collect(),
        }
    }
}

impl PermissionCheckResponse {
    pub fn from_outcome(permission: String, outcome: CheckOutcome) -> Self {
        Self {
            permission,
            allowed: outcome.allowed,
            source: outcome.source.as_str().to_owned(),
            expires_at: outcome.expires_at.map(|expires_at| expires_at.to_rfc3339()),
        }
    }
}
