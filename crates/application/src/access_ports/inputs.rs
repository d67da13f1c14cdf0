use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use transitguard_core::{Role, UserId};
use transitguard_domain::PermissionId;

/// Input payload for capability creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Capability name in `resource.action` form.
    pub name: String,
    /// Resource segment, must match the name.
    pub resource: String,
    /// Action segment, must match the name.
    pub action: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Partial update for a capability definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdatePermissionInput {
    /// New capability name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// Input payload for user-level assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignUserPermissionsInput {
    /// Target user.
    pub user_id: UserId,
    /// Capabilities to grant or revoke.
    pub permission_ids: Vec<PermissionId>,
    /// Grant (`true`) or revoke (`false`).
    pub granted: bool,
    /// Optional grant expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Validated user-level write applied in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOverrideBatch {
    /// Target user.
    pub user_id: UserId,
    /// Capabilities, already resolved to active definitions.
    pub permission_ids: Vec<PermissionId>,
    /// Grant (`true`) or revoke (`false`).
    pub granted: bool,
    /// Principal performing the write.
    pub granted_by: UserId,
    /// Optional grant expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Listing view of a user's capabilities.
///
/// `permissions` layers user overrides over role override rows only. The
/// compiled role defaults are reported separately in `compiled_defaults`
/// because the live check consults them while this listing does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePermissions {
    /// Target user.
    pub user_id: UserId,
    /// Role of the user.
    pub role: Role,
    /// Role override grants minus user revokes, plus unexpired user grants.
    pub permissions: BTreeSet<String>,
    /// Compiled baseline of the role.
    pub compiled_defaults: BTreeSet<String>,
}
