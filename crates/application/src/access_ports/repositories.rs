use async_trait::async_trait;

use transitguard_core::{AppResult, Role, UserId};
use transitguard_domain::{
    PermissionDefinition, PermissionId, PermissionName, RoleOverride, UserOverride,
};

use super::inputs::UserOverrideBatch;

/// Repository port for the capability catalog.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Persists a new capability definition.
    async fn create_permission(
        &self,
        name: &PermissionName,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition>;

    /// Lists active capability definitions ordered by name.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>>;

    /// Finds a capability definition, including soft-deleted ones.
    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<PermissionDefinition>>;

    /// Finds the active capability definition with the given name.
    async fn find_active_permission_by_name(
        &self,
        name: &PermissionName,
    ) -> AppResult<Option<PermissionDefinition>>;

    /// Returns the active definitions among the given ids.
    async fn find_active_permissions_by_ids(
        &self,
        ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionDefinition>>;

    /// Updates the name and description of an active definition.
    async fn update_permission(
        &self,
        id: PermissionId,
        name: &PermissionName,
        description: Option<&str>,
    ) -> AppResult<PermissionDefinition>;

    /// Marks an active definition as deleted. Referencing overrides stay.
    async fn soft_delete_permission(&self, id: PermissionId) -> AppResult<()>;
}

/// Repository port for role-level overrides.
#[async_trait]
pub trait RoleOverrideRepository: Send + Sync {
    /// Upserts one row per permission id inside a single transaction,
    /// clearing any tombstone.
    ///
    /// Fails with `Conflict`, writing nothing, when a permission is missing
    /// or deleted at write time.
    async fn upsert_role_overrides(
        &self,
        role: Role,
        permission_ids: &[PermissionId],
        granted: bool,
    ) -> AppResult<()>;

    /// Lists capability names granted to a role by active rows whose
    /// permission is also active.
    async fn list_granted_permission_names(&self, role: Role) -> AppResult<Vec<String>>;

    /// Returns whether an active granting row exists for an active permission.
    async fn has_active_role_grant(&self, role: Role, permission_name: &str) -> AppResult<bool>;

    /// Lists active override rows of a role.
    async fn list_role_overrides(&self, role: Role) -> AppResult<Vec<RoleOverride>>;
}

/// Repository port for user-level overrides.
#[async_trait]
pub trait UserOverrideRepository: Send + Sync {
    /// Upserts one row per permission id inside a single transaction,
    /// clearing any tombstone. Missing or deleted permissions fail the batch
    /// like [`RoleOverrideRepository::upsert_role_overrides`].
    async fn upsert_user_overrides(&self, batch: &UserOverrideBatch) -> AppResult<()>;

    /// Lists every active row of `(user, name)`.
    ///
    /// Several rows match when a soft-deleted permission name was re-created.
    async fn find_active_user_overrides(
        &self,
        user_id: UserId,
        permission_name: &str,
    ) -> AppResult<Vec<UserOverride>>;

    /// Lists active rows of a user, including functionally expired grants.
    async fn list_user_overrides(&self, user_id: UserId) -> AppResult<Vec<UserOverride>>;

    /// Soft-deletes every active row of a user and returns the row count.
    async fn soft_delete_user_overrides(&self, user_id: UserId) -> AppResult<u64>;
}

/// Read-only view over user accounts owned by the authentication layer.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the role of an existing, non-deleted user.
    async fn find_user_role(&self, user_id: UserId) -> AppResult<Option<Role>>;
}

/// Resolves the owner of one resource instance.
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    /// Returns the owning user, or `None` when the resource does not exist.
    async fn find_owner(&self, resource_id: &str) -> AppResult<Option<UserId>>;
}
