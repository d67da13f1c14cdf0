use super::*;

use transitguard_domain::RoleOverride;

impl PermissionAssignmentService {
    /// Grants or revokes one capability at role level.
    pub async fn assign_to_role(
        &self,
        actor: &Principal,
        role: Role,
        permission_id: PermissionId,
        granted: bool,
    ) -> AppResult<()> {
        self.require_active_permission(permission_id).await?;

        self.role_overrides
            .upsert_role_overrides(role, &[permission_id], granted)
            .await?;

        Self::log_assignment(actor, role.as_str(), 1, granted);
        Ok(())
    }

    /// Grants or revokes several capabilities at role level, all or nothing.
    pub async fn assign_many_to_role(
        &self,
        actor: &Principal,
        role: Role,
        permission_ids: &[PermissionId],
        granted: bool,
    ) -> AppResult<()> {
        let permission_ids = self.require_active_permissions(permission_ids).await?;

        self.role_overrides
            .upsert_role_overrides(role, &permission_ids, granted)
            .await?;

        Self::log_assignment(actor, role.as_str(), permission_ids.len(), granted);
        Ok(())
    }

    /// Returns capability names granted to a role by override rows.
    pub async fn role_permissions(&self, role: Role) -> AppResult<Vec<String>> {
        self.role_overrides.list_granted_permission_names(role).await
    }

    /// Returns the compiled baseline of a role.
    #[must_use]
    pub fn role_defaults(&self, role: Role) -> BTreeSet<String> {
        self.authorization_service.role_defaults().for_role(role)
    }

    /// Returns active override rows of a role, grants and revokes.
    pub async fn role_overrides(&self, role: Role) -> AppResult<Vec<RoleOverride>> {
        self.role_overrides.list_role_overrides(role).await
    }
}
