use super::*;

use transitguard_domain::{CheckOutcome, PermissionName, UserOverride};

use crate::access_ports::{AssignUserPermissionsInput, EffectivePermissions, UserOverrideBatch};

impl PermissionAssignmentService {
    /// Grants or revokes one capability for a user.
    pub async fn assign_to_user(
        &self,
        actor: &Principal,
        input: AssignUserPermissionsInput,
    ) -> AppResult<()> {
        self.require_user_role(input.user_id).await?;

        let permission_id = match input.permission_ids.as_slice() {
            [permission_id] => *permission_id,
            _ => {
                return Err(AppError::Validation(
                    "exactly one permission id is required".to_owned(),
                ));
            }
        };
        self.require_active_permission(permission_id).await?;

        self.user_overrides
            .upsert_user_overrides(&UserOverrideBatch {
                user_id: input.user_id,
                permission_ids: vec![permission_id],
                granted: input.granted,
                granted_by: actor.user_id(),
                expires_at: input.expires_at,
            })
            .await?;

        Self::log_assignment(actor, &input.user_id.to_string(), 1, input.granted);
        Ok(())
    }

    /// Grants or revokes several capabilities for a user, all or nothing.
    pub async fn assign_many_to_user(
        &self,
        actor: &Principal,
        input: AssignUserPermissionsInput,
    ) -> AppResult<()> {
        self.require_user_role(input.user_id).await?;
        let permission_ids = self
            .require_active_permissions(&input.permission_ids)
            .await?;
        let count = permission_ids.len();

        self.user_overrides
            .upsert_user_overrides(&UserOverrideBatch {
                user_id: input.user_id,
                permission_ids,
                granted: input.granted,
                granted_by: actor.user_id(),
                expires_at: input.expires_at,
            })
            .await?;

        Self::log_assignment(actor, &input.user_id.to_string(), count, input.granted);
        Ok(())
    }

    /// Returns active override rows of a user.
    ///
    /// Grants past their expiry are still listed; callers needing
    /// point-in-time state filter on `expires_at`.
    pub async fn user_overrides(&self, user_id: UserId) -> AppResult<Vec<UserOverride>> {
        self.require_user_role(user_id).await?;
        self.user_overrides.list_user_overrides(user_id).await
    }

    /// Lists the capabilities of a user from override rows.
    pub async fn effective_permissions(&self, user_id: UserId) -> AppResult<EffectivePermissions> {
        let role = self.require_user_role(user_id).await?;
        let role_permissions = self.role_overrides.list_granted_permission_names(role).await?;
        let overrides = self.user_overrides.list_user_overrides(user_id).await?;
        let now = self.authorization_service.now();

        let revoked = overrides
            .iter()
            .filter(|row| row.is_revoke())
            .map(|row| row.permission_name.as_str().to_owned())
            .collect::<BTreeSet<_>>();

        let mut permissions = role_permissions
            .into_iter()
            .filter(|name| !revoked.contains(name))
            .collect::<BTreeSet<_>>();

        permissions.extend(
            overrides
                .iter()
                .filter(|row| {
                    row.is_effective_grant_at(now)
                        && !revoked.contains(row.permission_name.as_str())
                })
                .map(|row| row.permission_name.as_str().to_owned()),
        );

        Ok(EffectivePermissions {
            user_id,
            role,
            permissions,
            compiled_defaults: self.role_defaults(role),
        })
    }

    /// Resolves one capability for a stored user.
    pub async fn check_user(&self, user_id: UserId, capability: &str) -> AppResult<CheckOutcome> {
        let name = PermissionName::new(capability)?;
        let role = self.require_user_role(user_id).await?;
        self.authorization_service
            .check(&Principal::new(user_id, role), name.as_str())
            .await
    }

    /// Soft-deletes every user-level override. Role layers are untouched.
    pub async fn revoke_all_for_user(&self, actor: &Principal, user_id: UserId) -> AppResult<u64> {
        self.require_user_role(user_id).await?;
        let revoked = self
            .user_overrides
            .soft_delete_user_overrides(user_id)
            .await?;

        info!(
            actor = %actor.user_id(),
            user_id = %user_id,
            revoked,
            "user permission overrides revoked"
        );

        Ok(revoked)
    }
}
